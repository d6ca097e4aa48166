//! Application settings store.
//!
//! A thin wrapper over the settings JSON document the surrounding
//! application ships to the control. The only path the control cares
//! about is `common.locale`, but lookup is generic over dotted paths.

use std::fs::File;
use std::path::Path;

use serde_json::Value;

use crate::errors::*;

/// Dotted path of the locale code inside the settings document.
pub const LOCALE_PATH: &str = "common.locale";

#[derive(Debug, Clone, Default)]
pub struct Store {
    settings: Option<Value>,
}

impl Store {
    /// An empty store. Every lookup misses; the control runs on
    /// defaults.
    pub fn empty() -> Store {
        Store { settings: None }
    }

    pub fn from_value(settings: Value) -> Store {
        Store {
            settings: Some(settings),
        }
    }

    /// Load settings from a JSON file on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Store> {
        let file = File::open(path.as_ref())?;
        let settings = serde_json::from_reader(file)?;
        Ok(Store {
            settings: Some(settings),
        })
    }

    /// Look up a string value at a dotted path. Missing document,
    /// missing keys, and non-string values all miss.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        let mut value = self.settings.as_ref()?;
        for key in path.split('.') {
            value = value.get(key)?;
        }
        value.as_str()
    }

    /// The application locale code, if the store carries one.
    pub fn locale(&self) -> Option<&str> {
        self.get_str(LOCALE_PATH)
    }
}
