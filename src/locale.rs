//! Calendar label tables for the date picker.
//!
//! The surrounding application stores a locale code in its settings;
//! an unknown or missing code must never break the control, so lookup
//! always falls back to the default locale.

/// Locale used when the settings store has no usable locale code.
pub const DEFAULT_LOCALE: &str = "en";

/// Labels the calendar widget needs for one locale: day-of-week
/// abbreviations (Monday first) and month names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarLocale {
    pub code: &'static str,
    pub day_abbrevs: [&'static str; 7],
    pub month_names: [&'static str; 12],
}

static EN: CalendarLocale = CalendarLocale {
    code: "en",
    day_abbrevs: ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"],
    month_names: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
};

static FR: CalendarLocale = CalendarLocale {
    code: "fr",
    day_abbrevs: ["lu", "ma", "me", "je", "ve", "sa", "di"],
    month_names: [
        "janvier",
        "février",
        "mars",
        "avril",
        "mai",
        "juin",
        "juillet",
        "août",
        "septembre",
        "octobre",
        "novembre",
        "décembre",
    ],
};

static DE: CalendarLocale = CalendarLocale {
    code: "de",
    day_abbrevs: ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"],
    month_names: [
        "Januar",
        "Februar",
        "März",
        "April",
        "Mai",
        "Juni",
        "Juli",
        "August",
        "September",
        "Oktober",
        "November",
        "Dezember",
    ],
};

static LOCALES: [&CalendarLocale; 3] = [&EN, &FR, &DE];

impl CalendarLocale {
    /// Look up the table for a locale code. `None`, the empty string,
    /// and codes without a table all resolve to the default locale.
    pub fn for_code(code: Option<&str>) -> &'static CalendarLocale {
        let requested = match code {
            Some(code) if !code.is_empty() => code,
            _ => DEFAULT_LOCALE,
        };
        LOCALES
            .iter()
            .find(|locale| locale.code == requested)
            .copied()
            .unwrap_or(&EN)
    }
}
