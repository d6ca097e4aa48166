use maud::{html, Markup};

mod frame;

pub use frame::*;

// Shared components
pub struct Css(pub &'static str);

impl maud::Render for Css {
    fn render(&self) -> Markup {
        html! {
            link rel="stylesheet" type="text/css" href=(self.0);
        }
    }
}

pub fn page_header(title: &str) -> Markup {
    html! {
        header.page-header {
            nav {
                span .root-link {
                    a href="/" { "timeframe" }
                }
                span { (title) }
            }
        }
    }
}
