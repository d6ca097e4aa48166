//! View description for the time-frame control.
//!
//! Builds a plain data description of the rendered control from range
//! state: which mode each endpoint shows, the labels on its controls,
//! whether the anchor section appears, and the resolved preview of the
//! actual range. No UI toolkit types; the HTTP layer turns this into
//! markup and tests assert on it directly.

use chrono::NaiveDateTime;

use crate::frame::{Anchor, Endpoint, Grain, RangeState, Side, TIMESTAMP_FORMAT};
use crate::locale::CalendarLocale;
use crate::transitions::Mode;

pub const HEADER: &str = "Configure custom time range";
pub const ANCHOR_HEADING: &str = "Anchor to";
pub const SINCE_HEADING: &str = "START (INCLUSIVE)";
pub const UNTIL_HEADING: &str = "END (EXCLUSIVE)";

/// Display format for the resolved range preview.
const PREVIEW_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub header: &'static str,
    pub since: EndpointView,
    pub until: EndpointView,
    /// Present when at least one endpoint is relative.
    pub anchor: Option<AnchorView>,
    /// The resolved actual range, for the read-only preview row.
    pub preview_since: String,
    pub preview_until: String,
    pub locale: &'static CalendarLocale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointView {
    pub side: Side,
    pub heading: &'static str,
    pub mode_label: &'static str,
    pub control: EndpointControl,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EndpointControl {
    /// Spin button plus grain selector.
    Relative {
        magnitude: i64,
        grain_label: String,
        grain_options: Vec<GrainOption>,
    },
    /// Date picker with the current instant filled in.
    Specific { value: String },
    /// `now` / `today` need no extra controls.
    Keyword,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrainOption {
    pub grain: Grain,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnchorView {
    pub heading: &'static str,
    /// The relative endpoint this section edits.
    pub side: Side,
    pub choice: AnchorChoice,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnchorChoice {
    Now,
    /// A date picker; `value` is empty (placeholder) until the user
    /// picks an instant, which is the case for the `today` anchor.
    DateTime { value: Option<String> },
}

/// Label shown for an endpoint's current mode.
pub fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Relative => "Relative Date/Time",
        Mode::Specific => "Specific Date/Time",
        Mode::Now => "Now",
        Mode::Today => "Midnight",
    }
}

/// All mode options in menu order, for rendering the mode selector.
pub fn mode_options() -> [(Mode, &'static str); 4] {
    [
        (Mode::Relative, mode_label(Mode::Relative)),
        (Mode::Specific, mode_label(Mode::Specific)),
        (Mode::Now, mode_label(Mode::Now)),
        (Mode::Today, mode_label(Mode::Today)),
    ]
}

/// Grain option label for a side: "Days Before", "Weeks After", ...
pub fn grain_label(grain: Grain, side: Side) -> String {
    let unit = match grain {
        Grain::Second => "Seconds",
        Grain::Minute => "Minutes",
        Grain::Hour => "Hours",
        Grain::Day => "Days",
        Grain::Week => "Weeks",
        Grain::Month => "Months",
        Grain::Quarter => "Quarters",
        Grain::Year => "Years",
    };
    let direction = match side {
        Side::Since => "Before",
        Side::Until => "After",
    };
    format!("{} {}", unit, direction)
}

impl FrameView {
    pub fn build(
        state: &RangeState,
        locale: &'static CalendarLocale,
        now: NaiveDateTime,
    ) -> FrameView {
        FrameView {
            header: HEADER,
            since: endpoint_view(&state.since, Side::Since),
            until: endpoint_view(&state.until, Side::Until),
            anchor: anchor_view(state),
            preview_since: state.since.resolve(now).format(PREVIEW_FORMAT).to_string(),
            preview_until: state.until.resolve(now).format(PREVIEW_FORMAT).to_string(),
            locale,
        }
    }
}

fn endpoint_view(endpoint: &Endpoint, side: Side) -> EndpointView {
    let heading = match side {
        Side::Since => SINCE_HEADING,
        Side::Until => UNTIL_HEADING,
    };

    let control = match endpoint {
        Endpoint::Now | Endpoint::Today => EndpointControl::Keyword,
        Endpoint::Specific(instant) => EndpointControl::Specific {
            value: instant.format(TIMESTAMP_FORMAT).to_string(),
        },
        Endpoint::Relative { amount, grain, .. } => EndpointControl::Relative {
            magnitude: amount.abs(),
            grain_label: grain_label(*grain, side),
            grain_options: Grain::ALL
                .iter()
                .map(|option| GrainOption {
                    grain: *option,
                    label: grain_label(*option, side),
                    selected: option == grain,
                })
                .collect(),
        },
    };

    EndpointView {
        side,
        heading,
        mode_label: mode_label(Mode::of(endpoint)),
        control,
    }
}

/// The anchor section reflects the first relative endpoint, since side
/// first. No relative endpoint, no section.
fn anchor_view(state: &RangeState) -> Option<AnchorView> {
    let (side, anchor) = [(Side::Since, &state.since), (Side::Until, &state.until)]
        .into_iter()
        .find_map(|(side, endpoint)| match endpoint {
            Endpoint::Relative { anchor, .. } => Some((side, *anchor)),
            _ => None,
        })?;

    let choice = match anchor {
        Anchor::Now => AnchorChoice::Now,
        Anchor::Today => AnchorChoice::DateTime { value: None },
        Anchor::Specific(instant) => AnchorChoice::DateTime {
            value: Some(instant.format(TIMESTAMP_FORMAT).to_string()),
        },
    };

    Some(AnchorView {
        heading: ANCHOR_HEADING,
        side,
        choice,
    })
}
