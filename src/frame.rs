//! Custom time-frame value codec.
//!
//! Decodes the compact textual range expression used by the time-frame
//! control into structured state, and serializes edited state back into
//! the same textual form. The caller provides "now" for anything that
//! needs the current time.
//!
//! # Value Grammar
//!
//! A value is two endpoint expressions joined by `" : "`:
//!
//! - **Keywords**: `now`, `today`
//! - **Specific timestamps**: `2021-03-16T00:00:00` (local, no offset)
//! - **Relative offsets**: `DATEADD(DATETIME("today"), -7, day)`
//!
//! The decoder is total: any endpoint it cannot recognize falls back to
//! that side's default instead of failing, so a bad stored value can
//! never break the control.

use chrono::{Duration, Months, NaiveDateTime};
use regex::Regex;

/// Timestamp format for specific date/times. Seconds are always
/// present, fields zero-padded.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Default offset magnitude for a freshly created relative endpoint.
pub const DEFAULT_AMOUNT: i64 = 7;

/// Which side of the range an endpoint occupies. The since side offsets
/// backwards in time, the until side forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Since,
    Until,
}

impl Side {
    /// Apply this side's sign convention to a magnitude from the UI.
    pub fn signed(&self, magnitude: i64) -> i64 {
        match self {
            Side::Since => -magnitude,
            Side::Until => magnitude,
        }
    }
}

/// Unit of a relative offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grain {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Grain {
    pub const ALL: [Grain; 8] = [
        Grain::Second,
        Grain::Minute,
        Grain::Hour,
        Grain::Day,
        Grain::Week,
        Grain::Month,
        Grain::Quarter,
        Grain::Year,
    ];

    /// Canonical token: lowercase singular, as it appears inside
    /// `DATEADD(...)`.
    pub fn token(&self) -> &'static str {
        match self {
            Grain::Second => "second",
            Grain::Minute => "minute",
            Grain::Hour => "hour",
            Grain::Day => "day",
            Grain::Week => "week",
            Grain::Month => "month",
            Grain::Quarter => "quarter",
            Grain::Year => "year",
        }
    }

    pub fn from_token(token: &str) -> Option<Grain> {
        match token {
            "second" => Some(Grain::Second),
            "minute" => Some(Grain::Minute),
            "hour" => Some(Grain::Hour),
            "day" => Some(Grain::Day),
            "week" => Some(Grain::Week),
            "month" => Some(Grain::Month),
            "quarter" => Some(Grain::Quarter),
            "year" => Some(Grain::Year),
            _ => None,
        }
    }
}

/// The reference instant a relative offset is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Now,
    Today,
    Specific(NaiveDateTime),
}

impl Anchor {
    fn encode(&self) -> String {
        match self {
            Anchor::Now => "now".to_string(),
            Anchor::Today => "today".to_string(),
            Anchor::Specific(instant) => instant.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    fn decode(text: &str) -> Option<Anchor> {
        match text.trim().to_lowercase().as_str() {
            "now" => Some(Anchor::Now),
            "today" => Some(Anchor::Today),
            _ => NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
                .ok()
                .map(Anchor::Specific),
        }
    }

    /// The concrete instant this anchor refers to, given the current time.
    pub fn resolve(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            Anchor::Now => now,
            Anchor::Today => midnight(now),
            Anchor::Specific(instant) => *instant,
        }
    }
}

/// One side of the range, in one of four mutually exclusive modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Literal keyword `now`.
    Now,
    /// Literal keyword `today` (midnight anchor).
    Today,
    /// An absolute local timestamp, no timezone conversion.
    Specific(NaiveDateTime),
    /// `DATEADD(DATETIME("<anchor>"), <amount>, <grain>)`. The sign of
    /// `amount` carries the direction.
    Relative {
        anchor: Anchor,
        amount: i64,
        grain: Grain,
    },
}

impl Endpoint {
    /// Default endpoint for a side: seven days before (since) or after
    /// (until) today's midnight, day grain.
    pub fn default_for(side: Side) -> Endpoint {
        Endpoint::Relative {
            anchor: Anchor::Today,
            amount: side.signed(DEFAULT_AMOUNT),
            grain: Grain::Day,
        }
    }

    /// Evaluate this endpoint to a concrete instant. Calendar grains
    /// (month, quarter, year) step by calendar months; the rest are
    /// fixed durations.
    pub fn resolve(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            Endpoint::Now => now,
            Endpoint::Today => midnight(now),
            Endpoint::Specific(instant) => *instant,
            Endpoint::Relative {
                anchor,
                amount,
                grain,
            } => date_add(anchor.resolve(now), *amount, *grain),
        }
    }
}

/// Midnight at the start of `now`'s day.
pub fn midnight(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_hms_opt(0, 0, 0).unwrap_or(now)
}

/// Add a signed number of grain units to an instant.
fn date_add(base: NaiveDateTime, amount: i64, grain: Grain) -> NaiveDateTime {
    let months = |per_unit: i64| {
        let total = amount.unsigned_abs().saturating_mul(per_unit as u64);
        let months = Months::new(total.min(u32::MAX as u64) as u32);
        if amount < 0 {
            base.checked_sub_months(months)
        } else {
            base.checked_add_months(months)
        }
    };

    let shifted = match grain {
        Grain::Second => base.checked_add_signed(Duration::seconds(amount)),
        Grain::Minute => base.checked_add_signed(Duration::minutes(amount)),
        Grain::Hour => base.checked_add_signed(Duration::hours(amount)),
        Grain::Day => base.checked_add_signed(Duration::days(amount)),
        Grain::Week => base.checked_add_signed(Duration::weeks(amount)),
        Grain::Month => months(1),
        Grain::Quarter => months(3),
        Grain::Year => months(12),
    };

    shifted.unwrap_or(base)
}

/// The full decoded state of the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeState {
    pub since: Endpoint,
    pub until: Endpoint,
}

impl Default for RangeState {
    fn default() -> Self {
        RangeState {
            since: Endpoint::default_for(Side::Since),
            until: Endpoint::default_for(Side::Until),
        }
    }
}

impl RangeState {
    pub fn endpoint(&self, side: Side) -> &Endpoint {
        match side {
            Side::Since => &self.since,
            Side::Until => &self.until,
        }
    }

    /// Replace one side, keeping the other.
    pub fn with_endpoint(&self, side: Side, endpoint: Endpoint) -> RangeState {
        match side {
            Side::Since => RangeState {
                since: endpoint,
                ..*self
            },
            Side::Until => RangeState {
                until: endpoint,
                ..*self
            },
        }
    }
}

/// Decode a value string into range state.
///
/// Total over all inputs: the empty string and anything unrecognizable
/// yield defaults (per endpoint), never an error.
pub fn decode(input: &str) -> RangeState {
    let Some((since_text, until_text)) = input.split_once(" : ") else {
        return RangeState::default();
    };

    RangeState {
        since: parse_endpoint(since_text).unwrap_or_else(|| Endpoint::default_for(Side::Since)),
        until: parse_endpoint(until_text).unwrap_or_else(|| Endpoint::default_for(Side::Until)),
    }
}

/// Encode range state back into the value string.
pub fn encode(state: &RangeState) -> String {
    format!(
        "{} : {}",
        encode_endpoint(&state.since),
        encode_endpoint(&state.until)
    )
}

fn parse_endpoint(text: &str) -> Option<Endpoint> {
    let text = text.trim();

    match text.to_lowercase().as_str() {
        "now" => return Some(Endpoint::Now),
        "today" => return Some(Endpoint::Today),
        _ => {}
    }

    if let Ok(instant) = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT) {
        return Some(Endpoint::Specific(instant));
    }

    try_parse_relative(text)
}

fn try_parse_relative(text: &str) -> Option<Endpoint> {
    // DATEADD(DATETIME("<anchor>"), <signed int>, <grain>), keywords
    // matched case-insensitively.
    let re = Regex::new(r#"(?i)^DATEADD\(DATETIME\("([^"]+)"\),\s*(-?\d+),\s*(\w+)\)$"#).ok()?;
    let caps = re.captures(text)?;

    let anchor = Anchor::decode(caps.get(1)?.as_str())?;
    let amount: i64 = caps.get(2)?.as_str().parse().ok()?;
    let grain = Grain::from_token(&caps.get(3)?.as_str().to_lowercase())?;

    Some(Endpoint::Relative {
        anchor,
        amount,
        grain,
    })
}

fn encode_endpoint(endpoint: &Endpoint) -> String {
    match endpoint {
        Endpoint::Now => "now".to_string(),
        Endpoint::Today => "today".to_string(),
        Endpoint::Specific(instant) => instant.format(TIMESTAMP_FORMAT).to_string(),
        Endpoint::Relative {
            anchor,
            amount,
            grain,
        } => format!(
            "DATEADD(DATETIME(\"{}\"), {}, {})",
            anchor.encode(),
            amount,
            grain.token()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // Helper: fixed "now" for deterministic tests.
    // Monday, June 3, 2024, 12:30:00
    fn test_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    fn dt(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, min, sec)
            .unwrap()
    }

    #[test]
    fn test_decode_now_pair() {
        let state = decode("now : now");
        assert_eq!(state.since, Endpoint::Now);
        assert_eq!(state.until, Endpoint::Now);
    }

    #[test]
    fn test_decode_today_pair() {
        let state = decode("today : today");
        assert_eq!(state.since, Endpoint::Today);
        assert_eq!(state.until, Endpoint::Today);
    }

    #[test]
    fn test_decode_specific_pair() {
        let state = decode("2021-03-16T00:00:00 : 2021-03-17T00:00:00");
        assert_eq!(state.since, Endpoint::Specific(dt(2021, 3, 16, 0, 0, 0)));
        assert_eq!(state.until, Endpoint::Specific(dt(2021, 3, 17, 0, 0, 0)));
    }

    #[test]
    fn test_decode_relative_now_pair() {
        let state = decode(r#"DATEADD(DATETIME("now"), -7, day) : DATEADD(DATETIME("now"), 7, day)"#);
        assert_eq!(
            state.since,
            Endpoint::Relative {
                anchor: Anchor::Now,
                amount: -7,
                grain: Grain::Day,
            }
        );
        assert_eq!(
            state.until,
            Endpoint::Relative {
                anchor: Anchor::Now,
                amount: 7,
                grain: Grain::Day,
            }
        );
    }

    #[test]
    fn test_decode_relative_specific_anchor() {
        let state =
            decode(r#"DATEADD(DATETIME("2024-06-05T00:00:00"), -2, week) : today"#);
        assert_eq!(
            state.since,
            Endpoint::Relative {
                anchor: Anchor::Specific(dt(2024, 6, 5, 0, 0, 0)),
                amount: -2,
                grain: Grain::Week,
            }
        );
        assert_eq!(state.until, Endpoint::Today);
    }

    #[test]
    fn test_decode_empty_yields_default() {
        let state = decode("");
        assert_eq!(state, RangeState::default());
        assert_eq!(
            state.since,
            Endpoint::Relative {
                anchor: Anchor::Today,
                amount: -7,
                grain: Grain::Day,
            }
        );
        assert_eq!(
            state.until,
            Endpoint::Relative {
                anchor: Anchor::Today,
                amount: 7,
                grain: Grain::Day,
            }
        );
    }

    #[test]
    fn test_decode_is_total_on_garbage() {
        assert_eq!(decode("not a range at all"), RangeState::default());
        assert_eq!(decode(" : "), RangeState::default());
        assert_eq!(decode("DATEADD(oops"), RangeState::default());
    }

    #[test]
    fn test_decode_falls_back_per_endpoint() {
        // Only the malformed side defaults; the good side survives.
        let state = decode("garbage : now");
        assert_eq!(state.since, Endpoint::default_for(Side::Since));
        assert_eq!(state.until, Endpoint::Now);

        let state = decode("today : DATEADD(DATETIME(\"now\"), 3, parsec)");
        assert_eq!(state.since, Endpoint::Today);
        assert_eq!(state.until, Endpoint::default_for(Side::Until));
    }

    #[test]
    fn test_decode_anchor_keyword_case_insensitive() {
        let state = decode(r#"DATEADD(DATETIME("Today"), -1, day) : NOW"#);
        assert_eq!(
            state.since,
            Endpoint::Relative {
                anchor: Anchor::Today,
                amount: -1,
                grain: Grain::Day,
            }
        );
        assert_eq!(state.until, Endpoint::Now);
    }

    #[test]
    fn test_encode_now_pair() {
        let state = RangeState {
            since: Endpoint::Now,
            until: Endpoint::Now,
        };
        assert_eq!(encode(&state), "now : now");
    }

    #[test]
    fn test_encode_specific_reproduces_input() {
        let input = "2021-03-16T00:00:00 : 2021-03-17T00:00:00";
        assert_eq!(encode(&decode(input)), input);
    }

    #[test]
    fn test_encode_relative_token_spelling() {
        let state = RangeState {
            since: Endpoint::Relative {
                anchor: Anchor::Now,
                amount: -7,
                grain: Grain::Week,
            },
            until: Endpoint::Relative {
                anchor: Anchor::Now,
                amount: 7,
                grain: Grain::Day,
            },
        };
        assert_eq!(
            encode(&state),
            r#"DATEADD(DATETIME("now"), -7, week) : DATEADD(DATETIME("now"), 7, day)"#
        );
    }

    #[test]
    fn test_round_trip_all_modes() {
        let cases = [
            "now : today",
            "today : now",
            "2021-03-16T00:00:00 : 2021-03-17T23:59:59",
            r#"DATEADD(DATETIME("today"), -7, day) : DATEADD(DATETIME("today"), 7, day)"#,
            r#"DATEADD(DATETIME("now"), -3, month) : now"#,
            r#"DATEADD(DATETIME("2024-06-05T08:00:00"), -1, quarter) : 2024-06-05T08:00:00"#,
        ];
        for input in cases {
            let state = decode(input);
            assert_eq!(encode(&state), input);
            assert_eq!(decode(&encode(&state)), state);
        }
    }

    #[test]
    fn test_empty_input_matches_encoded_default() {
        assert_eq!(decode(""), decode(&encode(&RangeState::default())));
    }

    #[test]
    fn test_resolve_keywords() {
        let now = test_now();
        assert_eq!(Endpoint::Now.resolve(now), now);
        assert_eq!(Endpoint::Today.resolve(now), dt(2024, 6, 3, 0, 0, 0));
    }

    #[test]
    fn test_resolve_relative_days() {
        let now = test_now();
        let endpoint = Endpoint::Relative {
            anchor: Anchor::Today,
            amount: -7,
            grain: Grain::Day,
        };
        assert_eq!(endpoint.resolve(now), dt(2024, 5, 27, 0, 0, 0));
    }

    #[test]
    fn test_resolve_relative_calendar_grains() {
        let now = test_now();
        let month_back = Endpoint::Relative {
            anchor: Anchor::Now,
            amount: -1,
            grain: Grain::Month,
        };
        assert_eq!(month_back.resolve(now), dt(2024, 5, 3, 12, 30, 0));

        let quarter_forward = Endpoint::Relative {
            anchor: Anchor::Today,
            amount: 1,
            grain: Grain::Quarter,
        };
        assert_eq!(quarter_forward.resolve(now), dt(2024, 9, 3, 0, 0, 0));

        let year_back = Endpoint::Relative {
            anchor: Anchor::Today,
            amount: -1,
            grain: Grain::Year,
        };
        assert_eq!(year_back.resolve(now), dt(2023, 6, 3, 0, 0, 0));
    }

    #[test]
    fn test_resolve_month_end_clamps() {
        // Jan 31 plus one month clamps to the end of February.
        let base = Endpoint::Relative {
            anchor: Anchor::Specific(dt(2024, 1, 31, 0, 0, 0)),
            amount: 1,
            grain: Grain::Month,
        };
        assert_eq!(base.resolve(test_now()), dt(2024, 2, 29, 0, 0, 0));
    }

    #[test]
    fn test_resolve_specific_anchor() {
        let endpoint = Endpoint::Relative {
            anchor: Anchor::Specific(dt(2024, 6, 5, 0, 0, 0)),
            amount: 2,
            grain: Grain::Week,
        };
        assert_eq!(endpoint.resolve(test_now()), dt(2024, 6, 19, 0, 0, 0));
    }

    #[test]
    fn test_side_sign_convention() {
        assert_eq!(Side::Since.signed(7), -7);
        assert_eq!(Side::Until.signed(7), 7);
        assert_eq!(Side::Since.signed(0), 0);
    }

    #[test]
    fn test_grain_tokens_round_trip() {
        for grain in Grain::ALL {
            assert_eq!(Grain::from_token(grain.token()), Some(grain));
        }
        assert_eq!(Grain::from_token("fortnight"), None);
    }
}
