//! HTTP surface of the time-frame control.
//!
//! `GET /frame` renders the control for a `value` query parameter.
//! `GET /frame/edit` applies one edit operation and answers with the
//! freshly encoded value; a rejected edit answers with the unchanged
//! value and `changed: false`, so callers never observe a phantom
//! change notification.

use actix_web::{get, web, Responder};
use chrono::{Local, NaiveDateTime};
use itertools::Itertools;
use maud::{html, Markup};
use serde::{Deserialize, Serialize};
use urlencoding::encode as urlencode;

use crate::frame::{decode, encode, Anchor, Grain, RangeState, Side, TIMESTAMP_FORMAT};
use crate::handlers::{page_header, Css};
use crate::locale::CalendarLocale;
use crate::store::Store;
use crate::transitions::Mode;
use crate::view::{
    mode_options, AnchorChoice, EndpointControl, EndpointView, FrameView,
};

#[derive(Deserialize)]
pub struct FrameQuery {
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
pub struct EditQuery {
    #[serde(default)]
    value: String,
    op: String,
    side: String,
    mode: Option<String>,
    amount: Option<String>,
    grain: Option<String>,
    anchor: Option<String>,
    date: Option<String>,
}

#[derive(Serialize)]
pub struct EditResponse {
    pub value: String,
    pub changed: bool,
}

#[get("/frame")]
pub async fn frame_page(
    query: web::Query<FrameQuery>,
    store: web::Data<Store>,
) -> Result<impl Responder, actix_web::Error> {
    let state = decode(&query.value);
    let locale = CalendarLocale::for_code(store.locale());
    let view = FrameView::build(&state, locale, Local::now().naive_local());

    // Canonical value, so edit links round-trip even if the stored
    // value was malformed.
    let value = encode(&state);

    Ok(render_frame(&view, &value))
}

#[get("/frame/edit")]
pub async fn frame_edit(
    query: web::Query<EditQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let state = decode(&query.value);
    let now = Local::now().naive_local();

    let response = match apply_edit(&state, &query, now) {
        Some(next) => {
            let value = encode(&next);
            log::info!("frame edit {} {} -> {}", query.op, query.side, value);
            EditResponse {
                value,
                changed: true,
            }
        }
        None => {
            log::info!("frame edit {} {} rejected", query.op, query.side);
            EditResponse {
                value: query.value.clone(),
                changed: false,
            }
        }
    };

    Ok(web::Json(response))
}

/// Dispatch one edit operation. `None` means the edit was rejected and
/// no change may be reported.
pub fn apply_edit(state: &RangeState, edit: &EditQuery, now: NaiveDateTime) -> Option<RangeState> {
    let side = match edit.side.as_str() {
        "since" => Side::Since,
        "until" => Side::Until,
        _ => return None,
    };

    match edit.op.as_str() {
        "set_mode" => {
            let mode = match edit.mode.as_deref()? {
                "relative" => Mode::Relative,
                "specific" => Mode::Specific,
                "now" => Mode::Now,
                "today" => Mode::Today,
                _ => return None,
            };
            Some(state.set_mode(side, mode, now))
        }
        "set_amount" => {
            let magnitude: i64 = edit.amount.as_deref()?.trim().parse().ok()?;
            state.set_amount(side, magnitude)
        }
        "set_grain" => {
            let grain = Grain::from_token(edit.grain.as_deref()?)?;
            state.set_grain(side, grain)
        }
        "set_anchor" => {
            let anchor = match edit.anchor.as_deref()? {
                "now" => Anchor::Now,
                "today" => Anchor::Today,
                text => Anchor::Specific(
                    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()?,
                ),
            };
            state.set_anchor(side, anchor)
        }
        "set_specific" => {
            let instant =
                NaiveDateTime::parse_from_str(edit.date.as_deref()?, TIMESTAMP_FORMAT).ok()?;
            state.set_specific(side, instant)
        }
        _ => None,
    }
}

fn edit_url(value: &str, params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .map(|(key, param)| format!("{}={}", key, urlencode(param)))
        .join("&");
    format!("/frame/edit?value={}&{}", urlencode(value), query)
}

fn side_token(side: Side) -> &'static str {
    match side {
        Side::Since => "since",
        Side::Until => "until",
    }
}

fn render_frame(view: &FrameView, value: &str) -> Markup {
    html! {
        (Css("/res/styles.css"))
        (page_header(view.header))
        h2.frame-title { (view.header) }
        .frame {
            (render_endpoint(&view.since, value))
            (render_endpoint(&view.until, value))
            @if let Some(anchor) = &view.anchor {
                @let side = side_token(anchor.side);
                .anchor-section {
                    h3 { (anchor.heading) }
                    @match &anchor.choice {
                        AnchorChoice::Now => {
                            span.anchor-option.selected { "Now" }
                            a.anchor-option href=(edit_url(value, &[("op", "set_anchor"), ("side", side), ("anchor", "today")])) { "Date/Time" }
                        }
                        AnchorChoice::DateTime { value: picked } => {
                            a.anchor-option href=(edit_url(value, &[("op", "set_anchor"), ("side", side), ("anchor", "now")])) { "Now" }
                            span.anchor-option.selected { "Date/Time" }
                            form action="/frame/edit" method="get" {
                                input type="hidden" name="value" value=(value);
                                input type="hidden" name="op" value="set_anchor";
                                input type="hidden" name="side" value=(side);
                                input type="text" name="anchor" placeholder="Select date"
                                    value=(picked.as_deref().unwrap_or(""));
                            }
                        }
                    }
                }
            }
            .frame-preview {
                h3 { "Actual time range" }
                span { (view.preview_since) " ≤ col < " (view.preview_until) }
            }
            (calendar_day_row(view.locale))
        }
    }
}

fn render_endpoint(endpoint: &EndpointView, value: &str) -> Markup {
    let side = side_token(endpoint.side);

    html! {
        .endpoint {
            h3 { (endpoint.heading) }
            ul.mode-select {
                @for (mode, label) in mode_options() {
                    @let token = match mode {
                        Mode::Relative => "relative",
                        Mode::Specific => "specific",
                        Mode::Now => "now",
                        Mode::Today => "today",
                    };
                    li .selected[label == endpoint.mode_label] {
                        a href=(edit_url(value, &[("op", "set_mode"), ("side", side), ("mode", token)])) { (label) }
                    }
                }
            }
            @match &endpoint.control {
                EndpointControl::Relative { magnitude, grain_options, .. } => {
                    form action="/frame/edit" method="get" {
                        input type="hidden" name="value" value=(value);
                        input type="hidden" name="op" value="set_amount";
                        input type="hidden" name="side" value=(side);
                        input type="number" name="amount" min="0" value=(magnitude);
                    }
                    ul.grain-select {
                        @for option in grain_options {
                            li .selected[option.selected] {
                                a href=(edit_url(value, &[("op", "set_grain"), ("side", side), ("grain", option.grain.token())])) { (option.label) }
                            }
                        }
                    }
                }
                EndpointControl::Specific { value: instant } => {
                    form action="/frame/edit" method="get" {
                        input type="hidden" name="value" value=(value);
                        input type="hidden" name="op" value="set_specific";
                        input type="hidden" name="side" value=(side);
                        input type="text" name="date" placeholder="Select date" value=(instant);
                    }
                }
                EndpointControl::Keyword => {}
            }
        }
    }
}

// Day-of-week header row of the date picker, in the store's locale.
fn calendar_day_row(locale: &CalendarLocale) -> Markup {
    html! {
        .calendar-days {
            @for day in locale.day_abbrevs {
                span.calendar-day { (day) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    fn edit(value: &str, op: &str, side: &str) -> EditQuery {
        EditQuery {
            value: value.to_string(),
            op: op.to_string(),
            side: side.to_string(),
            mode: None,
            amount: None,
            grain: None,
            anchor: None,
            date: None,
        }
    }

    #[test]
    fn test_apply_edit_grain_change() {
        let value = r#"DATEADD(DATETIME("now"), -7, day) : DATEADD(DATETIME("now"), 7, day)"#;
        let state = decode(value);
        let query = EditQuery {
            grain: Some("week".to_string()),
            ..edit(value, "set_grain", "since")
        };

        let next = apply_edit(&state, &query, test_now()).unwrap();
        assert_eq!(
            encode(&next),
            r#"DATEADD(DATETIME("now"), -7, week) : DATEADD(DATETIME("now"), 7, day)"#
        );
    }

    #[test]
    fn test_apply_edit_rejects_non_numeric_amount() {
        let state = RangeState::default();
        let query = EditQuery {
            amount: Some("abc".to_string()),
            ..edit("", "set_amount", "since")
        };
        assert_eq!(apply_edit(&state, &query, test_now()), None);
    }

    #[test]
    fn test_apply_edit_rejects_unknown_op_and_side() {
        let state = RangeState::default();
        assert_eq!(
            apply_edit(&state, &edit("", "set_everything", "since"), test_now()),
            None
        );
        assert_eq!(
            apply_edit(&state, &edit("", "set_grain", "middle"), test_now()),
            None
        );
    }

    #[test]
    fn test_apply_edit_mode_switch() {
        let state = decode("today : now");
        let query = EditQuery {
            mode: Some("relative".to_string()),
            ..edit("today : now", "set_mode", "since")
        };
        let next = apply_edit(&state, &query, test_now()).unwrap();
        assert_eq!(
            encode(&next),
            r#"DATEADD(DATETIME("today"), -7, day) : now"#
        );
    }

    #[test]
    fn test_apply_edit_anchor_date() {
        let value = r#"DATEADD(DATETIME("now"), -7, day) : now"#;
        let query = EditQuery {
            anchor: Some("2024-06-05T00:00:00".to_string()),
            ..edit(value, "set_anchor", "since")
        };
        let next = apply_edit(&decode(value), &query, test_now()).unwrap();
        assert_eq!(
            encode(&next),
            r#"DATEADD(DATETIME("2024-06-05T00:00:00"), -7, day) : now"#
        );
    }

    #[test]
    fn test_anchor_controls_target_the_relative_side() {
        // Only the until endpoint is relative, so the anchor section
        // must edit until; a since-targeted anchor edit would be
        // rejected and the controls would silently do nothing.
        let value = r#"now : DATEADD(DATETIME("now"), 7, day)"#;
        let state = decode(value);
        let view = FrameView::build(&state, CalendarLocale::for_code(None), test_now());
        let markup = render_frame(&view, value).into_string();
        assert!(markup.contains("op=set_anchor&amp;side=until&amp;anchor=today"));
        assert!(!markup.contains("op=set_anchor&amp;side=since"));

        let query = EditQuery {
            anchor: Some("today".to_string()),
            ..edit(value, "set_anchor", "until")
        };
        let next = apply_edit(&state, &query, test_now()).unwrap();
        assert_eq!(
            encode(&next),
            r#"now : DATEADD(DATETIME("today"), 7, day)"#
        );

        let rejected = EditQuery {
            anchor: Some("today".to_string()),
            ..edit(value, "set_anchor", "since")
        };
        assert_eq!(apply_edit(&state, &rejected, test_now()), None);
    }

    #[test]
    fn test_edit_url_encodes_value() {
        let url = edit_url("now : now", &[("op", "set_mode"), ("side", "since")]);
        assert_eq!(url, "/frame/edit?value=now%20%3A%20now&op=set_mode&side=since");
    }
}
