//! Edit transitions for the time-frame control.
//!
//! Each operation takes the current state plus the edit payload and
//! returns the next state. Operations that can reject bad input return
//! `Option`: `None` means the edit was invalid, the prior state stands,
//! and the caller must not emit a change notification.

use chrono::NaiveDateTime;

use crate::frame::{midnight, Anchor, Endpoint, Grain, RangeState, Side};

/// The four mutually exclusive endpoint modes a user can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Relative,
    Specific,
    Now,
    Today,
}

impl Mode {
    pub fn of(endpoint: &Endpoint) -> Mode {
        match endpoint {
            Endpoint::Now => Mode::Now,
            Endpoint::Today => Mode::Today,
            Endpoint::Specific(_) => Mode::Specific,
            Endpoint::Relative { .. } => Mode::Relative,
        }
    }
}

impl RangeState {
    /// Switch an endpoint to a different mode, resetting it to that
    /// mode's defaults. Nothing carries over from the prior mode.
    pub fn set_mode(&self, side: Side, mode: Mode, now: NaiveDateTime) -> RangeState {
        let endpoint = match mode {
            Mode::Now => Endpoint::Now,
            Mode::Today => Endpoint::Today,
            Mode::Specific => Endpoint::Specific(midnight(now)),
            Mode::Relative => Endpoint::default_for(side),
        };
        self.with_endpoint(side, endpoint)
    }

    /// Change the offset magnitude of a relative endpoint. The sign is
    /// applied from the side; negative magnitudes are rejected, as is
    /// the operation on a non-relative endpoint.
    pub fn set_amount(&self, side: Side, magnitude: i64) -> Option<RangeState> {
        if magnitude < 0 {
            return None;
        }
        let Endpoint::Relative { anchor, grain, .. } = *self.endpoint(side) else {
            return None;
        };
        Some(self.with_endpoint(
            side,
            Endpoint::Relative {
                anchor,
                amount: side.signed(magnitude),
                grain,
            },
        ))
    }

    /// Change the unit of a relative endpoint, keeping amount and anchor.
    pub fn set_grain(&self, side: Side, grain: Grain) -> Option<RangeState> {
        let Endpoint::Relative { anchor, amount, .. } = *self.endpoint(side) else {
            return None;
        };
        Some(self.with_endpoint(
            side,
            Endpoint::Relative {
                anchor,
                amount,
                grain,
            },
        ))
    }

    /// Change the anchor of a relative endpoint.
    pub fn set_anchor(&self, side: Side, anchor: Anchor) -> Option<RangeState> {
        let Endpoint::Relative { amount, grain, .. } = *self.endpoint(side) else {
            return None;
        };
        Some(self.with_endpoint(
            side,
            Endpoint::Relative {
                anchor,
                amount,
                grain,
            },
        ))
    }

    /// Set the picked instant of an endpoint: either a specific
    /// endpoint's value, or the specific anchor of a relative endpoint.
    pub fn set_specific(&self, side: Side, instant: NaiveDateTime) -> Option<RangeState> {
        match *self.endpoint(side) {
            Endpoint::Specific(_) => Some(self.with_endpoint(side, Endpoint::Specific(instant))),
            Endpoint::Relative {
                anchor: Anchor::Specific(_),
                amount,
                grain,
            } => Some(self.with_endpoint(
                side,
                Endpoint::Relative {
                    anchor: Anchor::Specific(instant),
                    amount,
                    grain,
                },
            )),
            _ => None,
        }
    }
}
