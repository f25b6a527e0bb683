//! Manual dose push-button.
//!
//! ## Hardware
//!
//! Active-low momentary switch with internal pull-up: the line reads LOW
//! while the button is held.  The main loop samples the raw level through
//! [`InputPort`](crate::app::ports::InputPort) every pass and feeds it to
//! [`ManualButton::tick`], which debounces without blocking.
//!
//! | Confirmed edge | Event      | Effect                      |
//! |----------------|------------|-----------------------------|
//! | HIGH → LOW     | `Pressed`  | one dose start request      |
//! | LOW → HIGH     | `Released` | none                        |
//!
//! Holding the button does not repeat the request.

use crate::sensors::DebouncedInput;
use crate::timing::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
    Released,
}

pub struct ManualButton {
    input: DebouncedInput,
}

impl ManualButton {
    /// `initial_line_high` is the raw level sampled at boot.
    pub fn new(initial_line_high: bool, debounce_ms: u32) -> Self {
        Self {
            input: DebouncedInput::new(initial_line_high, debounce_ms),
        }
    }

    /// Feed one raw sample; returns a confirmed press or release.
    pub fn tick(&mut self, raw_line_high: bool, now_ms: Millis) -> Option<ButtonEvent> {
        self.input.poll(raw_line_high, now_ms).map(|t| {
            if t.to {
                ButtonEvent::Released
            } else {
                ButtonEvent::Pressed
            }
        })
    }

    pub fn is_held(&self) -> bool {
        !self.input.level()
    }
}
