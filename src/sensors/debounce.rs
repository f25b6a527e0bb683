//! Timestamp-based digital debouncer.
//!
//! A raw level that differs from the confirmed level becomes a
//! *candidate*; the candidate is confirmed once a later poll still sees it
//! after the confirmation window.  A poll that sees the confirmed level
//! again discards the candidate, so glitches shorter than the window never
//! produce a transition.  Nothing here blocks: the loop keeps polling and
//! the debouncer only compares timestamps.
//!
//! ```text
//!  raw:        ‾‾‾‾‾|____|‾‾‾‾‾‾‾‾‾‾|_________________
//!  candidate:        t0   (dropped)  t1
//!  confirmed:  ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|_________  (t1 + window)
//! ```

use crate::timing::{Millis, has_elapsed};

/// A confirmed level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: bool,
    pub to: bool,
}

#[derive(Debug, Clone)]
pub struct DebouncedInput {
    confirmed: bool,
    /// Timestamp of the first poll that saw `!confirmed`.
    candidate_since: Option<Millis>,
    window_ms: u32,
}

impl DebouncedInput {
    /// Start with `initial` already confirmed (the level read at boot).
    pub fn new(initial: bool, window_ms: u32) -> Self {
        Self {
            confirmed: initial,
            candidate_since: None,
            window_ms,
        }
    }

    /// The last confirmed level.
    pub fn level(&self) -> bool {
        self.confirmed
    }

    /// Whether a differing level is currently waiting for confirmation.
    pub fn is_pending(&self) -> bool {
        self.candidate_since.is_some()
    }

    /// Feed one raw sample taken at `now`.
    ///
    /// Returns the transition exactly once, on the poll that confirms it.
    pub fn poll(&mut self, raw: bool, now: Millis) -> Option<Transition> {
        if raw == self.confirmed {
            self.candidate_since = None;
            return None;
        }

        match self.candidate_since {
            None => {
                self.candidate_since = Some(now);
                None
            }
            Some(since) if has_elapsed(now, since, self.window_ms) => {
                let from = self.confirmed;
                self.confirmed = raw;
                self.candidate_since = None;
                Some(Transition { from, to: raw })
            }
            Some(_) => None,
        }
    }
}
