//! Wraparound-safe monotonic time arithmetic.
//!
//! The firmware clock is a `u32` millisecond counter that wraps after
//! ~49.7 days.  Every elapsed-time check in the crate goes through these
//! helpers; comparing two raw timestamps with `<` is wrong once the counter
//! wraps.

/// Milliseconds since boot, truncated to `u32`.
pub type Millis = u32;

/// Milliseconds elapsed from `since` to `now`, correct across one wrap.
#[inline]
pub fn elapsed_ms(now: Millis, since: Millis) -> u32 {
    now.wrapping_sub(since)
}

/// `true` once at least `window` ms have passed since `since`.
#[inline]
pub fn has_elapsed(now: Millis, since: Millis, window: u32) -> bool {
    elapsed_ms(now, since) >= window
}

/// `true` once strictly more than `interval` ms have passed since `since`.
///
/// Periodic sampling and reporting use the strict form so a pass landing
/// exactly on the interval boundary waits for the next one.
#[inline]
pub fn interval_passed(now: Millis, since: Millis, interval: u32) -> bool {
    elapsed_ms(now, since) > interval
}
