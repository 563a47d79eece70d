//! Millisecond timestamp helpers
//!
//! Timestamps are a free-running `u32` millisecond counter that wraps after
//! about 49.7 days. All comparisons go through the signed difference so they
//! stay correct across the wrap.

/// Milliseconds since an arbitrary epoch, wrapping
pub type Millis = u32;

/// Time elapsed from `start` to `now`
#[inline]
pub fn elapsed_ms(now: Millis, start: Millis) -> u32 {
    now.wrapping_sub(start)
}

/// Deadline `ms` milliseconds after `now`
#[inline]
pub fn deadline_after(now: Millis, ms: u32) -> Millis {
    now.wrapping_add(ms)
}

/// True once `now` is at or past `deadline`
///
/// Computed as `deadline - now <= 0` in the signed 32-bit domain.
#[inline]
pub fn deadline_reached(deadline: Millis, now: Millis) -> bool {
    (deadline.wrapping_sub(now) as i32) <= 0
}
