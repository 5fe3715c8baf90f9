//! Tick/millisecond conversions.
//!
//! Mask cadences are configured in ticks. The host decides how long a tick is;
//! everything that needs wall-clock time goes through this module so the
//! conversion rules stay in one place.

use std::time::Duration;

/// Length of one tick when the host does not say otherwise.
pub const DEFAULT_MILLIS_PER_TICK: u64 = 50;

/// Convert a viewer-update tick count into the render cache TTL in millis.
///
/// Tick counts below 1 are treated as 1, and the result is never below 1ms.
///
/// # Examples
/// ```
/// use roster_types::ticks::viewer_ttl_millis;
/// assert_eq!(viewer_ttl_millis(1, 50), 50);
/// assert_eq!(viewer_ttl_millis(4, 50), 200);
/// assert_eq!(viewer_ttl_millis(0, 50), 50);
/// assert_eq!(viewer_ttl_millis(-3, 50), 50);
/// assert_eq!(viewer_ttl_millis(5, 0), 1);
/// ```
pub fn viewer_ttl_millis(ticks: i64, millis_per_tick: u64) -> u64 {
    let ticks = ticks.max(1) as u64;
    ticks.saturating_mul(millis_per_tick).max(1)
}

/// Convert a tick count into a [`Duration`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use roster_types::ticks::ticks_to_duration;
/// assert_eq!(ticks_to_duration(20, 50), Duration::from_secs(1));
/// assert_eq!(ticks_to_duration(0, 50), Duration::ZERO);
/// ```
pub fn ticks_to_duration(ticks: u64, millis_per_tick: u64) -> Duration {
    Duration::from_millis(ticks.saturating_mul(millis_per_tick))
}
