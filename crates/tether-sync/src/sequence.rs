//! Wraparound-safe comparison of bounded monotonic sequence counters.
//!
//! Snapshot sequence numbers live in the circular 32-bit space: they strictly
//! increase mod 2^32, so raw numeric `<` mis-orders values across the wrap
//! from `u32::MAX` back to `0`. The comparisons here interpret the wrapping
//! difference as signed, which is total over all pairs except values exactly
//! `2^31` apart — that tie is inherently ambiguous on a circle and is left
//! unresolved (callers never get close to half the space between two live
//! counters in practice).

/// Returns whether sequence `a` is newer than sequence `b`.
///
/// ```
/// use tether_sync::sequence::is_newer;
/// assert!(is_newer(2, 1));
/// assert!(!is_newer(1, 2));
/// assert!(!is_newer(1, 1));
/// assert!(is_newer(0, u32::MAX)); // wraparound
/// ```
#[inline]
pub fn is_newer(a: u32, b: u32) -> bool {
    a.wrapping_sub(b) as i32 > 0
}

/// Returns whether sequence `a` is older than sequence `b`.
#[inline]
pub fn is_older(a: u32, b: u32) -> bool {
    is_newer(b, a)
}

/// Signed wrapping distance from `a` to `b` (positive when `b` is newer).
///
/// ```
/// use tether_sync::sequence::wrapping_diff;
/// assert_eq!(wrapping_diff(1, 2), 1);
/// assert_eq!(wrapping_diff(2, 1), -1);
/// assert_eq!(wrapping_diff(u32::MAX, 0), 1);
/// assert_eq!(wrapping_diff(0, u32::MAX), -1);
/// ```
#[inline]
pub fn wrapping_diff(a: u32, b: u32) -> i32 {
    b.wrapping_sub(a) as i32
}
