/// Safely converts an `i64` to a `usize` if and only if it can be
/// represented exactly.
///
/// ## Returns
/// `None` when the value is negative or exceeds the maximum representable
/// `usize`.
///
/// ## Example
/// ```
/// use tusk::util::num::i64_to_usize;
///
/// assert_eq!(i64_to_usize(42), Some(42));
/// assert_eq!(i64_to_usize(-1), None);
/// ```
#[must_use]
pub fn i64_to_usize(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}

/// Safely converts a `usize` to an `i64` if and only if it can be
/// represented exactly.
///
/// ## Returns
/// `None` when the value exceeds `i64::MAX`.
///
/// ## Example
/// ```
/// use tusk::util::num::usize_to_i64;
///
/// assert_eq!(usize_to_i64(7), Some(7));
/// ```
#[must_use]
pub fn usize_to_i64(value: usize) -> Option<i64> {
    i64::try_from(value).ok()
}
