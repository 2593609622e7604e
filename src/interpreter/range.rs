use crate::util::num::{i64_to_usize, usize_to_i64};

/// A range with optional, possibly negative bounds, as written in source.
///
/// `[..]` copies everything, `[a..]` runs to the end, `[..b]` starts at the
/// beginning, `[a..b]` selects both ends inclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeBounds {
    /// Start bound; `None` means "from the beginning".
    pub start: Option<i64>,
    /// End bound (inclusive); `None` means "to the end".
    pub end:   Option<i64>,
}

impl RangeBounds {
    /// `true` when both bounds are absent, i.e. the range selects the whole
    /// collection.
    #[must_use]
    pub const fn is_full_copy(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Normalizes a single, possibly negative index against a collection length.
///
/// A negative index `i` is first rewritten as `len + i`. The result must
/// land inside `[0, len)`.
///
/// # Returns
/// The normalized index, or `None` when it falls outside the collection.
///
/// # Example
/// ```
/// use tusk::interpreter::range::normalize_index;
///
/// assert_eq!(normalize_index(0, 5), Some(0));
/// assert_eq!(normalize_index(-1, 5), Some(4));
/// assert_eq!(normalize_index(5, 5), None);
/// assert_eq!(normalize_index(-6, 5), None);
/// ```
#[must_use]
pub fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = usize_to_i64(len)?;
    let index = if index < 0 { len + index } else { index };

    if index < 0 || index >= len {
        return None;
    }

    i64_to_usize(index)
}

/// Normalizes a range against a collection length.
///
/// A missing start becomes `0`, a missing end becomes `len - 1`; present
/// negative bounds are rewritten as `len + bound`. After rewriting, bounds
/// outside `[0, len)` are rejected rather than clamped, and descending
/// ranges (`start > end`) are rejected. Both ends are inclusive.
///
/// # Returns
/// `Some((start, end))` with `start <= end`, or `None` when the range is
/// invalid for the collection.
///
/// # Example
/// ```
/// use tusk::interpreter::range::{RangeBounds, normalize_range};
///
/// let r = RangeBounds { start: Some(-2), end: Some(-1) };
/// assert_eq!(normalize_range(5, &r), Some((3, 4)));
///
/// let full = RangeBounds::default();
/// assert_eq!(normalize_range(5, &full), Some((0, 4)));
///
/// let descending = RangeBounds { start: Some(3), end: Some(1) };
/// assert_eq!(normalize_range(5, &descending), None);
/// ```
#[must_use]
pub fn normalize_range(len: usize, range: &RangeBounds) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }

    let start = match range.start {
        Some(bound) => normalize_index(bound, len)?,
        None => 0,
    };

    let end = match range.end {
        Some(bound) => normalize_index(bound, len)?,
        None => len - 1,
    };

    if start > end {
        return None;
    }

    Some((start, end))
}
