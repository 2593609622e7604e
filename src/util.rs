/// Numeric conversion helpers.
///
/// This module provides safe functions for converting between integer and
/// index types without silent truncation or sign surprises. Use these
/// helpers whenever a script-level `i64` has to become a `usize` (indices,
/// array sizes) or back (collection lengths).
///
/// All functions return an `Option`, which is `Some` if the conversion is
/// lossless and valid, or `None` otherwise.
pub mod num;
