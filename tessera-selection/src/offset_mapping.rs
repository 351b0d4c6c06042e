//! Offset mapping between source text and displayed text.
//!
//! A selectable may display a transformed version of its source text (a
//! masked password, a quoted prefix, collapsed whitespace). Selection
//! offsets live in displayed text; reading the selected source text goes
//! through an [`OffsetMapping`].

use std::sync::Arc;

/// Bidirectional offset mapping between source and displayed text.
pub trait OffsetMapping: Send + Sync {
    /// Maps a source offset to a displayed offset.
    fn original_to_transformed(&self, offset: usize) -> usize;

    /// Maps a displayed offset back to a source offset.
    fn transformed_to_original(&self, offset: usize) -> usize;
}

/// Mapping for text displayed as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityOffsetMapping;

impl OffsetMapping for IdentityOffsetMapping {
    fn original_to_transformed(&self, offset: usize) -> usize {
        offset
    }

    fn transformed_to_original(&self, offset: usize) -> usize {
        offset
    }
}

/// Wraps a caller supplied mapping and checks every result stays inside the
/// target text.
///
/// A mapping that returns an out of range offset is a bug in the plugged-in
/// transform, so violations panic with the offending values instead of
/// being clamped.
#[derive(Clone)]
pub struct ValidatingOffsetMapping {
    inner: Arc<dyn OffsetMapping>,
    original_len: usize,
    transformed_len: usize,
}

impl ValidatingOffsetMapping {
    /// Validates `inner` for a source of `original_len` bytes displayed as
    /// `transformed_len` bytes.
    pub fn new(inner: Arc<dyn OffsetMapping>, original_len: usize, transformed_len: usize) -> Self {
        Self {
            inner,
            original_len,
            transformed_len,
        }
    }
}

impl OffsetMapping for ValidatingOffsetMapping {
    fn original_to_transformed(&self, offset: usize) -> usize {
        let mapped = self.inner.original_to_transformed(offset);
        assert!(
            mapped <= self.transformed_len,
            "OffsetMapping::original_to_transformed returned invalid mapping: {offset} -> {mapped} \
             is not in range of transformed text [0, {}]",
            self.transformed_len
        );
        mapped
    }

    fn transformed_to_original(&self, offset: usize) -> usize {
        let mapped = self.inner.transformed_to_original(offset);
        assert!(
            mapped <= self.original_len,
            "OffsetMapping::transformed_to_original returned invalid mapping: {offset} -> {mapped} \
             is not in range of original text [0, {}]",
            self.original_len
        );
        mapped
    }
}
