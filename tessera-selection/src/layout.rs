//! Text layout capability consumed by the selection engine.
//!
//! ## Usage
//!
//! Implement [`TextLayout`] over whatever shaping engine renders a text block
//! and wrap each laid out result in a [`LayoutSnapshot`]. Snapshots are
//! immutable; a re-layout produces a new snapshot with a higher version.
//!
//! Offsets are UTF-8 byte offsets into [`TextLayout::text`] and always sit on
//! `char` boundaries. Positions are local to the block, with the origin at
//! its top-left corner.

use std::{fmt, ops::Range, sync::Arc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::px::{Px, PxPosition, PxRect, PxSize};

/// Resolved writing direction of a run or paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResolvedTextDirection {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

/// Queries over one laid out text block.
///
/// All queries must be total: out of range offsets and positions are clamped
/// by the implementation rather than rejected.
pub trait TextLayout: Send + Sync {
    /// The laid out text.
    fn text(&self) -> &str;

    /// Size of the laid out block.
    fn size(&self) -> PxSize;

    /// Number of visual lines, at least one.
    fn line_count(&self) -> usize;

    /// Index of the visual line containing `offset`.
    fn line_for_offset(&self, offset: usize) -> usize;

    /// Top edge of `line`.
    fn line_top(&self, line: usize) -> Px;

    /// Bottom edge of `line`.
    fn line_bottom(&self, line: usize) -> Px;

    /// Caret x position for `offset`.
    ///
    /// At a bidi run boundary a caret has two candidate positions;
    /// `use_primary_direction` picks the one belonging to the paragraph
    /// direction.
    fn horizontal_position(&self, offset: usize, use_primary_direction: bool) -> Px;

    /// Direction of the bidi run containing `offset`.
    fn bidi_run_direction(&self, offset: usize) -> ResolvedTextDirection;

    /// Base direction of the paragraph containing `offset`.
    fn paragraph_direction(&self, offset: usize) -> ResolvedTextDirection;

    /// Nearest caret offset for a local position.
    fn offset_for_position(&self, position: PxPosition) -> usize;

    /// Rectangles covering the glyphs of `range`, one or more per line.
    fn path_for_range(&self, range: Range<usize>) -> Vec<PxRect>;

    /// Length of the text in bytes.
    fn text_len(&self) -> usize {
        self.text().len()
    }

    /// Word containing `offset`.
    ///
    /// When `offset` sits between a word and a non-word run, the word wins.
    fn word_boundary(&self, offset: usize) -> Range<usize> {
        word_boundary_in(self.text(), offset)
    }

    /// Hard-line paragraph containing `offset`, without its line break.
    fn paragraph_boundary(&self, offset: usize) -> Range<usize> {
        paragraph_boundary_in(self.text(), offset)
    }
}

/// Clamps `offset` to the text and moves it back onto a `char` boundary.
pub fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

pub(crate) fn word_boundary_in(text: &str, offset: usize) -> Range<usize> {
    if text.is_empty() {
        return 0..0;
    }
    let offset = floor_char_boundary(text, offset);
    let segments: Vec<(usize, &str)> = text.split_word_bound_indices().collect();
    let index = segments
        .iter()
        .position(|(start, segment)| offset < start + segment.len())
        .unwrap_or(segments.len() - 1);

    let is_word = |segment: &str| segment.chars().any(char::is_alphanumeric);
    let (start, segment) = segments[index];
    if !is_word(segment) && offset == start && index > 0 {
        let (prev_start, prev) = segments[index - 1];
        if is_word(prev) {
            return prev_start..prev_start + prev.len();
        }
    }
    start..start + segment.len()
}

pub(crate) fn paragraph_boundary_in(text: &str, offset: usize) -> Range<usize> {
    let offset = floor_char_boundary(text, offset);
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    start..end
}

/// An immutable, versioned layout result for one selectable.
///
/// Selectables swap whole snapshots; readers holding an older snapshot keep
/// a consistent view of the previous layout.
#[derive(Clone)]
pub struct LayoutSnapshot {
    layout: Arc<dyn TextLayout>,
    version: u64,
}

impl LayoutSnapshot {
    /// Wraps a laid out block.
    pub fn new(layout: Arc<dyn TextLayout>, version: u64) -> Self {
        Self { layout, version }
    }

    /// The layout queries.
    pub fn layout(&self) -> &dyn TextLayout {
        self.layout.as_ref()
    }

    /// Shared handle to the layout.
    pub fn shared(&self) -> Arc<dyn TextLayout> {
        Arc::clone(&self.layout)
    }

    /// Layout version, bumped on every re-layout.
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl fmt::Debug for LayoutSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutSnapshot")
            .field("version", &self.version)
            .field("text_len", &self.layout.text_len())
            .finish()
    }
}
