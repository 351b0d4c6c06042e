//! Selection data model.
//!
//! A [`Selection`] is an immutable pair of anchors, each naming a selectable
//! block and a character offset inside it. The per-block view of a selection
//! is a set of [`SelectionRange`]s, derived from the selection on every
//! change and never edited directly.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::layout::ResolvedTextDirection;

static NEXT_SELECTABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a registered selectable.
///
/// Ids increase monotonically and are never reused, even after the
/// selectable is unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectableId(u64);

impl SelectableId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SELECTABLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SelectableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One end of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnchorInfo {
    /// Block holding this end.
    pub selectable_id: SelectableId,
    /// Character offset inside the block's text.
    pub offset: usize,
    /// Bidi direction of the run at `offset`.
    pub direction: ResolvedTextDirection,
}

impl AnchorInfo {
    /// Creates an anchor.
    pub fn new(selectable_id: SelectableId, offset: usize, direction: ResolvedTextDirection) -> Self {
        Self {
            selectable_id,
            offset,
            direction,
        }
    }
}

/// The active selection.
///
/// `handles_crossed` is true when `start` sits after `end` in document order,
/// i.e. the user dragged one handle past the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Selection {
    /// Anchor where the selection started.
    pub start: AnchorInfo,
    /// Anchor where the selection currently ends.
    pub end: AnchorInfo,
    /// Whether `start` lies after `end` in document order.
    pub handles_crossed: bool,
}

impl Selection {
    /// Whether both anchors name the same position.
    pub fn is_collapsed(&self) -> bool {
        self.start.selectable_id == self.end.selectable_id && self.start.offset == self.end.offset
    }

    /// Anchors ordered so the first one comes first in document order.
    pub fn ordered(&self) -> (AnchorInfo, AnchorInfo) {
        if self.handles_crossed {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        }
    }
}

/// The part of a selection that falls inside one selectable.
///
/// `start_offset` may exceed `end_offset` when handles are crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectionRange {
    /// Block this range belongs to.
    pub selectable_id: SelectableId,
    /// Offset where the start handle maps into this block.
    pub start_offset: usize,
    /// Offset where the end handle maps into this block.
    pub end_offset: usize,
    /// Direction at `start_offset`.
    pub start_direction: ResolvedTextDirection,
    /// Direction at `end_offset`.
    pub end_direction: ResolvedTextDirection,
}

impl SelectionRange {
    /// Lower offset of the range.
    pub fn min(&self) -> usize {
        self.start_offset.min(self.end_offset)
    }

    /// Upper offset of the range.
    pub fn max(&self) -> usize {
        self.start_offset.max(self.end_offset)
    }

    /// Whether the range selects no characters.
    pub fn is_collapsed(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Whether start lies after end.
    pub fn is_crossed(&self) -> bool {
        self.start_offset > self.end_offset
    }

    /// Normalized `[min, max)` range.
    pub fn as_range(&self) -> std::ops::Range<usize> {
        self.min()..self.max()
    }
}

/// How far an initial selection or extension snaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SelectionAdjustment {
    /// Exact character offsets.
    #[default]
    Character,
    /// Expand to word boundaries.
    Word,
    /// Expand to the enclosing hard-line paragraph.
    Paragraph,
}
