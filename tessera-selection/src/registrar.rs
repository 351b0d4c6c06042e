//! Cross-widget selection registry.
//!
//! ## Usage
//!
//! Create one [`SelectionRegistrar`] per selection container and hand clones
//! of it to the components that need it. It tracks which selectables are
//! mounted, in document order, and owns the single active [`Selection`].
//!
//! The per-block view of the selection ([`SelectionRegistrar::subselections`])
//! is recomputed from the selection on every change and swapped in as a whole
//! map, so readers never observe a partially updated set.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    error::{SelectionError, SelectionResult},
    geometry::{clamp_offset, is_out_of_boundary, offset_for_position, raw_offset_for_position},
    layout::{LayoutSnapshot, TextLayout},
    px::PxPosition,
    selectable::{ScreenTransform, Selectable},
    selection::{AnchorInfo, SelectableId, Selection, SelectionAdjustment, SelectionRange},
};

/// Per-block ranges of the active selection.
pub type Subselections = Arc<FxHashMap<SelectableId, SelectionRange>>;

struct Entry {
    id: SelectableId,
    selectable: Weak<dyn Selectable>,
}

#[derive(Default)]
struct RegistrarState {
    entries: Vec<Entry>,
    selection: Option<Selection>,
    subselections: Subselections,
    geometry_version: u64,
    finished: u64,
}

impl RegistrarState {
    fn index_of(&self, id: SelectableId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    fn set_selection(&mut self, selection: Option<Selection>, blocks: &[Block]) {
        self.subselections = Arc::new(match &selection {
            Some(selection) => project(selection, self, blocks),
            None => FxHashMap::default(),
        });
        self.selection = selection;
        self.geometry_version += 1;
    }
}

/// A mounted, laid out and placed selectable.
struct Block {
    id: SelectableId,
    snapshot: LayoutSnapshot,
    transform: ScreenTransform,
}

impl Block {
    fn layout(&self) -> &dyn TextLayout {
        self.snapshot.layout()
    }

    fn len(&self) -> usize {
        self.layout().text_len()
    }

    fn anchor(&self, offset: usize, is_end: bool) -> AnchorInfo {
        let offset = clamp_offset(self.layout(), offset);
        let direction_offset = if is_end {
            clamp_offset(self.layout(), offset.saturating_sub(1))
        } else {
            offset
        };
        AnchorInfo::new(self.id, offset, self.layout().bidi_run_direction(direction_offset))
    }
}

/// Shared handle to the selection registry of one container.
///
/// Cloning is cheap and every clone observes the same state.
#[derive(Clone, Default)]
pub struct SelectionRegistrar {
    inner: Arc<RwLock<RegistrarState>>,
}

impl SelectionRegistrar {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mounted selectable and returns its id.
    ///
    /// Registering the same selectable twice without unregistering it first
    /// is a contract violation and returns
    /// [`SelectionError::DuplicateRegistration`].
    #[tracing::instrument(level = "debug", skip(self, selectable))]
    pub fn register(&self, selectable: &Arc<dyn Selectable>) -> SelectionResult<SelectableId> {
        let weak = Arc::downgrade(selectable);
        let id = {
            let mut state = self.inner.write();
            if let Some(existing) = state
                .entries
                .iter()
                .find(|entry| Weak::ptr_eq(&entry.selectable, &weak))
            {
                return Err(SelectionError::DuplicateRegistration(existing.id));
            }
            state.entries.retain(|entry| entry.selectable.strong_count() > 0);
            let id = SelectableId::next();
            state.entries.push(Entry {
                id,
                selectable: weak,
            });
            id
        };
        selectable.attached(id, self);
        debug!("Registered selectable {id}");
        Ok(id)
    }

    /// Unregisters a selectable.
    ///
    /// When the block holds part of the active selection the selection is
    /// cleared.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn unregister(&self, id: SelectableId) -> SelectionResult<()> {
        let removed = {
            let mut state = self.inner.write();
            let index = state
                .index_of(id)
                .ok_or(SelectionError::UnknownSelectable(id))?;
            let entry = state.entries.remove(index);
            let holds_anchor = state.selection.is_some_and(|selection| {
                selection.start.selectable_id == id || selection.end.selectable_id == id
            });
            if holds_anchor || state.subselections.contains_key(&id) {
                debug!("Unregistered selectable {id} held the selection, clearing it");
                state.set_selection(None, &[]);
            } else if let Some(selection) = state.selection {
                let blocks = blocks_of(&state);
                state.set_selection(Some(selection), &blocks);
            }
            entry
        };
        if let Some(selectable) = removed.selectable.upgrade() {
            selectable.detached();
        }
        Ok(())
    }

    /// Whether `id` currently holds part of the active selection.
    pub fn has_selection(&self, id: SelectableId) -> bool {
        self.inner.read().subselections.contains_key(&id)
    }

    /// The active selection.
    pub fn selection(&self) -> Option<Selection> {
        self.inner.read().selection
    }

    /// Per-block ranges of the active selection.
    pub fn subselections(&self) -> Subselections {
        Arc::clone(&self.inner.read().subselections)
    }

    /// Bumped whenever the selection or the geometry of a selected block
    /// changes.
    pub fn geometry_version(&self) -> u64 {
        self.inner.read().geometry_version
    }

    /// Number of completed selection gestures.
    pub fn finished_count(&self) -> u64 {
        self.inner.read().finished
    }

    /// Live selectables in document order with their ids.
    pub fn selectables_in_order(&self) -> Vec<(SelectableId, Arc<dyn Selectable>)> {
        self.inner
            .read()
            .entries
            .iter()
            .filter_map(|entry| Some((entry.id, entry.selectable.upgrade()?)))
            .collect()
    }

    /// Looks up a live selectable.
    pub fn selectable(&self, id: SelectableId) -> Option<Arc<dyn Selectable>> {
        let state = self.inner.read();
        let index = state.index_of(id)?;
        state.entries[index].selectable.upgrade()
    }

    /// Starts a selection at `point`, given in the space described by
    /// `transform`.
    ///
    /// Returns `false` when no selectable lies under the point.
    #[tracing::instrument(level = "debug", skip(self, transform))]
    pub fn start_selection(
        &self,
        point: PxPosition,
        transform: &ScreenTransform,
        adjustment: SelectionAdjustment,
    ) -> bool {
        let container_point = transform.to_container(point);
        let mut state = self.inner.write();
        let blocks = blocks_of(&state);
        let Some(block) = blocks
            .iter()
            .find(|block| block.transform.contains(container_point))
        else {
            debug!("No selectable under {container_point:?}");
            return false;
        };

        let offset = offset_for_position(block.layout(), block.transform.to_local(container_point));
        let range = match adjustment {
            SelectionAdjustment::Character => offset..offset,
            SelectionAdjustment::Word => block.layout().word_boundary(offset),
            SelectionAdjustment::Paragraph => block.layout().paragraph_boundary(offset),
        };
        let selection = Selection {
            start: block.anchor(range.start, false),
            end: block.anchor(range.end, true),
            handles_crossed: false,
        };
        debug!(
            "Selection started in {} at {}..{}",
            block.id, selection.start.offset, selection.end.offset
        );
        state.set_selection(Some(selection), &blocks);
        true
    }

    /// Moves one handle of the active selection to `new`.
    ///
    /// `previous` is where the handle was last resolved. Returns `true` when
    /// the selection changed; `false` tells the caller to keep accumulating
    /// drag distance.
    pub fn extend_selection(
        &self,
        previous: PxPosition,
        new: PxPosition,
        transform: &ScreenTransform,
        extending_start_handle: bool,
        adjustment: SelectionAdjustment,
    ) -> bool {
        let previous = transform.to_container(previous);
        let new = transform.to_container(new);
        let mut state = self.inner.write();
        let Some(current) = state.selection else {
            return false;
        };
        let blocks = blocks_of(&state);
        let Some((index, offset)) = resolve_drag(&blocks, previous, new) else {
            debug!("No selectable to extend the selection into");
            return false;
        };
        let block = &blocks[index];

        let fixed = if extending_start_handle {
            current.end
        } else {
            current.start
        };
        let Some(fixed_order) = state.index_of(fixed.selectable_id) else {
            debug!("Selection anchor {} is no longer registered", fixed.selectable_id);
            return false;
        };
        let Some(block_order) = state.index_of(block.id) else {
            return false;
        };
        let after_fixed = (block_order, offset) > (fixed_order, fixed.offset);

        let offset = match adjustment {
            SelectionAdjustment::Character => offset,
            SelectionAdjustment::Word => {
                let word = block.layout().word_boundary(offset);
                if after_fixed { word.end } else { word.start }
            }
            SelectionAdjustment::Paragraph => {
                let paragraph = block.layout().paragraph_boundary(offset);
                if after_fixed {
                    paragraph.end
                } else {
                    paragraph.start
                }
            }
        };

        let dragged = if extending_start_handle {
            current.start
        } else {
            current.end
        };
        if dragged.selectable_id == block.id && dragged.offset == offset {
            return false;
        }

        let is_end_side = after_fixed;
        let moved = block.anchor(offset, is_end_side);
        let (start, end) = if extending_start_handle {
            (moved, current.end)
        } else {
            (current.start, moved)
        };
        let start_order = if extending_start_handle {
            block_order
        } else {
            fixed_order
        };
        let end_order = if extending_start_handle {
            fixed_order
        } else {
            block_order
        };
        let selection = Selection {
            start,
            end,
            handles_crossed: (start_order, start.offset) > (end_order, end.offset),
        };
        trace!(
            "Selection extended to {}:{}..{}:{} (crossed: {})",
            start.selectable_id,
            start.offset,
            end.selectable_id,
            end.offset,
            selection.handles_crossed
        );
        state.set_selection(Some(selection), &blocks);
        true
    }

    /// Selects the whole text of `id`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn select_all(&self, id: SelectableId) -> bool {
        let mut state = self.inner.write();
        let blocks = blocks_of(&state);
        let Some(block) = blocks.iter().find(|block| block.id == id) else {
            debug!("Cannot select all in unknown selectable {id}");
            return false;
        };
        let selection = Selection {
            start: block.anchor(0, false),
            end: block.anchor(block.len(), true),
            handles_crossed: false,
        };
        state.set_selection(Some(selection), &blocks);
        true
    }

    /// Marks the current gesture as finished. Offsets are unchanged.
    pub fn end_selection(&self) {
        let mut state = self.inner.write();
        state.finished += 1;
        debug!("Selection gesture finished");
    }

    /// Clears the active selection. Returns whether one existed.
    pub fn clear_selection(&self) -> bool {
        let mut state = self.inner.write();
        if state.selection.is_none() {
            return false;
        }
        state.set_selection(None, &[]);
        debug!("Selection cleared");
        true
    }

    /// Tells the registry that a selectable was re-laid out or moved.
    ///
    /// Offsets are kept; ranges are re-clamped and the geometry version is
    /// bumped when the block holds part of the selection.
    pub fn notify_layout_changed(&self, id: SelectableId) {
        let mut state = self.inner.write();
        if !state.subselections.contains_key(&id) {
            return;
        }
        let blocks = blocks_of(&state);
        let selection = state.selection;
        state.set_selection(selection, &blocks);
        trace!("Geometry of selected {id} changed");
    }

    /// Reorders selectables by on-screen position, top to bottom then left
    /// to right. Blocks that are not placed keep their relative order at the
    /// end.
    pub fn sort_by_position(&self) {
        let mut state = self.inner.write();
        let mut keyed: Vec<(Option<(i32, i32)>, Entry)> = state
            .entries
            .drain(..)
            .map(|entry| {
                let key = entry
                    .selectable
                    .upgrade()
                    .and_then(|selectable| selectable.transform())
                    .map(|transform| (transform.origin().y.0, transform.origin().x.0));
                (key, entry)
            })
            .collect();
        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        state.entries = keyed.into_iter().map(|(_, entry)| entry).collect();

        if let Some(mut selection) = state.selection {
            if let (Some(start), Some(end)) = (
                state.index_of(selection.start.selectable_id),
                state.index_of(selection.end.selectable_id),
            ) {
                selection.handles_crossed =
                    (start, selection.start.offset) > (end, selection.end.offset);
            }
            let blocks = blocks_of(&state);
            state.set_selection(Some(selection), &blocks);
        }
    }
}

/// Live, laid out and placed selectables in document order.
fn blocks_of(state: &RegistrarState) -> Vec<Block> {
    state
        .entries
        .iter()
        .filter_map(|entry| {
            let selectable = entry.selectable.upgrade()?;
            let snapshot = selectable.layout()?;
            let transform = selectable.transform()?;
            Some(Block {
                id: entry.id,
                snapshot,
                transform,
            })
        })
        .collect()
}

/// Resolves where a dragged handle lands.
///
/// A point inside a block hits that block. Otherwise the handle snaps to
/// the last block the drag has reached (past its top), taking the block's
/// end when the whole movement lies beyond it; a point before every block
/// snaps to the start of the first one.
fn resolve_drag(blocks: &[Block], previous: PxPosition, new: PxPosition) -> Option<(usize, usize)> {
    if let Some(index) = blocks.iter().position(|block| block.transform.contains(new)) {
        let block = &blocks[index];
        let offset = offset_for_position(block.layout(), block.transform.to_local(new));
        return Some((index, offset));
    }

    let reached = blocks
        .iter()
        .rposition(|block| raw_offset_for_position(block.layout(), block.transform.to_local(new)) >= 0);
    let Some(index) = reached else {
        return (!blocks.is_empty()).then_some((0, 0));
    };
    let block = &blocks[index];
    let local_previous = block.transform.to_local(previous);
    let local_new = block.transform.to_local(new);
    let offset = if is_out_of_boundary(block.layout(), local_previous, local_new)
        && raw_offset_for_position(block.layout(), local_new) >= 0
    {
        block.len()
    } else {
        offset_for_position(block.layout(), local_new)
    };
    Some((index, offset))
}

/// Projects a selection onto the blocks it spans.
fn project(
    selection: &Selection,
    state: &RegistrarState,
    blocks: &[Block],
) -> FxHashMap<SelectableId, SelectionRange> {
    let mut ranges = FxHashMap::default();
    let (Some(start_order), Some(end_order)) = (
        state.index_of(selection.start.selectable_id),
        state.index_of(selection.end.selectable_id),
    ) else {
        return ranges;
    };

    let len_of = |id: SelectableId| {
        blocks
            .iter()
            .find(|block| block.id == id)
            .map(|block| block.len())
    };
    let direction_at = |id: SelectableId, offset: usize| {
        blocks
            .iter()
            .find(|block| block.id == id)
            .map(|block| block.layout().bidi_run_direction(offset))
            .unwrap_or_default()
    };

    if start_order == end_order {
        let id = selection.start.selectable_id;
        let Some(len) = len_of(id) else {
            return ranges;
        };
        ranges.insert(
            id,
            SelectionRange {
                selectable_id: id,
                start_offset: selection.start.offset.min(len),
                end_offset: selection.end.offset.min(len),
                start_direction: selection.start.direction,
                end_direction: selection.end.direction,
            },
        );
        return ranges;
    }

    let first = start_order.min(end_order);
    let last = start_order.max(end_order);
    let crossed = selection.handles_crossed;
    for entry in &state.entries[first..=last] {
        let id = entry.id;
        let Some(len) = len_of(id) else {
            continue;
        };
        let (mut start_offset, mut end_offset) = if crossed { (len, 0) } else { (0, len) };
        let mut start_direction = direction_at(id, start_offset);
        let mut end_direction = direction_at(id, end_offset.saturating_sub(1));
        if id == selection.start.selectable_id {
            start_offset = selection.start.offset.min(len);
            start_direction = selection.start.direction;
        }
        if id == selection.end.selectable_id {
            end_offset = selection.end.offset.min(len);
            end_direction = selection.end.direction;
        }
        ranges.insert(
            id,
            SelectionRange {
                selectable_id: id,
                start_offset,
                end_offset,
                start_direction,
                end_direction,
            },
        );
    }
    ranges
}
