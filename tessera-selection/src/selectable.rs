//! Selectable text blocks.
//!
//! ## Usage
//!
//! Mount a [`SelectableText`] (or any [`Selectable`]) into a selection
//! container. Feed it a new layout after every re-layout with
//! [`SelectableText::set_layout`] and its on-screen placement with
//! [`SelectableText::set_transform`]; the block forwards changes to the
//! registrar when it holds part of the active selection.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::RwLock;
use tracing::trace;

use crate::{
    layout::{LayoutSnapshot, TextLayout, floor_char_boundary},
    offset_mapping::{OffsetMapping, ValidatingOffsetMapping},
    px::{PxPosition, PxRect, PxSize},
    registrar::SelectionRegistrar,
    selection::{SelectableId, SelectionRange},
};

/// Placement of a selectable inside the container's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScreenTransform {
    origin: PxPosition,
    size: PxSize,
}

impl ScreenTransform {
    /// Creates a transform for a block at `origin` with `size`.
    pub const fn new(origin: PxPosition, size: PxSize) -> Self {
        Self { origin, size }
    }

    /// Top-left corner in container space.
    pub fn origin(&self) -> PxPosition {
        self.origin
    }

    /// Size of the block.
    pub fn size(&self) -> PxSize {
        self.size
    }

    /// Bounds in container space.
    pub fn bounds(&self) -> PxRect {
        PxRect::from_position_size(self.origin, self.size)
    }

    /// Converts a local point to container space.
    pub fn to_container(&self, local: PxPosition) -> PxPosition {
        local + self.origin
    }

    /// Converts a container point to local space.
    pub fn to_local(&self, container: PxPosition) -> PxPosition {
        container - self.origin
    }

    /// Whether a container point lies inside the block.
    pub fn contains(&self, container: PxPosition) -> bool {
        self.bounds().contains(container)
    }
}

/// A text block that can hold part of a selection.
///
/// The registrar only keeps weak references; whoever mounts the block owns
/// it.
pub trait Selectable: Send + Sync {
    /// Latest layout, `None` until the block is laid out.
    fn layout(&self) -> Option<LayoutSnapshot>;

    /// Latest placement, `None` until the block is placed.
    fn transform(&self) -> Option<ScreenTransform>;

    /// Text covered by `range`.
    fn selected_text(&self, range: &SelectionRange) -> String {
        let Some(snapshot) = self.layout() else {
            return String::new();
        };
        let text = snapshot.layout().text();
        let start = floor_char_boundary(text, range.min());
        let end = floor_char_boundary(text, range.max());
        text[start..end].to_owned()
    }

    /// Called once the registrar assigned an id.
    fn attached(&self, _id: SelectableId, _registrar: &SelectionRegistrar) {}

    /// Called after the block was unregistered.
    fn detached(&self) {}
}

struct Binding {
    id: SelectableId,
    registrar: SelectionRegistrar,
}

struct SourceText {
    text: String,
    mapping: Arc<dyn OffsetMapping>,
}

/// The standard selectable: one laid out text block.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tessera_selection::{
///     px::{Px, PxPosition, PxSize},
///     selectable::{ScreenTransform, SelectableText},
/// };
///
/// let block = Arc::new(SelectableText::new());
/// block.set_transform(ScreenTransform::new(
///     PxPosition::ZERO,
///     PxSize::new(Px(110), Px(20)),
/// ));
/// assert_eq!(block.layout_version(), 0);
/// ```
#[derive(Default)]
pub struct SelectableText {
    snapshot: RwLock<Option<LayoutSnapshot>>,
    transform: RwLock<Option<ScreenTransform>>,
    layout_version: AtomicU64,
    source: Option<SourceText>,
    binding: RwLock<Option<Binding>>,
}

impl SelectableText {
    /// Creates an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Displays a transformed version of `source`; selected text is read
    /// from `source` through `mapping`.
    pub fn with_source(mut self, source: impl Into<String>, mapping: Arc<dyn OffsetMapping>) -> Self {
        self.source = Some(SourceText {
            text: source.into(),
            mapping,
        });
        self
    }

    /// Id assigned by the registrar while mounted.
    pub fn id(&self) -> Option<SelectableId> {
        self.binding.read().as_ref().map(|binding| binding.id)
    }

    /// Number of layouts installed so far.
    pub fn layout_version(&self) -> u64 {
        self.layout_version.load(Ordering::Acquire)
    }

    /// Installs a new layout.
    pub fn set_layout(&self, layout: Arc<dyn TextLayout>) {
        let version = self.layout_version.fetch_add(1, Ordering::AcqRel) + 1;
        *self.snapshot.write() = Some(LayoutSnapshot::new(layout, version));
        trace!("Selectable layout updated to version {version}");
        self.notify_if_selected();
    }

    /// Installs a new placement; a moved block holding part of the selection
    /// tells the registrar so handles follow it.
    pub fn set_transform(&self, transform: ScreenTransform) {
        let previous = self.transform.write().replace(transform);
        if previous.is_some_and(|previous| previous.origin() != transform.origin()) {
            self.notify_if_selected();
        }
    }

    /// Local rectangles to paint as the selection highlight.
    pub fn selection_highlight(&self) -> Vec<PxRect> {
        let Some((id, registrar)) = self.bound() else {
            return Vec::new();
        };
        let subselections = registrar.subselections();
        let Some(range) = subselections.get(&id) else {
            return Vec::new();
        };
        if range.is_collapsed() {
            return Vec::new();
        }
        match self.layout() {
            Some(snapshot) => snapshot.layout().path_for_range(range.as_range()),
            None => Vec::new(),
        }
    }

    fn bound(&self) -> Option<(SelectableId, SelectionRegistrar)> {
        self.binding
            .read()
            .as_ref()
            .map(|binding| (binding.id, binding.registrar.clone()))
    }

    fn notify_if_selected(&self) {
        if let Some((id, registrar)) = self.bound()
            && registrar.has_selection(id)
        {
            registrar.notify_layout_changed(id);
        }
    }
}

impl Selectable for SelectableText {
    fn layout(&self) -> Option<LayoutSnapshot> {
        self.snapshot.read().clone()
    }

    fn transform(&self) -> Option<ScreenTransform> {
        *self.transform.read()
    }

    fn selected_text(&self, range: &SelectionRange) -> String {
        let Some(snapshot) = self.layout() else {
            return String::new();
        };
        let displayed = snapshot.layout().text();
        let Some(source) = &self.source else {
            let start = floor_char_boundary(displayed, range.min());
            let end = floor_char_boundary(displayed, range.max());
            return displayed[start..end].to_owned();
        };

        let mapping = ValidatingOffsetMapping::new(
            Arc::clone(&source.mapping),
            source.text.len(),
            displayed.len(),
        );
        let start = floor_char_boundary(&source.text, mapping.transformed_to_original(range.min()));
        let end = floor_char_boundary(&source.text, mapping.transformed_to_original(range.max()));
        source.text[start..end.max(start)].to_owned()
    }

    fn attached(&self, id: SelectableId, registrar: &SelectionRegistrar) {
        *self.binding.write() = Some(Binding {
            id,
            registrar: registrar.clone(),
        });
    }

    fn detached(&self) {
        self.binding.write().take();
    }
}
