//! Contextual text toolbar contract.
//!
//! ## Usage
//!
//! The host implements [`TextToolbar`] to present a floating menu. The
//! selection manager shows it with the items of a [`ToolbarMenu`] once a
//! selection settles and hides it while dragging or when the selection goes
//! away. A click on an item is reported back through
//! `SelectionManager::on_toolbar_item_clicked`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{callback::CallbackWith, platform::ClipboardService, px::PxRect};

/// Whether the toolbar is currently presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolbarStatus {
    /// The toolbar is visible.
    Shown,
    /// The toolbar is not visible.
    #[default]
    Hidden,
}

/// Host-side floating toolbar.
pub trait TextToolbar: Send + Sync {
    /// Presents `items` anchored to `anchor`, given in container space.
    fn show(&self, anchor: PxRect, items: &[ToolbarItem]);

    /// Dismisses the toolbar.
    fn hide(&self);

    /// Current presentation state.
    fn status(&self) -> ToolbarStatus;
}

/// One toolbar action.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolbarItem {
    /// Stable identifier reported back on click.
    pub id: String,
    /// Sort key; lower comes first.
    pub order: i32,
    /// Visible label.
    pub label: String,
    /// Optional icon name understood by the host.
    pub icon: Option<String>,
    /// Invoked with the selected text.
    pub on_invoke: CallbackWith<String>,
}

impl ToolbarItem {
    /// Id of the built-in copy item.
    pub const COPY_ID: &'static str = "copy";

    /// Creates an item.
    pub fn new(
        id: impl Into<String>,
        order: i32,
        label: impl Into<String>,
        on_invoke: impl Into<CallbackWith<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            order,
            label: label.into(),
            icon: None,
            on_invoke: on_invoke.into(),
        }
    }

    /// Sets the icon.
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// A "Copy" item that writes the selected text to `clipboard`.
    pub fn copy(clipboard: Arc<dyn ClipboardService>) -> Self {
        Self::new(Self::COPY_ID, 0, "Copy", move |text: String| {
            if let Err(err) = clipboard.set_text(&text) {
                warn!("Failed to copy selection: {err}");
            }
        })
    }
}

/// Ordered set of toolbar items.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolbarMenu {
    items: Vec<ToolbarItem>,
}

impl ToolbarMenu {
    /// Creates an empty menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item, replacing any item with the same id.
    pub fn with_item(mut self, item: ToolbarItem) -> Self {
        self.push(item);
        self
    }

    /// Adds an item in place, replacing any item with the same id.
    pub fn push(&mut self, item: ToolbarItem) {
        self.items.retain(|existing| existing.id != item.id);
        // Equal orders keep insertion order.
        let index = self.items.partition_point(|existing| existing.order <= item.order);
        self.items.insert(index, item);
    }

    /// Items sorted by order.
    pub fn items(&self) -> &[ToolbarItem] {
        &self.items
    }

    /// Looks an item up by id.
    pub fn find(&self, id: &str) -> Option<&ToolbarItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether the menu has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Invokes the item `id` with `text`. Returns whether it existed.
    pub fn dispatch(&self, id: &str, text: String) -> bool {
        match self.find(id) {
            Some(item) => {
                debug!("Toolbar item '{id}' invoked");
                item.on_invoke.call(text);
                true
            }
            None => {
                debug!("Toolbar click on unknown item '{id}'");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::testing::RecordingClipboard;

    #[test]
    fn menu_sorts_by_order_and_replaces_ids() {
        let menu = ToolbarMenu::new()
            .with_item(ToolbarItem::new("share", 20, "Share", |_text: String| {}))
            .with_item(ToolbarItem::new("search", 10, "Search", |_text: String| {}))
            .with_item(ToolbarItem::new("translate", 20, "Translate", |_text: String| {}))
            .with_item(ToolbarItem::new("search", 30, "Web search", |_text: String| {}));

        let ids: Vec<_> = menu.items().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["share", "translate", "search"]);
        assert_eq!(menu.find("search").map(|item| item.label.as_str()), Some("Web search"));
    }

    #[test]
    fn dispatch_invokes_matching_item() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let menu = ToolbarMenu::new().with_item(
            ToolbarItem::new("search", 1, "Search", move |text: String| sink.lock().push(text))
                .icon("magnifier"),
        );

        assert!(menu.dispatch("search", "world".to_owned()));
        assert!(!menu.dispatch("missing", "world".to_owned()));
        assert_eq!(*seen.lock(), vec!["world".to_owned()]);
        assert_eq!(menu.items()[0].icon.as_deref(), Some("magnifier"));
    }

    #[test]
    fn copy_item_writes_to_clipboard() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let item = ToolbarItem::copy(clipboard.clone());
        assert_eq!(item.id, ToolbarItem::COPY_ID);
        item.on_invoke.call("Hello".to_owned());
        assert_eq!(clipboard.contents(), Some("Hello".to_owned()));
    }

    #[test]
    fn failing_clipboard_is_swallowed() {
        let clipboard = Arc::new(RecordingClipboard::failing());
        let item = ToolbarItem::copy(clipboard.clone());
        item.on_invoke.call("Hello".to_owned());
        assert_eq!(clipboard.contents(), None);
    }
}
