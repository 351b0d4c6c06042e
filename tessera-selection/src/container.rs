//! The selection container surface.
//!
//! ## Usage
//!
//! A [`SelectionContainer`] wraps a region of selectable text blocks. Mount
//! each block with [`SelectionContainer::mount`] (keep the returned
//! [`SelectableRegistration`] alive while the block is on screen), route
//! pointer events through [`SelectionContainer::handle_pointer_event`], and
//! call [`SelectionContainer::tick`] when
//! [`SelectionContainer::next_deadline`] passes.
//!
//! ```
//! use std::{sync::Arc, time::Instant};
//! use tessera_selection::{
//!     config::SelectionConfig,
//!     container::SelectionContainer,
//!     px::PxPosition,
//!     selectable::ScreenTransform,
//! };
//!
//! let mut container = SelectionContainer::new(SelectionConfig::default())
//!     .on_pointer_down(|position: PxPosition| println!("pressed at {position:?}"));
//! let (block, _registration) = container.mount_text().expect("fresh block");
//! block.set_transform(ScreenTransform::default());
//! container.tick(Instant::now());
//! assert!(!container.has_focus());
//! ```

use std::{sync::Arc, time::Instant};

use tracing::{debug, error};

use crate::{
    callback::{Callback, CallbackWith},
    config::SelectionConfig,
    error::SelectionResult,
    gesture::{
        GestureRecognizer, HandleDragDetector, HandleDragIntent, PointerEvent, PointerEventKind,
        SelectionIntent,
    },
    manager::{HandleKind, HandlePositions, SelectionManager},
    platform::{ClipboardService, HapticFeedback},
    px::{PxPosition, PxRect, PxSize},
    registrar::SelectionRegistrar,
    selectable::{Selectable, SelectableText},
    selection::{SelectableId, Selection},
    toolbar::{TextToolbar, ToolbarItem},
};

/// Keeps a selectable mounted; dropping it unregisters the block.
///
/// Blocks mounted with [`SelectionContainer::mount_disabled`] hold an id the
/// registrar never saw, so no selection can reach them.
#[must_use = "dropping the registration unmounts the selectable"]
pub struct SelectableRegistration {
    id: SelectableId,
    registrar: SelectionRegistrar,
    selectable: Arc<dyn Selectable>,
    enabled: bool,
    active: bool,
}

impl SelectableRegistration {
    /// Id assigned at mount.
    pub fn id(&self) -> SelectableId {
        self.id
    }

    /// The mounted selectable.
    pub fn selectable(&self) -> &Arc<dyn Selectable> {
        &self.selectable
    }

    /// Whether the block takes part in selection.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Unmounts now, reporting contract violations instead of logging them.
    pub fn unregister(mut self) -> SelectionResult<()> {
        if !std::mem::replace(&mut self.active, false) {
            return Ok(());
        }
        self.registrar.unregister(self.id)
    }
}

impl Drop for SelectableRegistration {
    fn drop(&mut self) {
        if self.active
            && let Err(err) = self.registrar.unregister(self.id)
        {
            error!("Failed to unmount selectable {}: {err}", self.id);
        }
    }
}

/// Multi-block text selection over one pointer timeline.
pub struct SelectionContainer {
    config: SelectionConfig,
    registrar: SelectionRegistrar,
    manager: SelectionManager,
    recognizer: GestureRecognizer,
    handle_drag: Option<(HandleKind, HandleDragDetector)>,
    on_pointer_down: Option<CallbackWith<PxPosition>>,
    on_pointer_up: Option<Callback>,
    disposed: bool,
}

impl SelectionContainer {
    /// Creates a container with its own registrar.
    pub fn new(config: SelectionConfig) -> Self {
        let registrar = SelectionRegistrar::new();
        Self {
            config,
            manager: SelectionManager::new(registrar.clone(), config),
            recognizer: GestureRecognizer::new(config.gesture),
            registrar,
            handle_drag: None,
            on_pointer_down: None,
            on_pointer_up: None,
            disposed: false,
        }
    }

    /// Sets the toolbar presenter.
    pub fn toolbar(self, toolbar: Arc<dyn TextToolbar>) -> Self {
        self.with_manager(|manager| manager.toolbar(toolbar))
    }

    /// Sets the clipboard and adds the "Copy" toolbar item.
    pub fn clipboard(self, clipboard: Arc<dyn ClipboardService>) -> Self {
        self.with_manager(|manager| manager.clipboard(clipboard))
    }

    /// Sets the haptics performer.
    pub fn haptics(self, haptics: Arc<dyn HapticFeedback>) -> Self {
        self.with_manager(|manager| manager.haptics(haptics))
    }

    /// Adds a toolbar item.
    pub fn toolbar_item(self, item: ToolbarItem) -> Self {
        self.with_manager(|manager| manager.toolbar_item(item))
    }

    /// Called with the new value every time the selection changes.
    pub fn on_selection_change(self, callback: impl Into<CallbackWith<Option<Selection>>>) -> Self {
        self.with_manager(|manager| manager.on_selection_change(callback))
    }

    /// Called when a selection appears where there was none.
    pub fn on_entered_selection(self, callback: impl Into<Callback>) -> Self {
        self.with_manager(|manager| manager.on_entered_selection(callback))
    }

    /// Called when the selection goes away.
    pub fn on_exited_selection(self, callback: impl Into<Callback>) -> Self {
        self.with_manager(|manager| manager.on_exited_selection(callback))
    }

    /// Called on every first press, whether or not it selects anything.
    pub fn on_pointer_down(mut self, callback: impl Into<CallbackWith<PxPosition>>) -> Self {
        self.on_pointer_down = Some(callback.into());
        self
    }

    /// Called when that press is released.
    pub fn on_pointer_up(mut self, callback: impl Into<Callback>) -> Self {
        self.on_pointer_up = Some(callback.into());
        self
    }

    /// Sets the container size; unconfirmed gestures leaving it are dropped.
    pub fn bounds(mut self, size: PxSize) -> Self {
        self.recognizer.set_bounds(Some(size));
        self
    }

    /// Updates the container size after a re-layout.
    pub fn set_bounds(&mut self, size: Option<PxSize>) {
        self.recognizer.set_bounds(size);
    }

    /// Mounts a selectable.
    pub fn mount<S>(&self, selectable: Arc<S>) -> SelectionResult<SelectableRegistration>
    where
        S: Selectable + 'static,
    {
        let selectable: Arc<dyn Selectable> = selectable;
        let id = self.registrar.register(&selectable)?;
        Ok(SelectableRegistration {
            id,
            registrar: self.registrar.clone(),
            selectable,
            enabled: true,
            active: true,
        })
    }

    /// Mounts a block that opts out of selection.
    ///
    /// Gestures over it select nothing, drags skip it and its text never
    /// reaches the clipboard.
    pub fn mount_disabled<S>(&self, selectable: Arc<S>) -> SelectableRegistration
    where
        S: Selectable + 'static,
    {
        let id = SelectableId::next();
        debug!("Mounted selectable {id} with selection disabled");
        SelectableRegistration {
            id,
            registrar: self.registrar.clone(),
            selectable,
            enabled: false,
            active: false,
        }
    }

    /// Mounts a fresh [`SelectableText`] and returns it with its
    /// registration.
    pub fn mount_text(&self) -> SelectionResult<(Arc<SelectableText>, SelectableRegistration)> {
        let text = Arc::new(SelectableText::new());
        let registration = self.mount(Arc::clone(&text))?;
        Ok((text, registration))
    }

    /// The shared registrar.
    pub fn registrar(&self) -> &SelectionRegistrar {
        &self.registrar
    }

    /// The selection manager.
    pub fn manager(&self) -> &SelectionManager {
        &self.manager
    }

    /// Active configuration.
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Routes one pointer event.
    ///
    /// A press on a visible handle drags that handle; everything else goes
    /// to the selection gesture.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        if self.disposed {
            return;
        }

        if let Some((kind, detector)) = self.handle_drag.as_mut()
            && detector.pointer() == Some(event.pointer)
        {
            let kind = *kind;
            detector.handle_event(event);
            let intents = detector.take_intents();
            let finished = !detector.is_active();
            for intent in intents {
                self.manager.handle_drag(kind, intent);
            }
            if finished {
                self.handle_drag = None;
            }
            return;
        }

        if event.kind == PointerEventKind::Down
            && !event.consumed
            && self.handle_drag.is_none()
            && let Some(kind) = self.handle_at(event.position)
        {
            debug!("Press on {kind:?} handle");
            let mut detector = HandleDragDetector::new(self.config.gesture.touch_slop);
            detector.handle_event(event);
            self.handle_drag = Some((kind, detector));
            return;
        }

        self.recognizer.handle_event(event);
        self.dispatch_intents();
    }

    /// Fires gesture deadlines due at `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        self.recognizer.tick(now);
        self.dispatch_intents();
    }

    /// Earliest time [`SelectionContainer::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.recognizer.next_deadline()
    }

    /// Force-ends the current drag, cleanly.
    pub fn stop_selection(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        if let Some((kind, _)) = self.handle_drag.take() {
            self.manager.handle_drag(kind, HandleDragIntent::Stop);
        }
        self.recognizer.stop(now);
        self.dispatch_intents();
    }

    /// Selects the whole text of one block.
    pub fn select_all(&mut self, id: SelectableId) -> bool {
        !self.disposed && self.manager.select_all(id)
    }

    /// Dismisses the selection.
    pub fn clear_selection(&mut self) -> bool {
        self.manager.clear_selection()
    }

    /// Copies the selected text to the clipboard.
    pub fn copy(&mut self) -> bool {
        !self.disposed && self.manager.copy()
    }

    /// Reports a click on toolbar item `id`.
    pub fn on_toolbar_item_clicked(&mut self, id: &str) -> bool {
        !self.disposed && self.manager.on_toolbar_item_clicked(id)
    }

    /// The active selection.
    pub fn selection(&self) -> Option<Selection> {
        self.registrar.selection()
    }

    /// The selected text, `None` without a selection.
    pub fn selected_text(&self) -> Option<String> {
        self.manager.selected_text()
    }

    /// Whether handles should be visible.
    pub fn has_focus(&self) -> bool {
        self.manager.has_focus()
    }

    /// Container-space anchors of both handles.
    pub fn handle_positions(&self) -> HandlePositions {
        self.manager.handle_positions()
    }

    /// Touch target of one handle.
    pub fn handle_rect(&self, kind: HandleKind) -> Option<PxRect> {
        self.manager.handle_rect(kind)
    }

    /// Picks up registrar changes made outside the container (unmounts,
    /// re-layouts) and fires the resulting callbacks.
    pub fn sync(&mut self) {
        self.manager.sync();
    }

    /// Tears the container down: gestures stop without completing, the
    /// toolbar is hidden once, and no callback fires afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.recognizer.dispose();
        self.handle_drag = None;
        self.manager.dispose();
    }

    fn with_manager(mut self, configure: impl FnOnce(SelectionManager) -> SelectionManager) -> Self {
        let placeholder = SelectionManager::new(self.registrar.clone(), self.config);
        let manager = std::mem::replace(&mut self.manager, placeholder);
        self.manager = configure(manager);
        self
    }

    fn handle_at(&self, position: PxPosition) -> Option<HandleKind> {
        if !self.manager.has_focus() {
            return None;
        }
        [HandleKind::SelectionEnd, HandleKind::SelectionStart]
            .into_iter()
            .find(|kind| {
                self.manager
                    .handle_rect(*kind)
                    .is_some_and(|rect| rect.contains(position))
            })
    }

    fn dispatch_intents(&mut self) {
        for intent in self.recognizer.take_intents() {
            match intent {
                SelectionIntent::PointerDown(position) => {
                    if let Some(callback) = &self.on_pointer_down {
                        callback.call(position);
                    }
                }
                SelectionIntent::PointerUp => {
                    if let Some(callback) = &self.on_pointer_up {
                        callback.call();
                    }
                }
                intent => self.manager.handle_intent(intent),
            }
        }
    }
}

impl Drop for SelectionContainer {
    fn drop(&mut self) {
        self.dispose();
    }
}
