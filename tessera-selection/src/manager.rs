//! Selection orchestration.
//!
//! ## Usage
//!
//! A [`SelectionManager`] sits between the gesture recognizers and the
//! [`SelectionRegistrar`]. Feed it the intents drained from a
//! [`GestureRecognizer`](crate::gesture::GestureRecognizer) and from handle
//! drag detectors; it applies them to the registrar, derives handle
//! positions, notifies the host of selection changes, and drives the
//! toolbar, clipboard and haptics collaborators.
//!
//! The toolbar is shown once a non-empty selection settles and stays hidden
//! while any drag is active.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{
    callback::{Callback, CallbackWith},
    config::SelectionConfig,
    geometry::handle_anchor,
    gesture::{GestureTrigger, HandleDragIntent, SelectionIntent},
    layout::ResolvedTextDirection,
    platform::{ClipboardService, HapticFeedback, HapticFeedbackType},
    px::{Px, PxPosition, PxRect},
    registrar::SelectionRegistrar,
    selectable::ScreenTransform,
    selection::{AnchorInfo, SelectableId, Selection, SelectionAdjustment},
    toolbar::{TextToolbar, ToolbarItem, ToolbarMenu, ToolbarStatus},
};

/// Which selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// The handle at the selection start.
    SelectionStart,
    /// The handle at the selection end.
    SelectionEnd,
}

/// Container-space anchor points of both handles.
///
/// A side is `None` while its block is missing, not laid out or not placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandlePositions {
    /// Anchor of the start handle.
    pub start: Option<PxPosition>,
    /// Anchor of the end handle.
    pub end: Option<PxPosition>,
}

impl HandlePositions {
    /// Position of one handle.
    pub fn get(&self, kind: HandleKind) -> Option<PxPosition> {
        match kind {
            HandleKind::SelectionStart => self.start,
            HandleKind::SelectionEnd => self.end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragSource {
    Gesture,
    Handle(HandleKind),
}

/// Accumulated movement of one drag.
///
/// `origin` is the last position the registrar accepted; deltas pile up in
/// `cumulative_delta` until an extension is consumed.
#[derive(Debug, Clone, Copy)]
struct DragSession {
    source: DragSource,
    origin: PxPosition,
    cumulative_delta: PxPosition,
}

impl DragSession {
    fn new(source: DragSource, origin: PxPosition) -> Self {
        Self {
            source,
            origin,
            cumulative_delta: PxPosition::ZERO,
        }
    }
}

/// Applies selection intents and owns the selection side effects.
pub struct SelectionManager {
    registrar: SelectionRegistrar,
    config: SelectionConfig,
    toolbar: Option<Arc<dyn TextToolbar>>,
    clipboard: Option<Arc<dyn ClipboardService>>,
    haptics: Option<Arc<dyn HapticFeedback>>,
    menu: ToolbarMenu,
    on_selection_change: Option<CallbackWith<Option<Selection>>>,
    on_entered_selection: Option<Callback>,
    on_exited_selection: Option<Callback>,
    observed: Option<Selection>,
    drag: Option<DragSession>,
    handle_cache: Mutex<Option<(u64, HandlePositions)>>,
    disposed: bool,
}

impl SelectionManager {
    /// Creates a manager over `registrar`.
    pub fn new(registrar: SelectionRegistrar, config: SelectionConfig) -> Self {
        let observed = registrar.selection();
        Self {
            registrar,
            config,
            toolbar: None,
            clipboard: None,
            haptics: None,
            menu: ToolbarMenu::new(),
            on_selection_change: None,
            on_entered_selection: None,
            on_exited_selection: None,
            observed,
            drag: None,
            handle_cache: Mutex::new(None),
            disposed: false,
        }
    }

    /// Sets the toolbar presenter.
    pub fn toolbar(mut self, toolbar: Arc<dyn TextToolbar>) -> Self {
        self.toolbar = Some(toolbar);
        self
    }

    /// Sets the clipboard and adds the "Copy" toolbar item.
    pub fn clipboard(mut self, clipboard: Arc<dyn ClipboardService>) -> Self {
        self.menu.push(ToolbarItem::copy(Arc::clone(&clipboard)));
        self.clipboard = Some(clipboard);
        self
    }

    /// Sets the haptics performer.
    pub fn haptics(mut self, haptics: Arc<dyn HapticFeedback>) -> Self {
        self.haptics = Some(haptics);
        self
    }

    /// Adds a toolbar item.
    pub fn toolbar_item(mut self, item: ToolbarItem) -> Self {
        self.menu.push(item);
        self
    }

    /// Called with the new value every time the selection changes.
    pub fn on_selection_change(mut self, callback: impl Into<CallbackWith<Option<Selection>>>) -> Self {
        self.on_selection_change = Some(callback.into());
        self
    }

    /// Called when a selection appears where there was none.
    pub fn on_entered_selection(mut self, callback: impl Into<Callback>) -> Self {
        self.on_entered_selection = Some(callback.into());
        self
    }

    /// Called when the selection goes away.
    pub fn on_exited_selection(mut self, callback: impl Into<Callback>) -> Self {
        self.on_exited_selection = Some(callback.into());
        self
    }

    /// The registrar this manager drives.
    pub fn registrar(&self) -> &SelectionRegistrar {
        &self.registrar
    }

    /// Active configuration.
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Toolbar items in display order.
    pub fn menu(&self) -> &ToolbarMenu {
        &self.menu
    }

    /// Whether a selection exists, i.e. handles should be visible.
    pub fn has_focus(&self) -> bool {
        self.registrar.selection().is_some()
    }

    /// Whether a gesture or handle drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether [`SelectionManager::dispose`] was called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Applies one intent from the gesture recognizer.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn handle_intent(&mut self, intent: SelectionIntent) {
        if self.disposed {
            return;
        }
        match intent {
            SelectionIntent::PointerDown(_) | SelectionIntent::PointerUp => {}
            SelectionIntent::Start { position, trigger } => {
                if trigger == GestureTrigger::LongPress {
                    self.perform_haptic(HapticFeedbackType::LongPress);
                }
                let started = self.registrar.start_selection(
                    position,
                    &ScreenTransform::default(),
                    self.config.start_adjustment,
                );
                if !started {
                    debug!("Selection start missed every selectable at {position:?}");
                    return;
                }
                self.hide_toolbar();
                self.drag = Some(DragSession::new(DragSource::Gesture, position));
                self.sync();
            }
            SelectionIntent::Extend(delta) => {
                if self
                    .drag
                    .is_some_and(|session| session.source == DragSource::Gesture)
                {
                    self.extend(delta, false, self.config.drag_adjustment);
                }
            }
            SelectionIntent::End | SelectionIntent::Cancel => {
                if self
                    .drag
                    .is_some_and(|session| session.source == DragSource::Gesture)
                {
                    self.finish_drag();
                }
            }
        }
    }

    /// Applies one intent from the drag detector of handle `kind`.
    pub fn handle_drag(&mut self, kind: HandleKind, intent: HandleDragIntent) {
        if self.disposed {
            return;
        }
        let owns_drag = self
            .drag
            .is_some_and(|session| session.source == DragSource::Handle(kind));
        match intent {
            HandleDragIntent::Start(_) => {
                let Some(origin) = self.handle_positions().get(kind) else {
                    debug!("Cannot drag {kind:?}: handle is not placed");
                    return;
                };
                self.hide_toolbar();
                self.drag = Some(DragSession::new(DragSource::Handle(kind), origin));
            }
            HandleDragIntent::Drag(delta) if owns_drag => {
                self.extend(
                    delta,
                    kind == HandleKind::SelectionStart,
                    self.config.handle_adjustment,
                );
            }
            HandleDragIntent::Stop | HandleDragIntent::Cancel if owns_drag => self.finish_drag(),
            _ => {}
        }
    }

    /// Reconciles with the registrar and fires change callbacks.
    ///
    /// Call after anything outside the manager (unmounts, re-layouts)
    /// touched the registrar.
    pub fn sync(&mut self) {
        if self.disposed {
            return;
        }
        let current = self.registrar.selection();
        if current == self.observed {
            return;
        }
        let previous = std::mem::replace(&mut self.observed, current);
        trace!("Selection changed: {previous:?} -> {current:?}");
        if let Some(callback) = &self.on_selection_change {
            callback.call(current);
        }
        match (previous.is_some(), current.is_some()) {
            (false, true) => {
                if let Some(callback) = &self.on_entered_selection {
                    callback.call();
                }
            }
            (true, false) => {
                self.drag = None;
                self.hide_toolbar();
                if let Some(callback) = &self.on_exited_selection {
                    callback.call();
                }
            }
            _ => {}
        }
    }

    /// Container-space anchors of both handles.
    pub fn handle_positions(&self) -> HandlePositions {
        let version = self.registrar.geometry_version();
        let mut cache = self.handle_cache.lock();
        if let Some((cached_version, positions)) = *cache
            && cached_version == version
        {
            return positions;
        }
        let positions = match self.registrar.selection() {
            Some(selection) => HandlePositions {
                start: self.anchor_position(selection.start, true, selection.handles_crossed),
                end: self.anchor_position(selection.end, false, selection.handles_crossed),
            },
            None => HandlePositions::default(),
        };
        *cache = Some((version, positions));
        positions
    }

    /// Touch target of handle `kind` in container space.
    ///
    /// The handle hangs below its anchor, on the outer side of the selection.
    pub fn handle_rect(&self, kind: HandleKind) -> Option<PxRect> {
        let selection = self.registrar.selection()?;
        let position = self.handle_positions().get(kind)?;
        let (anchor, is_start) = match kind {
            HandleKind::SelectionStart => (selection.start, true),
            HandleKind::SelectionEnd => (selection.end, false),
        };
        let points_left = (is_start != selection.handles_crossed)
            == (anchor.direction == ResolvedTextDirection::Ltr);
        let size = self.config.handle_size;
        let x = if points_left {
            position.x - size.width
        } else {
            position.x
        };
        Some(PxRect::new(x, position.y, size.width, size.height))
    }

    /// Rectangle the toolbar anchors to: spans both handles horizontally and
    /// runs from the top of the highest selected line to the bottom of the
    /// lowest handle.
    pub fn toolbar_anchor_rect(&self) -> Option<PxRect> {
        let selection = self.registrar.selection()?;
        let positions = self.handle_positions();
        let points: Vec<PxPosition> = [positions.start, positions.end]
            .into_iter()
            .flatten()
            .collect();
        let first = points.first()?;
        let (mut left, mut right, mut bottom) = (first.x, first.x, first.y);
        for point in &points {
            left = left.min(point.x);
            right = right.max(point.x);
            bottom = bottom.max(point.y);
        }
        let top = [selection.start, selection.end]
            .into_iter()
            .filter_map(|anchor| self.anchor_line_top(anchor))
            .min()
            .unwrap_or(bottom);
        let bottom = bottom + self.config.handle_size.height;
        Some(PxRect::new(left, top, right - left, bottom - top))
    }

    /// Text of every sub-selection in block order, `None` without a
    /// selection.
    pub fn selected_text(&self) -> Option<String> {
        self.registrar.selection()?;
        let subselections = self.registrar.subselections();
        let text = self
            .registrar
            .selectables_in_order()
            .into_iter()
            .filter_map(|(id, selectable)| {
                subselections
                    .get(&id)
                    .map(|range| selectable.selected_text(range))
            })
            .collect();
        Some(text)
    }

    /// Copies the selected text to the clipboard and hides the toolbar.
    ///
    /// Returns whether anything was written.
    pub fn copy(&mut self) -> bool {
        let Some(text) = self.selected_text().filter(|text| !text.is_empty()) else {
            return false;
        };
        let Some(clipboard) = &self.clipboard else {
            debug!("Copy requested without a clipboard service");
            return false;
        };
        let copied = match clipboard.set_text(&text) {
            Ok(()) => true,
            Err(err) => {
                warn!("Failed to copy selection: {err}");
                false
            }
        };
        self.hide_toolbar();
        copied
    }

    /// Runs toolbar item `id` with the selected text, then hides the toolbar.
    pub fn on_toolbar_item_clicked(&mut self, id: &str) -> bool {
        let Some(text) = self.selected_text() else {
            return false;
        };
        if !self.menu.dispatch(id, text) {
            return false;
        }
        self.hide_toolbar();
        true
    }

    /// Shows the toolbar for a settled, non-empty selection.
    pub fn show_toolbar(&self) {
        if self.disposed || self.drag.is_some() || !self.has_visible_selection() {
            return;
        }
        let Some(toolbar) = &self.toolbar else {
            return;
        };
        if self.menu.is_empty() {
            return;
        }
        let Some(anchor) = self.toolbar_anchor_rect() else {
            return;
        };
        debug!("Showing selection toolbar at {anchor:?}");
        toolbar.show(anchor, self.menu.items());
    }

    /// Hides the toolbar if it is shown.
    pub fn hide_toolbar(&self) {
        if let Some(toolbar) = &self.toolbar
            && toolbar.status() == ToolbarStatus::Shown
        {
            debug!("Hiding selection toolbar");
            toolbar.hide();
        }
    }

    /// Dismisses the selection.
    pub fn clear_selection(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        let cleared = self.registrar.clear_selection();
        self.drag = None;
        self.hide_toolbar();
        self.sync();
        cleared
    }

    /// Selects the whole text of one block and shows the toolbar.
    pub fn select_all(&mut self, id: SelectableId) -> bool {
        if self.disposed || !self.registrar.select_all(id) {
            return false;
        }
        self.drag = None;
        self.sync();
        self.show_toolbar();
        true
    }

    /// Tears the manager down. The toolbar is hidden once and no callback
    /// fires afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.drag = None;
        if let Some(toolbar) = &self.toolbar {
            toolbar.hide();
        }
        debug!("Selection manager disposed");
    }

    fn extend(&mut self, delta: PxPosition, extending_start_handle: bool, adjustment: SelectionAdjustment) {
        let Some(session) = self.drag.as_mut() else {
            return;
        };
        session.cumulative_delta += delta;
        let target = session.origin + session.cumulative_delta;
        let consumed = self.registrar.extend_selection(
            session.origin,
            target,
            &ScreenTransform::default(),
            extending_start_handle,
            adjustment,
        );
        if !consumed {
            return;
        }
        session.origin = target;
        session.cumulative_delta = PxPosition::ZERO;
        self.perform_haptic(HapticFeedbackType::TextHandleMove);
        self.sync();
    }

    fn finish_drag(&mut self) {
        self.drag = None;
        self.registrar.end_selection();
        if self.registrar.selection().is_some() && !self.has_visible_selection() {
            trace!("Gesture finished on an empty selection");
            self.registrar.clear_selection();
        }
        self.sync();
        if self.has_visible_selection() {
            self.show_toolbar();
        } else {
            self.hide_toolbar();
        }
    }

    fn has_visible_selection(&self) -> bool {
        self.registrar
            .subselections()
            .values()
            .any(|range| !range.is_collapsed())
    }

    fn perform_haptic(&self, kind: HapticFeedbackType) {
        if let Some(haptics) = &self.haptics {
            haptics.perform(kind);
        }
    }

    fn anchor_position(&self, anchor: AnchorInfo, is_start: bool, crossed: bool) -> Option<PxPosition> {
        let selectable = self.registrar.selectable(anchor.selectable_id)?;
        let snapshot = selectable.layout()?;
        let transform = selectable.transform()?;
        let local = handle_anchor(snapshot.layout(), anchor.offset, is_start, crossed);
        Some(transform.to_container(local))
    }

    fn anchor_line_top(&self, anchor: AnchorInfo) -> Option<Px> {
        let selectable = self.registrar.selectable(anchor.selectable_id)?;
        let snapshot = selectable.layout()?;
        let transform = selectable.transform()?;
        let layout = snapshot.layout();
        Some(transform.origin().y + layout.line_top(layout.line_for_offset(anchor.offset)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        layout::TextLayout,
        px::PxSize,
        selectable::{Selectable, SelectableText},
        testing::{GridTextLayout, RecordingClipboard, RecordingHaptics, RecordingToolbar},
    };

    fn at(x: i32, y: i32) -> PxPosition {
        PxPosition::new(Px(x), Px(y))
    }

    #[derive(Default)]
    struct Counters {
        changes: AtomicUsize,
        entered: AtomicUsize,
        exited: AtomicUsize,
    }

    struct Fixture {
        manager: SelectionManager,
        block: Arc<SelectableText>,
        id: SelectableId,
        toolbar: Arc<RecordingToolbar>,
        clipboard: Arc<RecordingClipboard>,
        haptics: Arc<RecordingHaptics>,
        counters: Arc<Counters>,
    }

    fn fixture_with(text: &str, config: SelectionConfig) -> Fixture {
        crate::init_test_tracing();
        let registrar = SelectionRegistrar::new();
        let block = Arc::new(SelectableText::new());
        let layout = GridTextLayout::new(text);
        block.set_transform(ScreenTransform::new(PxPosition::ZERO, layout.size()));
        block.set_layout(Arc::new(layout));
        let selectable: Arc<dyn Selectable> = block.clone();
        let id = registrar.register(&selectable).expect("register");

        let toolbar = Arc::new(RecordingToolbar::default());
        let clipboard = Arc::new(RecordingClipboard::default());
        let haptics = Arc::new(RecordingHaptics::default());
        let counters = Arc::new(Counters::default());
        let (changes, entered, exited) = (counters.clone(), counters.clone(), counters.clone());
        let manager = SelectionManager::new(registrar, config)
            .toolbar(toolbar.clone())
            .clipboard(clipboard.clone())
            .haptics(haptics.clone())
            .on_selection_change(move |_selection: Option<Selection>| {
                changes.changes.fetch_add(1, Ordering::SeqCst);
            })
            .on_entered_selection(move || {
                entered.entered.fetch_add(1, Ordering::SeqCst);
            })
            .on_exited_selection(move || {
                exited.exited.fetch_add(1, Ordering::SeqCst);
            });

        Fixture {
            manager,
            block,
            id,
            toolbar,
            clipboard,
            haptics,
            counters,
        }
    }

    fn fixture(text: &str) -> Fixture {
        fixture_with(text, SelectionConfig::default())
    }

    fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    #[test]
    fn double_tap_selects_word_and_shows_toolbar_after_settle() {
        let mut f = fixture("Hello world");
        f.manager.handle_intent(SelectionIntent::Start {
            position: at(75, 5),
            trigger: GestureTrigger::DoubleTap,
        });
        assert_eq!(f.manager.selected_text().as_deref(), Some("world"));
        assert_eq!(f.toolbar.show_count(), 0);
        assert!(f.manager.is_dragging());
        assert!(f.haptics.pulses().is_empty());

        f.manager.handle_intent(SelectionIntent::End);
        assert!(!f.manager.is_dragging());
        assert_eq!(f.toolbar.status(), ToolbarStatus::Shown);
        assert_eq!(
            f.toolbar.last_shown(),
            Some((
                PxRect::new(Px(60), Px(0), Px(50), Px(44)),
                vec![ToolbarItem::COPY_ID.to_owned()]
            ))
        );
        assert_eq!(f.manager.registrar().finished_count(), 1);
    }

    #[test]
    fn long_press_drag_extends_end_handle() {
        let mut f = fixture("Hello world");
        f.manager.handle_intent(SelectionIntent::Start {
            position: at(20, 5),
            trigger: GestureTrigger::LongPress,
        });
        assert_eq!(f.manager.selected_text().as_deref(), Some("Hello"));

        // Lands on the current end offset: the delta is kept.
        f.manager.handle_intent(SelectionIntent::Extend(at(30, 0)));
        assert_eq!(f.manager.selected_text().as_deref(), Some("Hello"));
        f.manager.handle_intent(SelectionIntent::Extend(at(30, 0)));
        assert_eq!(f.manager.selected_text().as_deref(), Some("Hello wo"));

        let selection = f.manager.registrar().selection().expect("selection");
        assert_eq!(selection.start.offset, 0);
        assert_eq!(selection.end.offset, 8);
        assert_eq!(
            f.haptics.pulses(),
            vec![HapticFeedbackType::LongPress, HapticFeedbackType::TextHandleMove]
        );
    }

    #[test]
    fn callbacks_fire_on_changes_and_transitions() {
        let mut f = fixture("Hello world");
        f.manager.handle_intent(SelectionIntent::Start {
            position: at(20, 5),
            trigger: GestureTrigger::LongPress,
        });
        f.manager.handle_intent(SelectionIntent::Extend(at(60, 0)));
        f.manager.handle_intent(SelectionIntent::End);
        assert_eq!(count(&f.counters.changes), 2);
        assert_eq!(count(&f.counters.entered), 1);
        assert_eq!(count(&f.counters.exited), 0);

        assert!(f.manager.clear_selection());
        assert_eq!(count(&f.counters.changes), 3);
        assert_eq!(count(&f.counters.entered), 1);
        assert_eq!(count(&f.counters.exited), 1);
        assert_eq!(f.toolbar.status(), ToolbarStatus::Hidden);
        assert!(!f.manager.has_focus());
    }

    #[test]
    fn empty_selection_is_dropped_when_gesture_ends() {
        let config = SelectionConfig::default().start_adjustment(SelectionAdjustment::Character);
        let mut f = fixture_with("Hello world", config);
        f.manager.handle_intent(SelectionIntent::Start {
            position: at(20, 5),
            trigger: GestureTrigger::DoubleTap,
        });
        assert!(f.manager.has_focus());
        f.manager.handle_intent(SelectionIntent::Cancel);
        assert!(!f.manager.has_focus());
        assert_eq!(f.toolbar.show_count(), 0);
        assert_eq!(count(&f.counters.exited), 1);
    }

    #[test]
    fn end_handle_drag_moves_only_the_end() {
        let mut f = fixture("Hello world");
        f.manager.handle_intent(SelectionIntent::Start {
            position: at(75, 5),
            trigger: GestureTrigger::DoubleTap,
        });
        f.manager.handle_intent(SelectionIntent::End);
        assert_eq!(
            f.manager.handle_positions(),
            HandlePositions {
                start: Some(at(60, 19)),
                end: Some(at(110, 19)),
            }
        );

        f.manager
            .handle_drag(HandleKind::SelectionEnd, HandleDragIntent::Start(at(112, 22)));
        assert_eq!(f.toolbar.status(), ToolbarStatus::Hidden);
        f.manager
            .handle_drag(HandleKind::SelectionEnd, HandleDragIntent::Drag(at(-40, 0)));
        // The start handle never owned this drag.
        f.manager
            .handle_drag(HandleKind::SelectionStart, HandleDragIntent::Stop);
        assert!(f.manager.is_dragging());
        f.manager
            .handle_drag(HandleKind::SelectionEnd, HandleDragIntent::Stop);

        assert_eq!(f.manager.selected_text().as_deref(), Some("w"));
        assert_eq!(f.toolbar.status(), ToolbarStatus::Shown);
        assert_eq!(f.toolbar.show_count(), 2);
        assert_eq!(f.haptics.pulses(), vec![HapticFeedbackType::TextHandleMove]);
    }

    #[test]
    fn handle_rects_hang_outside_the_selection() {
        let mut f = fixture("Hello world");
        assert!(f.manager.select_all(f.id));
        let size = SelectionConfig::default().handle_size;
        assert_eq!(
            f.manager.handle_rect(HandleKind::SelectionStart),
            Some(PxRect::new(Px(-25), Px(19), size.width, size.height))
        );
        assert_eq!(
            f.manager.handle_rect(HandleKind::SelectionEnd),
            Some(PxRect::new(Px(110), Px(19), size.width, size.height))
        );
    }

    #[test]
    fn handle_positions_follow_moved_blocks() {
        let mut f = fixture("Hello world");
        assert!(f.manager.select_all(f.id));
        assert_eq!(f.manager.handle_positions().start, Some(at(0, 19)));
        f.block.set_transform(ScreenTransform::new(
            at(5, 100),
            PxSize::new(Px(110), Px(20)),
        ));
        assert_eq!(f.manager.handle_positions().start, Some(at(5, 119)));
    }

    #[test]
    fn copy_writes_selection_and_hides_toolbar() {
        let mut f = fixture("Hello world");
        f.manager.handle_intent(SelectionIntent::Start {
            position: at(75, 5),
            trigger: GestureTrigger::DoubleTap,
        });
        f.manager.handle_intent(SelectionIntent::End);
        assert!(f.manager.copy());
        assert_eq!(f.clipboard.contents().as_deref(), Some("world"));
        assert_eq!(f.toolbar.status(), ToolbarStatus::Hidden);
        assert!(f.manager.has_focus());
    }

    #[test]
    fn toolbar_click_runs_item_with_selected_text() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let mut f = fixture("Hello world");
        f.manager = f.manager.toolbar_item(ToolbarItem::new(
            "search",
            10,
            "Search",
            move |text: String| *sink.lock() = Some(text),
        ));
        assert!(f.manager.select_all(f.id));
        assert_eq!(
            f.toolbar.last_shown().map(|(_, ids)| ids),
            Some(vec!["copy".to_owned(), "search".to_owned()])
        );

        assert!(f.manager.on_toolbar_item_clicked("search"));
        assert_eq!(seen.lock().as_deref(), Some("Hello world"));
        assert_eq!(f.toolbar.status(), ToolbarStatus::Hidden);
        assert!(!f.manager.on_toolbar_item_clicked("missing"));
    }

    #[test]
    fn dispose_hides_once_and_silences_callbacks() {
        let mut f = fixture("Hello world");
        assert!(f.manager.select_all(f.id));
        let changes = count(&f.counters.changes);

        f.manager.dispose();
        f.manager.dispose();
        assert_eq!(f.toolbar.hide_count(), 1);

        f.manager.registrar().unregister(f.id).expect("unregister");
        f.manager.sync();
        f.manager.handle_intent(SelectionIntent::End);
        assert_eq!(count(&f.counters.changes), changes);
        assert_eq!(count(&f.counters.exited), 0);
        assert_eq!(f.toolbar.hide_count(), 1);
    }

    #[test]
    fn unmounting_selected_block_exits_selection() {
        let mut f = fixture("Hello world");
        assert!(f.manager.select_all(f.id));
        f.manager.registrar().unregister(f.id).expect("unregister");
        f.manager.sync();
        assert_eq!(count(&f.counters.exited), 1);
        assert_eq!(f.toolbar.status(), ToolbarStatus::Hidden);
        assert_eq!(f.manager.selected_text(), None);
    }
}
