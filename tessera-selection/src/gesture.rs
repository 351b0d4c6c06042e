//! Selection gesture recognition.
//!
//! This module turns raw pointer events into a small, closed set of
//! [`SelectionIntent`]s. Two recognizers are provided:
//!
//! - [`GestureRecognizer`] drives the container gesture: a double tap, or a
//!   tap followed by a long press that keeps dragging.
//! - [`HandleDragDetector`] drives a selection handle: a press that becomes a
//!   drag once it travels past the touch slop.
//!
//! # Timing
//!
//! Recognizers never sleep. Every wait (long press, double tap window, the
//! settle delay after a drag) is a deadline that fires when an event or a
//! [`GestureRecognizer::tick`] carries a timestamp at or past it. Hosts that
//! want deadlines to fire without further input schedule a tick at
//! [`GestureRecognizer::next_deadline`].
//!
//! # Ordering
//!
//! For one gesture, `Start` precedes every `Extend`, which precede exactly
//! one `End` or `Cancel`. `PointerDown`/`PointerUp` come from an independent
//! observer and interleave freely.
//!
//! ```
//! use std::time::{Duration, Instant};
//! use tessera_selection::config::GestureConfig;
//! use tessera_selection::gesture::{GestureRecognizer, PointerEvent, SelectionIntent};
//! use tessera_selection::px::{Px, PxPosition};
//!
//! let mut recognizer = GestureRecognizer::new(GestureConfig::default());
//! let t0 = Instant::now();
//! let at = PxPosition::new(Px(10), Px(10));
//! recognizer.handle_event(PointerEvent::down(0, at, t0));
//! recognizer.handle_event(PointerEvent::up(0, at, t0 + Duration::from_millis(60)));
//! recognizer.handle_event(PointerEvent::down(1, at, t0 + Duration::from_millis(160)));
//! recognizer.handle_event(PointerEvent::up(1, at, t0 + Duration::from_millis(220)));
//! let intents = recognizer.take_intents();
//! assert!(intents.iter().any(|intent| matches!(intent, SelectionIntent::Start { .. })));
//! ```

use std::{collections::VecDeque, time::Instant};

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{
    config::{GestureConfig, GestureMode},
    px::{Px, PxPosition, PxSize},
};

/// Identifier of a pointer (finger, mouse button) across its down/up cycle.
pub type PointerId = u64;

/// What happened to a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// The pointer was pressed.
    Down,
    /// The pointer moved while pressed.
    Move,
    /// The pointer was released.
    Up,
    /// The platform took the pointer away.
    Cancel,
}

/// A pointer event in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Pointer this event belongs to.
    pub pointer: PointerId,
    /// Kind of change.
    pub kind: PointerEventKind,
    /// Position in container space.
    pub position: PxPosition,
    /// When the event happened.
    pub timestamp: Instant,
    /// Whether another handler already consumed this event.
    pub consumed: bool,
}

impl PointerEvent {
    /// Creates an unconsumed event.
    pub fn new(
        pointer: PointerId,
        kind: PointerEventKind,
        position: PxPosition,
        timestamp: Instant,
    ) -> Self {
        Self {
            pointer,
            kind,
            position,
            timestamp,
            consumed: false,
        }
    }

    /// A press.
    pub fn down(pointer: PointerId, position: PxPosition, timestamp: Instant) -> Self {
        Self::new(pointer, PointerEventKind::Down, position, timestamp)
    }

    /// A move.
    pub fn moved(pointer: PointerId, position: PxPosition, timestamp: Instant) -> Self {
        Self::new(pointer, PointerEventKind::Move, position, timestamp)
    }

    /// A release.
    pub fn up(pointer: PointerId, position: PxPosition, timestamp: Instant) -> Self {
        Self::new(pointer, PointerEventKind::Up, position, timestamp)
    }

    /// A platform cancellation.
    pub fn cancel(pointer: PointerId, position: PxPosition, timestamp: Instant) -> Self {
        Self::new(pointer, PointerEventKind::Cancel, position, timestamp)
    }

    /// Marks the event as consumed by another handler.
    pub fn mark_consumed(mut self) -> Self {
        self.consumed = true;
        self
    }
}

/// Which gesture confirmed a selection start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureTrigger {
    /// Two taps in quick succession.
    DoubleTap,
    /// A press held past the long press timeout.
    LongPress,
}

/// Output of the [`GestureRecognizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionIntent {
    /// Raw press observed, independent of recognition.
    PointerDown(PxPosition),
    /// Raw release of the observed pointer.
    PointerUp,
    /// Start a selection at `position`.
    Start {
        /// Confirmed position in container space.
        position: PxPosition,
        /// Gesture that confirmed.
        trigger: GestureTrigger,
    },
    /// The drag moved by a delta.
    Extend(PxPosition),
    /// The gesture finished cleanly.
    End,
    /// The gesture was aborted.
    Cancel,
}

/// Externally visible phase of the [`GestureRecognizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    /// Waiting for a first press.
    Idle,
    /// First press is down.
    FirstDown,
    /// First tap released, waiting for a second press.
    AwaitingSecondDown,
    /// Second press is down, racing the long press timeout.
    SecondDown,
    /// A selection started and moves extend it.
    Dragging,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    FirstDown {
        pointer: PointerId,
        down_at: Instant,
        position: PxPosition,
    },
    AwaitingSecondDown {
        up_at: Instant,
    },
    SecondDown {
        pointer: PointerId,
        down_at: Instant,
        position: PxPosition,
    },
    Dragging {
        pointer: PointerId,
        last: PxPosition,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettleOutcome {
    Stop,
    Cancel,
}

#[derive(Debug, Clone, Copy)]
struct PendingSettle {
    due: Instant,
    outcome: SettleOutcome,
}

/// Recognizes double tap and tap-then-long-press selection gestures.
pub struct GestureRecognizer {
    config: GestureConfig,
    bounds: Option<PxSize>,
    state: State,
    settle: Option<PendingSettle>,
    observed_pointer: Option<PointerId>,
    intents: VecDeque<SelectionIntent>,
    disposed: bool,
}

impl GestureRecognizer {
    /// Creates an idle recognizer.
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            bounds: None,
            state: State::Idle,
            settle: None,
            observed_pointer: None,
            intents: VecDeque::new(),
            disposed: false,
        }
    }

    /// Restricts recognition to `[0, size)`; a pointer leaving it before a
    /// selection started aborts the attempt.
    pub fn set_bounds(&mut self, bounds: Option<PxSize>) {
        self.bounds = bounds;
    }

    /// Current phase.
    pub fn phase(&self) -> GesturePhase {
        match self.state {
            State::Idle => GesturePhase::Idle,
            State::FirstDown { .. } => GesturePhase::FirstDown,
            State::AwaitingSecondDown { .. } => GesturePhase::AwaitingSecondDown,
            State::SecondDown { .. } => GesturePhase::SecondDown,
            State::Dragging { .. } => GesturePhase::Dragging,
        }
    }

    /// Whether a finished drag is waiting out its settle delay.
    pub fn is_settling(&self) -> bool {
        self.settle.is_some()
    }

    /// Whether [`GestureRecognizer::dispose`] was called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.state_deadline(), self.settle.map(|settle| settle.due)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drains the intents produced so far.
    pub fn take_intents(&mut self) -> Vec<SelectionIntent> {
        self.intents.drain(..).collect()
    }

    /// Feeds one pointer event.
    pub fn handle_event(&mut self, event: PointerEvent) {
        if self.disposed {
            return;
        }
        self.tick(event.timestamp);

        if event.kind == PointerEventKind::Down && self.observed_pointer.is_none() {
            self.observed_pointer = Some(event.pointer);
            self.intents
                .push_back(SelectionIntent::PointerDown(event.position));
        }

        self.step(event);

        if matches!(event.kind, PointerEventKind::Up | PointerEventKind::Cancel)
            && self.observed_pointer == Some(event.pointer)
        {
            self.observed_pointer = None;
            self.intents.push_back(SelectionIntent::PointerUp);
        }
    }

    /// Fires every deadline at or before `now`, oldest first.
    pub fn tick(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        loop {
            let state_due = self.state_deadline().filter(|due| *due <= now);
            let settle_due = self.settle.map(|settle| settle.due).filter(|due| *due <= now);
            match (state_due, settle_due) {
                (None, None) => break,
                (Some(state), Some(settle)) if settle <= state => self.fire_settle(),
                (Some(state), _) => self.fire_state_deadline(state),
                (None, Some(_)) => self.fire_settle(),
            }
        }
    }

    /// Force-ends the current gesture.
    ///
    /// An active drag finishes cleanly right away, a pending settle completes
    /// immediately, and an unconfirmed gesture is dropped.
    pub fn stop(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        self.tick(now);
        if let State::Dragging { .. } = self.state {
            debug!("Selection drag stopped by host");
            self.intents.push_back(SelectionIntent::End);
        }
        self.state = State::Idle;
        if self.settle.is_some() {
            self.fire_settle();
        }
    }

    /// Tears the recognizer down without emitting anything. Later events
    /// and ticks are ignored.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.state = State::Idle;
        self.settle = None;
        self.observed_pointer = None;
        self.intents.clear();
    }

    fn is_out_of_bounds(&self, position: PxPosition) -> bool {
        self.bounds.is_some_and(|size| {
            position.x < Px::ZERO
                || position.y < Px::ZERO
                || position.x >= size.width
                || position.y >= size.height
        })
    }

    fn state_deadline(&self) -> Option<Instant> {
        match self.state {
            State::FirstDown { down_at, .. }
                if self.config.mode == GestureMode::DoubleTapOrTapWithLongTap =>
            {
                Some(down_at + self.config.long_press_timeout)
            }
            State::AwaitingSecondDown { up_at } => Some(up_at + self.config.double_tap_timeout),
            State::SecondDown { down_at, .. } => Some(down_at + self.config.long_press_timeout),
            _ => None,
        }
    }

    fn fire_state_deadline(&mut self, at: Instant) {
        match self.state {
            State::FirstDown {
                pointer, position, ..
            } => {
                trace!("First press held past the long press timeout");
                self.confirm(GestureTrigger::LongPress, position, pointer, at);
            }
            State::AwaitingSecondDown { .. } => {
                trace!("No second tap within the double tap window");
                self.state = State::Idle;
            }
            State::SecondDown {
                pointer, position, ..
            } => match self.config.mode {
                GestureMode::DoubleTapOrTapWithLongTap => {
                    self.confirm(GestureTrigger::LongPress, position, pointer, at);
                }
                GestureMode::DoubleTapOnly => {
                    trace!("Second press held too long for a double tap");
                    self.state = State::Idle;
                }
            },
            State::Idle | State::Dragging { .. } => {}
        }
    }

    fn fire_settle(&mut self) {
        if let Some(settle) = self.settle.take() {
            self.intents.push_back(match settle.outcome {
                SettleOutcome::Stop => SelectionIntent::End,
                SettleOutcome::Cancel => SelectionIntent::Cancel,
            });
        }
    }

    fn confirm(
        &mut self,
        trigger: GestureTrigger,
        position: PxPosition,
        pointer: PointerId,
        at: Instant,
    ) {
        if self.settle.take().is_some() {
            trace!("New gesture supersedes the pending settle");
            self.intents.push_back(SelectionIntent::Cancel);
        }
        debug!("Selection gesture confirmed: {trigger:?} at {position:?}");
        self.intents
            .push_back(SelectionIntent::Start { position, trigger });
        match trigger {
            // The pointer is already up, so the drag ends as soon as it
            // starts.
            GestureTrigger::DoubleTap => self.finish(SettleOutcome::Stop, at),
            GestureTrigger::LongPress => {
                self.state = State::Dragging {
                    pointer,
                    last: position,
                }
            }
        }
    }

    fn finish(&mut self, outcome: SettleOutcome, at: Instant) {
        self.state = State::Idle;
        self.settle = Some(PendingSettle {
            due: at + self.config.settle_delay,
            outcome,
        });
    }

    fn step(&mut self, event: PointerEvent) {
        let out_of_bounds = self.is_out_of_bounds(event.position);
        match self.state {
            State::Idle => {
                if event.kind == PointerEventKind::Down && !event.consumed {
                    self.state = State::FirstDown {
                        pointer: event.pointer,
                        down_at: event.timestamp,
                        position: event.position,
                    };
                }
            }
            State::FirstDown {
                pointer, down_at, ..
            } if pointer == event.pointer => match event.kind {
                PointerEventKind::Up if !event.consumed => {
                    self.state = State::AwaitingSecondDown {
                        up_at: event.timestamp,
                    };
                }
                PointerEventKind::Move if !event.consumed && !out_of_bounds => {
                    self.state = State::FirstDown {
                        pointer,
                        down_at,
                        position: event.position,
                    };
                }
                PointerEventKind::Down => {}
                _ => {
                    trace!("First press aborted");
                    self.state = State::Idle;
                }
            },
            State::AwaitingSecondDown { up_at } => {
                if event.kind != PointerEventKind::Down || event.consumed {
                    return;
                }
                if event.timestamp < up_at + self.config.double_tap_min_time {
                    trace!("Ignoring second press inside the minimum double tap interval");
                    return;
                }
                self.state = State::SecondDown {
                    pointer: event.pointer,
                    down_at: event.timestamp,
                    position: event.position,
                };
            }
            State::SecondDown {
                pointer, down_at, ..
            } if pointer == event.pointer => match event.kind {
                PointerEventKind::Up if !event.consumed => {
                    self.confirm(
                        GestureTrigger::DoubleTap,
                        event.position,
                        pointer,
                        event.timestamp,
                    );
                }
                PointerEventKind::Move if !event.consumed && !out_of_bounds => {
                    let past_min = event.timestamp > down_at + self.config.double_tap_min_time;
                    if past_min && self.config.mode == GestureMode::DoubleTapOrTapWithLongTap {
                        self.confirm(
                            GestureTrigger::LongPress,
                            event.position,
                            pointer,
                            event.timestamp,
                        );
                    } else {
                        self.state = State::SecondDown {
                            pointer,
                            down_at,
                            position: event.position,
                        };
                    }
                }
                PointerEventKind::Down => {}
                _ => {
                    trace!("Second press aborted");
                    self.state = State::Idle;
                }
            },
            State::Dragging { pointer, last } if pointer == event.pointer => match event.kind {
                PointerEventKind::Move if event.consumed => {
                    self.finish(SettleOutcome::Cancel, event.timestamp);
                }
                PointerEventKind::Move => {
                    let delta = event.position - last;
                    if delta != PxPosition::ZERO {
                        self.intents.push_back(SelectionIntent::Extend(delta));
                    }
                    self.state = State::Dragging {
                        pointer,
                        last: event.position,
                    };
                }
                PointerEventKind::Up => self.finish(SettleOutcome::Stop, event.timestamp),
                PointerEventKind::Cancel => self.finish(SettleOutcome::Cancel, event.timestamp),
                PointerEventKind::Down => {}
            },
            State::FirstDown { .. } | State::SecondDown { .. } | State::Dragging { .. } => {}
        }
    }
}

/// Output of the [`HandleDragDetector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleDragIntent {
    /// Dragging started from the press position.
    Start(PxPosition),
    /// The handle moved by a delta. The first delta covers the whole travel
    /// since the press.
    Drag(PxPosition),
    /// The drag finished cleanly.
    Stop,
    /// The drag was aborted.
    Cancel,
}

/// Detects a drag on a selection handle once it passes the touch slop.
#[derive(Debug, Clone)]
pub struct HandleDragDetector {
    touch_slop: Px,
    pointer: Option<PointerId>,
    down_position: PxPosition,
    last: PxPosition,
    dragging: bool,
    intents: SmallVec<[HandleDragIntent; 4]>,
}

impl HandleDragDetector {
    /// Creates an idle detector.
    pub fn new(touch_slop: Px) -> Self {
        Self {
            touch_slop,
            pointer: None,
            down_position: PxPosition::ZERO,
            last: PxPosition::ZERO,
            dragging: false,
            intents: SmallVec::new(),
        }
    }

    /// Whether a pointer is being tracked.
    pub fn is_active(&self) -> bool {
        self.pointer.is_some()
    }

    /// Whether the tracked pointer passed the slop.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Pointer being tracked.
    pub fn pointer(&self) -> Option<PointerId> {
        self.pointer
    }

    /// Feeds one pointer event.
    pub fn handle_event(&mut self, event: PointerEvent) {
        if event.kind == PointerEventKind::Down {
            if self.pointer.is_none() && !event.consumed {
                self.pointer = Some(event.pointer);
                self.down_position = event.position;
                self.last = event.position;
                self.dragging = false;
            }
            return;
        }
        if self.pointer != Some(event.pointer) {
            return;
        }

        match event.kind {
            PointerEventKind::Move if event.consumed => self.reset(HandleDragIntent::Cancel),
            PointerEventKind::Move if self.dragging => {
                let delta = event.position - self.last;
                if delta != PxPosition::ZERO {
                    self.intents.push(HandleDragIntent::Drag(delta));
                }
                self.last = event.position;
            }
            PointerEventKind::Move => {
                let travel = event.position - self.down_position;
                if travel.magnitude() > self.touch_slop.to_f32() {
                    self.dragging = true;
                    self.intents.push(HandleDragIntent::Start(self.down_position));
                    self.intents.push(HandleDragIntent::Drag(travel));
                    self.last = event.position;
                }
            }
            PointerEventKind::Up => self.reset(HandleDragIntent::Stop),
            PointerEventKind::Cancel => self.reset(HandleDragIntent::Cancel),
            PointerEventKind::Down => {}
        }
    }

    /// Drains the intents produced so far.
    pub fn take_intents(&mut self) -> SmallVec<[HandleDragIntent; 4]> {
        std::mem::take(&mut self.intents)
    }

    fn reset(&mut self, terminal: HandleDragIntent) {
        if self.dragging {
            self.intents.push(terminal);
        }
        self.pointer = None;
        self.dragging = false;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn at(x: i32, y: i32) -> PxPosition {
        PxPosition::new(Px(x), Px(y))
    }

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    fn starts(intents: &[SelectionIntent]) -> Vec<(PxPosition, GestureTrigger)> {
        intents
            .iter()
            .filter_map(|intent| match intent {
                SelectionIntent::Start { position, trigger } => Some((*position, *trigger)),
                _ => None,
            })
            .collect()
    }

    fn double_tap(recognizer: &mut GestureRecognizer, t0: Instant, position: PxPosition) {
        recognizer.handle_event(PointerEvent::down(1, position, t0));
        recognizer.handle_event(PointerEvent::up(1, position, ms(t0, 50)));
        recognizer.handle_event(PointerEvent::down(2, position, ms(t0, 150)));
        recognizer.handle_event(PointerEvent::up(2, position, ms(t0, 200)));
    }

    #[test]
    fn double_tap_starts_then_settles_with_end() {
        let mut recognizer = GestureRecognizer::new(GestureConfig::default());
        let t0 = Instant::now();
        double_tap(&mut recognizer, t0, at(75, 5));

        let intents = recognizer.take_intents();
        assert_eq!(
            intents,
            vec![
                SelectionIntent::PointerDown(at(75, 5)),
                SelectionIntent::PointerUp,
                SelectionIntent::PointerDown(at(75, 5)),
                SelectionIntent::Start {
                    position: at(75, 5),
                    trigger: GestureTrigger::DoubleTap,
                },
                SelectionIntent::PointerUp,
            ]
        );
        assert!(recognizer.is_settling());
        assert_eq!(recognizer.phase(), GesturePhase::Idle);

        recognizer.tick(ms(t0, 220));
        assert!(recognizer.take_intents().is_empty());
        recognizer.tick(ms(t0, 232));
        assert_eq!(recognizer.take_intents(), vec![SelectionIntent::End]);
        assert!(!recognizer.is_settling());
    }

    #[test]
    fn second_press_inside_minimum_interval_is_ignored() {
        let mut recognizer = GestureRecognizer::new(GestureConfig::default());
        let t0 = Instant::now();
        recognizer.handle_event(PointerEvent::down(1, at(0, 0), t0));
        recognizer.handle_event(PointerEvent::up(1, at(0, 0), ms(t0, 50)));
        recognizer.handle_event(PointerEvent::down(2, at(0, 0), ms(t0, 60)));
        assert_eq!(recognizer.phase(), GesturePhase::AwaitingSecondDown);

        recognizer.handle_event(PointerEvent::up(2, at(0, 0), ms(t0, 70)));
        recognizer.handle_event(PointerEvent::down(3, at(0, 0), ms(t0, 120)));
        assert_eq!(recognizer.phase(), GesturePhase::SecondDown);
    }

    #[test]
    fn missing_second_tap_resolves_to_nothing() {
        let mut recognizer = GestureRecognizer::new(GestureConfig::default());
        let t0 = Instant::now();
        recognizer.handle_event(PointerEvent::down(1, at(0, 0), t0));
        recognizer.handle_event(PointerEvent::up(1, at(0, 0), ms(t0, 50)));
        recognizer.tick(ms(t0, 351));

        assert_eq!(recognizer.phase(), GesturePhase::Idle);
        assert!(starts(&recognizer.take_intents()).is_empty());
        assert_eq!(recognizer.next_deadline(), None);
    }

    #[test]
    fn tap_then_hold_confirms_long_press_and_drags() {
        let mut recognizer = GestureRecognizer::new(GestureConfig::default());
        let t0 = Instant::now();
        recognizer.handle_event(PointerEvent::down(1, at(10, 10), t0));
        recognizer.handle_event(PointerEvent::up(1, at(10, 10), ms(t0, 50)));
        recognizer.handle_event(PointerEvent::down(2, at(12, 10), ms(t0, 150)));
        assert_eq!(recognizer.next_deadline(), Some(ms(t0, 550)));
        recognizer.tick(ms(t0, 550));
        assert_eq!(recognizer.phase(), GesturePhase::Dragging);
        assert_eq!(
            starts(&recognizer.take_intents()),
            vec![(at(12, 10), GestureTrigger::LongPress)]
        );

        recognizer.handle_event(PointerEvent::moved(2, at(30, 12), ms(t0, 600)));
        recognizer.handle_event(PointerEvent::moved(2, at(30, 12), ms(t0, 610)));
        recognizer.handle_event(PointerEvent::up(2, at(30, 12), ms(t0, 650)));
        assert_eq!(
            recognizer.take_intents(),
            vec![SelectionIntent::Extend(at(18, 2)), SelectionIntent::PointerUp]
        );
        recognizer.tick(ms(t0, 682));
        assert_eq!(recognizer.take_intents(), vec![SelectionIntent::End]);
    }

    #[test]
    fn moving_second_press_confirms_long_press_at_move() {
        let mut recognizer = GestureRecognizer::new(GestureConfig::default());
        let t0 = Instant::now();
        recognizer.handle_event(PointerEvent::down(1, at(10, 10), t0));
        recognizer.handle_event(PointerEvent::up(1, at(10, 10), ms(t0, 50)));
        recognizer.handle_event(PointerEvent::down(2, at(10, 10), ms(t0, 150)));
        // Too early: still a double tap candidate.
        recognizer.handle_event(PointerEvent::moved(2, at(11, 10), ms(t0, 170)));
        assert_eq!(recognizer.phase(), GesturePhase::SecondDown);
        recognizer.handle_event(PointerEvent::moved(2, at(40, 10), ms(t0, 260)));
        assert_eq!(recognizer.phase(), GesturePhase::Dragging);
        assert_eq!(
            starts(&recognizer.take_intents()),
            vec![(at(40, 10), GestureTrigger::LongPress)]
        );
    }

    #[test]
    fn holding_first_press_confirms_long_press() {
        let mut recognizer = GestureRecognizer::new(GestureConfig::default());
        let t0 = Instant::now();
        recognizer.handle_event(PointerEvent::down(1, at(5, 5), t0));
        recognizer.handle_event(PointerEvent::moved(1, at(6, 5), ms(t0, 100)));
        recognizer.tick(ms(t0, 400));
        assert_eq!(
            starts(&recognizer.take_intents()),
            vec![(at(6, 5), GestureTrigger::LongPress)]
        );
        assert_eq!(recognizer.phase(), GesturePhase::Dragging);
    }

    #[test]
    fn double_tap_only_mode_never_long_presses() {
        let config = GestureConfig::default().mode(GestureMode::DoubleTapOnly);
        let mut recognizer = GestureRecognizer::new(config);
        let t0 = Instant::now();
        recognizer.handle_event(PointerEvent::down(1, at(5, 5), t0));
        recognizer.tick(ms(t0, 5_000));
        assert_eq!(recognizer.phase(), GesturePhase::FirstDown);

        recognizer.handle_event(PointerEvent::up(1, at(5, 5), ms(t0, 5_010)));
        recognizer.handle_event(PointerEvent::down(2, at(5, 5), ms(t0, 5_100)));
        recognizer.handle_event(PointerEvent::moved(2, at(50, 5), ms(t0, 5_200)));
        recognizer.tick(ms(t0, 5_500));
        assert_eq!(recognizer.phase(), GesturePhase::Idle);
        assert!(starts(&recognizer.take_intents()).is_empty());

        double_tap(&mut recognizer, ms(t0, 6_000), at(5, 5));
        assert_eq!(
            starts(&recognizer.take_intents()),
            vec![(at(5, 5), GestureTrigger::DoubleTap)]
        );
    }

    #[test]
    fn new_gesture_cancels_pending_settle_before_starting() {
        let config = GestureConfig::default().settle_delay(Duration::from_millis(1_000));
        let mut recognizer = GestureRecognizer::new(config);
        let t0 = Instant::now();
        double_tap(&mut recognizer, t0, at(5, 5));
        recognizer.take_intents();

        double_tap(&mut recognizer, ms(t0, 300), at(7, 5));
        let intents: Vec<_> = recognizer
            .take_intents()
            .into_iter()
            .filter(|intent| {
                !matches!(
                    intent,
                    SelectionIntent::PointerDown(_) | SelectionIntent::PointerUp
                )
            })
            .collect();
        assert_eq!(
            intents,
            vec![
                SelectionIntent::Cancel,
                SelectionIntent::Start {
                    position: at(7, 5),
                    trigger: GestureTrigger::DoubleTap,
                },
            ]
        );
    }

    #[test]
    fn consumed_drag_cancels() {
        let mut recognizer = GestureRecognizer::new(GestureConfig::default());
        let t0 = Instant::now();
        recognizer.handle_event(PointerEvent::down(1, at(5, 5), t0));
        recognizer.tick(ms(t0, 400));
        recognizer.take_intents();

        recognizer.handle_event(PointerEvent::moved(1, at(9, 5), ms(t0, 420)).mark_consumed());
        recognizer.tick(ms(t0, 460));
        assert_eq!(recognizer.take_intents(), vec![SelectionIntent::Cancel]);
    }

    #[test]
    fn leaving_bounds_aborts_unconfirmed_press() {
        let mut recognizer = GestureRecognizer::new(GestureConfig::default());
        recognizer.set_bounds(Some(PxSize::new(Px(100), Px(100))));
        let t0 = Instant::now();
        recognizer.handle_event(PointerEvent::down(1, at(5, 5), t0));
        recognizer.handle_event(PointerEvent::moved(1, at(150, 5), ms(t0, 50)));
        recognizer.tick(ms(t0, 1_000));
        assert_eq!(recognizer.phase(), GesturePhase::Idle);
        assert!(starts(&recognizer.take_intents()).is_empty());
    }

    #[test]
    fn pre_drag_observer_reports_consumed_presses() {
        let mut recognizer = GestureRecognizer::new(GestureConfig::default());
        let t0 = Instant::now();
        recognizer.handle_event(PointerEvent::down(1, at(5, 5), t0).mark_consumed());
        assert_eq!(recognizer.phase(), GesturePhase::Idle);
        recognizer.handle_event(PointerEvent::cancel(1, at(5, 5), ms(t0, 10)));
        assert_eq!(
            recognizer.take_intents(),
            vec![SelectionIntent::PointerDown(at(5, 5)), SelectionIntent::PointerUp]
        );
    }

    #[test]
    fn stop_ends_drag_immediately() {
        let mut recognizer = GestureRecognizer::new(GestureConfig::default());
        let t0 = Instant::now();
        recognizer.handle_event(PointerEvent::down(1, at(5, 5), t0));
        recognizer.tick(ms(t0, 400));
        recognizer.take_intents();

        recognizer.stop(ms(t0, 410));
        assert_eq!(recognizer.take_intents(), vec![SelectionIntent::End]);
        recognizer.handle_event(PointerEvent::up(1, at(5, 5), ms(t0, 420)));
        recognizer.tick(ms(t0, 1_000));
        assert_eq!(recognizer.take_intents(), vec![SelectionIntent::PointerUp]);
    }

    #[test]
    fn dispose_drops_pending_settle_silently() {
        let mut recognizer = GestureRecognizer::new(GestureConfig::default());
        let t0 = Instant::now();
        double_tap(&mut recognizer, t0, at(5, 5));
        recognizer.dispose();
        recognizer.tick(ms(t0, 1_000));
        recognizer.handle_event(PointerEvent::down(3, at(5, 5), ms(t0, 1_100)));
        assert!(recognizer.take_intents().is_empty());
        assert!(recognizer.is_disposed());
    }

    #[test]
    fn handle_drag_waits_for_touch_slop() {
        let mut detector = HandleDragDetector::new(Px(8));
        let t0 = Instant::now();
        detector.handle_event(PointerEvent::down(4, at(100, 100), t0));
        detector.handle_event(PointerEvent::moved(4, at(104, 100), ms(t0, 10)));
        assert!(detector.take_intents().is_empty());
        assert!(!detector.is_dragging());

        detector.handle_event(PointerEvent::moved(4, at(110, 100), ms(t0, 20)));
        detector.handle_event(PointerEvent::moved(4, at(115, 102), ms(t0, 30)));
        detector.handle_event(PointerEvent::up(4, at(115, 102), ms(t0, 40)));
        assert_eq!(
            detector.take_intents().into_vec(),
            vec![
                HandleDragIntent::Start(at(100, 100)),
                HandleDragIntent::Drag(at(10, 0)),
                HandleDragIntent::Drag(at(5, 2)),
                HandleDragIntent::Stop,
            ]
        );
        assert!(!detector.is_active());
    }

    #[test]
    fn handle_tap_without_drag_emits_nothing() {
        let mut detector = HandleDragDetector::new(Px(8));
        let t0 = Instant::now();
        detector.handle_event(PointerEvent::down(4, at(0, 0), t0));
        detector.handle_event(PointerEvent::cancel(4, at(0, 0), ms(t0, 5)));
        assert!(detector.take_intents().is_empty());
    }
}
