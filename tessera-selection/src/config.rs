//! Tunables for gesture recognition and selection behavior.
//!
//! ## Usage
//!
//! Start from [`SelectionConfig::default`] and override what the platform
//! needs with the builder setters.
//!
//! ```
//! use std::time::Duration;
//! use tessera_selection::config::{GestureConfig, GestureMode, SelectionConfig};
//!
//! let config = SelectionConfig::default().gesture(
//!     GestureConfig::default()
//!         .mode(GestureMode::DoubleTapOnly)
//!         .settle_delay(Duration::from_millis(16)),
//! );
//! assert_eq!(config.gesture.mode, GestureMode::DoubleTapOnly);
//! ```

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    px::{Px, PxSize},
    selection::SelectionAdjustment,
};

/// Which gestures start a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GestureMode {
    /// A double tap, or a tap followed by a long press that can drag right
    /// away.
    #[default]
    DoubleTapOrTapWithLongTap,
    /// Only a double tap.
    DoubleTapOnly,
}

/// Timing and slop thresholds of the gesture recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GestureConfig {
    /// Gesture protocol.
    pub mode: GestureMode,
    /// Hold time that turns a press into a long press.
    pub long_press_timeout: Duration,
    /// Maximum gap between the first up and the second down.
    pub double_tap_timeout: Duration,
    /// Minimum gap before a second down counts as a second tap.
    pub double_tap_min_time: Duration,
    /// Grace window between the end of a drag and its completion signal.
    pub settle_delay: Duration,
    /// Distance a handle must travel before it starts dragging.
    pub touch_slop: Px,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            mode: GestureMode::default(),
            long_press_timeout: Duration::from_millis(400),
            double_tap_timeout: Duration::from_millis(300),
            double_tap_min_time: Duration::from_millis(40),
            settle_delay: Duration::from_millis(32),
            touch_slop: Px(8),
        }
    }
}

impl GestureConfig {
    /// Sets the gesture protocol.
    pub fn mode(mut self, mode: GestureMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the long press timeout.
    pub fn long_press_timeout(mut self, timeout: Duration) -> Self {
        self.long_press_timeout = timeout;
        self
    }

    /// Sets the double tap window.
    pub fn double_tap_timeout(mut self, timeout: Duration) -> Self {
        self.double_tap_timeout = timeout;
        self
    }

    /// Sets the minimum inter-tap interval.
    pub fn double_tap_min_time(mut self, min_time: Duration) -> Self {
        self.double_tap_min_time = min_time;
        self
    }

    /// Sets the settle delay.
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the handle touch slop.
    pub fn touch_slop(mut self, slop: Px) -> Self {
        self.touch_slop = slop;
        self
    }
}

/// Configuration of a selection container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectionConfig {
    /// Gesture recognition tunables.
    pub gesture: GestureConfig,
    /// Size of a selection handle's touch target.
    pub handle_size: PxSize,
    /// Snapping applied when a gesture starts a selection.
    pub start_adjustment: SelectionAdjustment,
    /// Snapping applied while the gesture keeps dragging.
    pub drag_adjustment: SelectionAdjustment,
    /// Snapping applied while a handle is dragged.
    pub handle_adjustment: SelectionAdjustment,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            handle_size: PxSize::new(Px(25), Px(25)),
            start_adjustment: SelectionAdjustment::Word,
            drag_adjustment: SelectionAdjustment::Character,
            handle_adjustment: SelectionAdjustment::Character,
        }
    }
}

impl SelectionConfig {
    /// Sets the gesture tunables.
    pub fn gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = gesture;
        self
    }

    /// Sets the handle touch target size.
    pub fn handle_size(mut self, size: PxSize) -> Self {
        self.handle_size = size;
        self
    }

    /// Sets the snapping used when a selection starts.
    pub fn start_adjustment(mut self, adjustment: SelectionAdjustment) -> Self {
        self.start_adjustment = adjustment;
        self
    }

    /// Sets the snapping used while dragging after a start.
    pub fn drag_adjustment(mut self, adjustment: SelectionAdjustment) -> Self {
        self.drag_adjustment = adjustment;
        self
    }

    /// Sets the snapping used while dragging a handle.
    pub fn handle_adjustment(mut self, adjustment: SelectionAdjustment) -> Self {
        self.handle_adjustment = adjustment;
        self
    }
}
