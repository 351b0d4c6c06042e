//! Side-effect services the selection engine calls out to.
//!
//! ## Usage
//!
//! Implement [`ClipboardService`] and [`HapticFeedback`] for the host
//! platform (or use the ones in `tessera-selection-platform`) and hand them
//! to the selection container.

use crate::error::SelectionResult;

/// Writes plain text to the system clipboard.
pub trait ClipboardService: Send + Sync {
    /// Replaces the clipboard content with `text`.
    fn set_text(&self, text: &str) -> SelectionResult<()>;
}

/// Kinds of haptic feedback the engine requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HapticFeedbackType {
    /// A long press started a selection.
    LongPress,
    /// A dragged handle moved to a new character.
    TextHandleMove,
}

/// Performs haptic feedback.
pub trait HapticFeedback: Send + Sync {
    /// Triggers one feedback pulse.
    fn perform(&self, kind: HapticFeedbackType);
}
