//! Haptic feedback.

use tessera_selection::{HapticFeedback, HapticFeedbackType};
use tracing::debug;

/// Haptics for platforms without a vibration motor: every pulse is logged.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingHaptics;

impl TracingHaptics {
    /// Creates the haptics service.
    pub fn new() -> Self {
        Self
    }
}

impl HapticFeedback for TracingHaptics {
    fn perform(&self, kind: HapticFeedbackType) {
        debug!("Haptic feedback: {kind:?}");
    }
}
