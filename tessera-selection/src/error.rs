//! Error types for the selection engine.

use thiserror::Error;

use crate::selection::SelectableId;

/// Errors reported by the selection registrar and platform services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The same selectable was registered twice without unregistering.
    #[error("selectable is already registered as {0}")]
    DuplicateRegistration(SelectableId),
    /// The id does not belong to a registered selectable.
    #[error("selectable {0} is not registered")]
    UnknownSelectable(SelectableId),
    /// The clipboard rejected a write.
    #[error("clipboard write failed: {0}")]
    Clipboard(String),
}

/// Result alias for selection operations.
pub type SelectionResult<T> = Result<T, SelectionError>;
