//! Platform services for tessera-selection.
//!
//! ## Usage
//!
//! Wire the system clipboard and haptics into a selection container at
//! startup.
//!
//! ```no_run
//! use tessera_selection::{SelectionConfig, SelectionContainer};
//! use tessera_selection_platform::PlatformServices;
//!
//! let container = PlatformServices::new().apply(SelectionContainer::new(SelectionConfig::default()));
//! # drop(container);
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod clipboard;
pub mod haptics;

use std::sync::Arc;

use tessera_selection::SelectionContainer;

pub use clipboard::SystemClipboard;
pub use haptics::TracingHaptics;

/// Bundle of the platform services a selection container uses.
#[derive(Clone)]
pub struct PlatformServices {
    clipboard: Arc<SystemClipboard>,
    haptics: Arc<TracingHaptics>,
}

impl PlatformServices {
    /// Creates the default platform services.
    pub fn new() -> Self {
        Self {
            clipboard: Arc::new(SystemClipboard::new()),
            haptics: Arc::new(TracingHaptics::new()),
        }
    }

    /// The shared clipboard.
    pub fn clipboard(&self) -> &Arc<SystemClipboard> {
        &self.clipboard
    }

    /// Installs clipboard and haptics into `container`.
    pub fn apply(&self, container: SelectionContainer) -> SelectionContainer {
        container
            .clipboard(self.clipboard.clone())
            .haptics(self.haptics.clone())
    }
}

impl Default for PlatformServices {
    fn default() -> Self {
        Self::new()
    }
}
