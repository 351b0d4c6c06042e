//! Multi-block text selection for tessera.
//!
//! One selection can start in a text block and extend across any number of
//! sibling blocks inside a [`SelectionContainer`]. The crate recognizes the
//! selection gestures (double tap, tap then long press, handle drags),
//! resolves pixels to text offsets, keeps the per-block ranges, positions the
//! handles and drives a host-provided toolbar.
//!
//! ## Usage
//!
//! - Implement [`TextLayout`] over the host's shaped text, or use
//!   `testing::GridTextLayout` (feature `testing`) for headless hosts.
//! - Mount one [`SelectableText`] per text block and keep its layout and
//!   placement current.
//! - Route pointer events and timer ticks into the container and render the
//!   highlight rectangles and handle positions it reports.
//!
//! Platform clipboard and haptics implementations live in
//! `tessera-selection-platform`.
#![deny(missing_docs, clippy::unwrap_used)]

pub mod callback;
pub mod config;
pub mod container;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod layout;
pub mod manager;
pub mod offset_mapping;
pub mod platform;
pub mod px;
pub mod registrar;
pub mod selectable;
pub mod selection;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod toolbar;

pub use callback::{Callback, CallbackWith};
pub use config::{GestureConfig, GestureMode, SelectionConfig};
pub use container::{SelectableRegistration, SelectionContainer};
pub use error::{SelectionError, SelectionResult};
pub use gesture::{
    GestureRecognizer, GestureTrigger, HandleDragDetector, HandleDragIntent, PointerEvent,
    PointerEventKind, PointerId, SelectionIntent,
};
pub use layout::{LayoutSnapshot, ResolvedTextDirection, TextLayout};
pub use manager::{HandleKind, HandlePositions, SelectionManager};
pub use offset_mapping::{IdentityOffsetMapping, OffsetMapping};
pub use platform::{ClipboardService, HapticFeedback, HapticFeedbackType};
pub use px::{Px, PxPosition, PxRect, PxSize};
pub use registrar::SelectionRegistrar;
pub use selectable::{ScreenTransform, Selectable, SelectableText};
pub use selection::{AnchorInfo, SelectableId, Selection, SelectionAdjustment, SelectionRange};
pub use toolbar::{TextToolbar, ToolbarItem, ToolbarMenu, ToolbarStatus};

/// Installs a log subscriber for tests; `RUST_LOG` picks the level.
#[cfg(test)]
pub(crate) fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
