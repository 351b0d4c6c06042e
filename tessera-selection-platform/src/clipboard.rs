//! System clipboard access.
//!
//! ## Usage
//!
//! Hand a [`SystemClipboard`] to the selection container so "Copy" reaches
//! the OS clipboard. The OS handle is opened lazily on first use.

#[cfg(all(not(target_os = "android"), not(target_family = "wasm")))]
use parking_lot::Mutex;
use tessera_selection::{ClipboardService, SelectionError, SelectionResult};
use tracing::warn;

/// Clipboard backed by the operating system.
///
/// On Android and the web there is no backend; writes fail with
/// [`SelectionError::Clipboard`] and are logged.
#[derive(Default)]
pub struct SystemClipboard {
    #[cfg(all(not(target_os = "android"), not(target_family = "wasm")))]
    manager: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    /// Creates a clipboard handle without touching the OS yet.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardService for SystemClipboard {
    fn set_text(&self, text: &str) -> SelectionResult<()> {
        #[cfg(all(not(target_os = "android"), not(target_family = "wasm")))]
        {
            let mut manager = self.manager.lock();
            let clipboard = open(&mut manager)?;
            clipboard
                .set_text(text.to_owned())
                .map_err(|err| SelectionError::Clipboard(err.to_string()))
        }
        #[cfg(any(target_os = "android", target_family = "wasm"))]
        {
            warn!("No clipboard backend on this platform, dropping {} bytes", text.len());
            Err(SelectionError::Clipboard("unsupported platform".to_owned()))
        }
    }
}

#[cfg(all(not(target_os = "android"), not(target_family = "wasm")))]
fn open(slot: &mut Option<arboard::Clipboard>) -> SelectionResult<&mut arboard::Clipboard> {
    if slot.is_none() {
        match arboard::Clipboard::new() {
            Ok(clipboard) => *slot = Some(clipboard),
            Err(err) => {
                warn!("Failed to initialize clipboard: {err}");
                return Err(SelectionError::Clipboard(err.to_string()));
            }
        }
    }
    slot.as_mut()
        .ok_or_else(|| SelectionError::Clipboard("clipboard unavailable".to_owned()))
}
