//! Copying the displayed value to the system clipboard.

use arboard::Clipboard;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("failed to access clipboard: {0}")]
    Access(#[source] arboard::Error),
    #[error("failed to copy to clipboard: {0}")]
    Copy(#[source] arboard::Error),
    #[error("nothing to copy while the calculator shows an error")]
    ErrorState,
}

/// Copy text to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = Clipboard::new().map_err(ClipboardError::Access)?;

    clipboard
        .set_text(text.to_string())
        .map_err(ClipboardError::Copy)
}

/// Copy the calculator's current display, refusing the error marker.
pub fn copy_display(display: &crate::calculator::Display) -> Result<(), ClipboardError> {
    if display.is_error {
        return Err(ClipboardError::ErrorState);
    }
    copy_to_clipboard(&display.text)
}
