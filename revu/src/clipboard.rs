//! System clipboard access for the copy-prompt action.

use anyhow::Context;
use arboard::Clipboard;

/// Places `text` on the system clipboard.
pub fn copy(text: &str) -> anyhow::Result<()> {
    let mut clipboard = Clipboard::new().context("clipboard unavailable")?;
    clipboard.set_text(text.to_owned()).context("clipboard write failed")?;
    Ok(())
}
