//! Terminal mode lifecycle.
//!
//! Raw mode is held by an RAII guard so every exit path - normal quit,
//! error, panic - puts the terminal back the way it was found. crossterm
//! switches on virtual-terminal processing for the Windows console the
//! first time one of its commands is issued, so no separate shim is needed
//! here.

use std::io::{self, stdout};

use crossterm::{
    cursor::Show,
    execute,
    style::ResetColor,
    terminal::{self, disable_raw_mode, enable_raw_mode},
};

/// Guard over raw mode; dropping it restores cooked mode, default colors,
/// and cursor visibility.
pub struct TerminalModes {
    enabled: bool,
}

impl TerminalModes {
    pub fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        tracing::debug!("raw mode enabled");
        Ok(Self { enabled: true })
    }
}

impl Drop for TerminalModes {
    fn drop(&mut self) {
        if self.enabled {
            let _ = restore();
        }
    }
}

/// Best-effort restoration of the terminal; also the panic-path cleanup.
pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), ResetColor, Show)
}

/// Current terminal dimensions as `(columns, rows)`.
pub fn size() -> io::Result<(usize, usize)> {
    let (width, height) = terminal::size()?;
    Ok((width as usize, height as usize))
}

/// Restore the terminal before the default panic output, so the message is
/// not swallowed by raw mode.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = restore();
        original_hook(panic);
    }));
}
