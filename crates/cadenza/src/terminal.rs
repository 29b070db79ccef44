//! Terminal session guard.
//!
//! Owns the terminal's raw mode, alternate screen and mouse capture for the
//! lifetime of the application; everything is undone on drop, including on
//! panic unwinds, so a crash never leaves the user's shell in raw mode.

use std::io::{stdout, Write};

use crossterm::{
    cursor, event, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

/// RAII guard for the terminal session.
pub struct TerminalSession;

impl TerminalSession {
    /// Enter raw mode, the alternate screen and mouse capture.
    pub fn begin() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide
        )?;
        Ok(Self)
    }

    /// The terminal's current size in cells.
    pub fn size() -> std::io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            cursor::Show,
            event::DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
        let _ = stdout().flush();
    }
}
