//! Terminal lifecycle management for revu.
//!
//! The dashboard renders to stderr so stdout stays clean for pipelines. The
//! terminal is owned exclusively by the event loop between [`init_tui`] and
//! [`restore_tui`]; the panic hook and the signal flag make sure every exit
//! path reaches the restore.

use std::io::{self, stderr, stdin, BufWriter, IsTerminal, Stderr};
use std::panic;
use std::sync::{atomic::AtomicBool, Arc};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::flag::register;

/// CrosstermBackend over a buffered stderr writer.
///
/// `BufWriter` batches a frame's escape sequences into few write(2) calls so
/// redraws do not flicker.
pub type Tui = Terminal<CrosstermBackend<BufWriter<Stderr>>>;

/// `true` when both input and the render target are terminals.
pub fn is_interactive() -> bool {
    stdin().is_terminal() && stderr().is_terminal()
}

/// Enables raw mode, enters the alternate screen and hides the cursor. Mouse
/// reporting is best-effort: a terminal that refuses it still gets a working
/// keyboard-only dashboard.
///
/// Any failure after raw mode is on restores the terminal before returning,
/// so callers only owe [`restore_tui`] once this returns `Ok`.
pub fn init_tui(mouse: bool) -> io::Result<Tui> {
    enable_raw_mode()?;
    undo_on_err(enter_screen(mouse), restore_tui)
}

fn enter_screen(mouse: bool) -> io::Result<Tui> {
    let mut out = BufWriter::new(stderr());
    execute!(out, EnterAlternateScreen, Hide)?;
    if mouse {
        if let Err(e) = execute!(out, EnableMouseCapture) {
            tracing::warn!(error = %e, "mouse capture unavailable");
        }
    }
    Terminal::new(CrosstermBackend::new(out))
}

/// Runs `undo` when `result` is an error. An undo failure is logged; the
/// original error is the one returned.
fn undo_on_err<T>(
    result: io::Result<T>,
    undo: impl FnOnce() -> io::Result<()>,
) -> io::Result<T> {
    if result.is_err() {
        if let Err(e) = undo() {
            tracing::warn!(error = %e, "terminal restore after failed init");
        }
    }
    result
}

/// Restores the terminal: disable mouse reporting, leave the alternate
/// screen, show the cursor, then restore canonical input mode.
///
/// Idempotent. ratatui does not restore on `Drop`, so this must run on every
/// exit path including the panic hook.
pub fn restore_tui() -> io::Result<()> {
    // Raw mode is left even when the escape sequences could not be written.
    let screen = execute!(stderr(), DisableMouseCapture, LeaveAlternateScreen, Show);
    disable_raw_mode()?;
    screen
}

/// Installs a panic hook that restores the terminal before the panic message
/// prints. Chains onto the previous hook.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_tui();
        original_hook(panic_info);
    }));
}

/// Registers SIGTERM, SIGINT and SIGHUP handlers that set a shared flag.
///
/// The event loop polls the flag on a short heartbeat and shuts down cleanly
/// when it is set.
pub fn register_signals() -> io::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    for signal in [SIGTERM, SIGINT, SIGHUP] {
        register(signal, Arc::clone(&flag))?;
    }
    Ok(flag)
}
