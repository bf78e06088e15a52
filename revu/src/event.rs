//! Event bus for revu.
//!
//! Terminal input, timer fires and finished background polls are all
//! normalised into a single `AppEvent` and sent over one tokio unbounded MPSC
//! channel. The event loop is the only receiver, so state mutation is
//! serialised by construction.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::StreamExt;
use revu_core::error::ServiceError;
use revu_core::types::{AnalysisStatus, Comment};
use tokio::sync::mpsc;

/// Result of one background poll: the comment list and the status, fetched
/// back to back. Either half may have failed independently.
#[derive(Debug)]
pub struct PollOutcome {
    pub comments: Result<Vec<Comment>, ServiceError>,
    pub status: Result<AnalysisStatus, ServiceError>,
}

/// All events the application can receive from any source.
#[derive(Debug)]
pub enum AppEvent {
    /// A key press from the terminal (`KeyEventKind::Press` only).
    ///
    /// Release and repeat events are filtered in [`spawn_input_task`] so keys
    /// never double-fire on terminals that report both.
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// UI tick: advances the spinner while the analysis runs.
    Tick,
    /// Poll timer fired; the loop decides whether to start a poll.
    Poll,
    /// A background poll finished.
    PollResult(Box<PollOutcome>),
    /// A background poll task died (panicked or was cancelled) without a result.
    PollAborted,
    /// Quit signal (SIGTERM/SIGINT/SIGHUP or a closed input stream).
    Quit,
}

/// Holds the sender and receiver ends of the unified event channel.
///
/// The sender (`tx`) is cloned for every producer: the input task, both
/// schedules, and each poll task.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the task that forwards crossterm input onto the channel.
///
/// Runs until the input stream ends or the receiver is dropped. A stream that
/// ends or errors sends `Quit`, since no further input can arrive.
pub fn spawn_input_task(tx: mpsc::UnboundedSender<AppEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(event) = reader.next().await {
            let sent = match event {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    tx.send(AppEvent::Key(key))
                }
                Ok(Event::Mouse(mouse)) => tx.send(AppEvent::Mouse(mouse)),
                Ok(Event::Resize(w, h)) => tx.send(AppEvent::Resize(w, h)),
                Ok(_) => Ok(()),
                Err(e) => {
                    tracing::warn!(error = %e, "terminal input stream failed");
                    break;
                }
            };
            if sent.is_err() {
                return;
            }
        }
        let _ = tx.send(AppEvent::Quit);
    })
}
