//! revu: terminal dashboard for streamed code review comments.
//!
//! Collects the working-tree diff, submits it to the review service, then
//! shows comments as they arrive. Without a terminal the same polling runs
//! headless and the final list is printed to stdout.
//!
//! # Startup sequence (order matters)
//!
//! 1. Load config, start file logging, resolve the theme. Nothing here touches
//!    the terminal, so config and log errors print normally.
//! 2. Collect changed files and submit the review. Failure exits non-zero
//!    before the terminal is put into raw mode.
//! 3. `install_panic_hook()`, then `register_signals()`, then `init_tui()`.
//! 4. Spawn the input task, start the poll and tick schedules, draw the first
//!    frame.
//!
//! # Safety
//!
//! `init_tui()` undoes raw mode itself when a later setup step fails. The
//! event loop exits only via `break`. Draw errors are logged and break the
//! loop, so `app.shutdown()` and `restore_tui()` always run afterwards. The
//! panic hook covers unexpected panics.

mod app;
mod client;
mod clipboard;
mod config;
mod event;
mod git;
mod headless;
mod input;
mod theme;
mod tui;
mod ui;

use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use revu_core::service::{DiffProvider, ReviewService};
use revu_core::state::SessionState;
use tracing::{error, info};

use crate::app::{App, Step};
use crate::client::HttpReviewService;
use crate::config::Config;
use crate::git::GitDiffProvider;
use crate::theme::Theme;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    init_file_logging(&config.log_path())?;
    let theme = Theme::from_name(&config.theme);

    let files = tokio::task::spawn_blocking(|| GitDiffProvider::new(".").changed_files())
        .await
        .context("diff task panicked")?
        .context("failed to collect changed files")?;
    info!(files = files.len(), "changed files collected");

    let service = HttpReviewService::from_settings(&config.service)
        .context("invalid review service settings")?;
    let service = Arc::new(service);
    let analysis_id = service.submit_review(&files).await.context("failed to submit review")?;
    info!(analysis = %analysis_id, "review submitted");

    let state = SessionState::new(files);
    if !tui::is_interactive() {
        let stop = tui::register_signals()?;
        let poll = config.poll_interval();
        return headless::run(service, state, analysis_id, poll, &theme, stop).await;
    }
    run_interactive(service, state, analysis_id, &config, &theme).await
}

async fn run_interactive<S: ReviewService>(
    service: Arc<S>,
    state: SessionState,
    analysis_id: String,
    config: &Config,
    theme: &Theme,
) -> anyhow::Result<()> {
    tui::install_panic_hook();
    let term_flag = tui::register_signals()?;
    let mut terminal = tui::init_tui(config.mouse)?;

    let handler = event::EventHandler::new();
    let input_task = event::spawn_input_task(handler.tx.clone());
    let mut rx = handler.rx;

    let width = crossterm::terminal::size().map(|(w, _)| w).unwrap_or(80);
    let mut app = App::new(state, service, analysis_id, handler.tx, width);
    app.start_timers(config.poll_interval(), config.tick_interval());

    let mut draw_failed = terminal
        .draw(|frame| ui::render(frame, &mut app.state, theme))
        .is_err();

    'event_loop: while !draw_failed {
        tokio::select! {
            // Signals are only observed here; a quiet terminal would otherwise
            // block in recv() forever.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    info!("signal received");
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                let Some(event) = maybe_event else { break 'event_loop };
                match app.handle_event(event) {
                    Step::Quit => break 'event_loop,
                    Step::Render => {
                        let drawn = terminal.draw(|frame| ui::render(frame, &mut app.state, theme));
                        if let Err(e) = drawn {
                            error!(error = %e, "draw failed");
                            draw_failed = true;
                        }
                    }
                    Step::Idle => {}
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    input_task.abort();
    app.shutdown().await;
    tui::restore_tui()?;
    if draw_failed {
        anyhow::bail!("terminal draw failed; see log for details");
    }
    info!(total = app.state.total_comments, "session closed");
    Ok(())
}

/// Routes `tracing` output to `path`, creating its directory. The terminal is
/// never written to, so logs cannot corrupt the alternate screen.
fn init_file_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory '{}'", parent.display()))?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file '{}'", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();
    Ok(())
}
