//! Fallback for runs without a terminal (pipes, CI).
//!
//! Drives the same `App` as the interactive loop, minus input and the spinner
//! tick, until the analysis leaves `running`. The list layout is then printed
//! to stdout as ANSI-styled text with every file expanded.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use revu_core::service::ReviewService;
use revu_core::state::SessionState;
use tracing::info;

use crate::app::{App, Step};
use crate::event::EventHandler;
use crate::theme::Theme;
use crate::ui::{list, text};

/// Output width when `COLUMNS` is unset or unparsable.
const DEFAULT_WIDTH: usize = 100;

/// Polls to completion (or until `stop` is raised), then prints the result.
pub async fn run<S: ReviewService>(
    service: Arc<S>,
    state: SessionState,
    analysis_id: String,
    poll: Duration,
    theme: &Theme,
    stop: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let handler = EventHandler::new();
    let mut rx = handler.rx;
    let mut app = App::new(state, service, analysis_id, handler.tx, 0);
    app.start_timers(poll, Duration::ZERO);

    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
            }
            maybe_event = rx.recv() => {
                let Some(event) = maybe_event else { break };
                if app.handle_event(event) == Step::Quit || !app.state.is_running() {
                    break;
                }
            }
        }
    }
    app.shutdown().await;
    info!(total = app.state.total_comments, status = ?app.state.status, "headless run finished");

    let mut out = io::stdout().lock();
    print_list(&mut app.state, theme, output_width(), &mut out)?;
    out.flush()?;
    Ok(())
}

fn output_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|&w| w > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Writes the fully expanded list, one ANSI line per row.
fn print_list(
    state: &mut SessionState,
    theme: &Theme,
    width: usize,
    out: &mut impl Write,
) -> io::Result<()> {
    for group in &mut state.files {
        group.expanded = true;
    }
    for line in &list::list_lines(state, theme, width).lines {
        writeln!(out, "{}", text::to_ansi(line))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use revu_core::error::ServiceError;
    use revu_core::types::{AnalysisStatus, ChangedFile, Comment};
    use std::sync::Mutex;

    fn comment(path: &str, line: u32, title: &str) -> Comment {
        Comment {
            id: format!("{path}:{line}"),
            file_path: path.into(),
            line_start: line,
            line_end: line,
            severity: "High".into(),
            confidence: String::new(),
            title: title.into(),
            content: String::new(),
            created_at: None,
            resolved: false,
        }
    }

    struct Scripted {
        statuses: Mutex<Vec<AnalysisStatus>>,
    }

    impl ReviewService for Scripted {
        async fn submit_review(&self, _files: &[ChangedFile]) -> Result<String, ServiceError> {
            Ok("h-1".into())
        }

        async fn poll_comments(&self, _id: &str) -> Result<Vec<Comment>, ServiceError> {
            Ok(vec![comment("src/a.ts", 10, "Leak")])
        }

        async fn get_status(&self, _id: &str) -> Result<AnalysisStatus, ServiceError> {
            let mut statuses = self.statuses.lock().unwrap();
            Ok(if statuses.len() > 1 {
                statuses.remove(0)
            } else {
                statuses[0]
            })
        }

        async fn stop_analysis(&self, _id: &str) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    #[test]
    fn printed_list_expands_every_file() {
        let mut state = SessionState::new(Vec::new());
        state.merge_comments(vec![
            comment("src/a.ts", 10, "Leak"),
            comment("src/b.rs", 3, "Race"),
        ]);
        let mut out = Vec::new();
        print_list(&mut state, &Theme::dark(), 80, &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(state.files.iter().all(|g| g.expanded));
        assert!(printed.contains("src/a.ts"));
        assert!(printed.contains("Leak"));
        assert!(printed.contains("Race"));
        assert!(printed.contains("\u{1b}["));
    }

    #[tokio::test]
    async fn runs_until_the_analysis_completes() {
        let service = Arc::new(Scripted {
            statuses: Mutex::new(vec![AnalysisStatus::Running, AnalysisStatus::Completed]),
        });
        let stop = Arc::new(AtomicBool::new(false));
        let finished = tokio::time::timeout(
            Duration::from_secs(5),
            run(
                service,
                SessionState::new(Vec::new()),
                "h-1".into(),
                Duration::from_millis(10),
                &Theme::dark(),
                stop,
            ),
        )
        .await;
        assert!(matches!(finished, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn stop_flag_ends_a_running_analysis() {
        let service = Arc::new(Scripted { statuses: Mutex::new(vec![AnalysisStatus::Running]) });
        let stop = Arc::new(AtomicBool::new(true));
        let finished = tokio::time::timeout(
            Duration::from_secs(5),
            run(
                service,
                SessionState::new(Vec::new()),
                "h-1".into(),
                Duration::from_secs(60),
                &Theme::dark(),
                stop,
            ),
        )
        .await;
        assert!(finished.is_ok());
    }
}
