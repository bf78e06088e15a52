//! The event loop's owner of session state.
//!
//! `App` holds the single mutable `SessionState` together with everything the
//! loop needs to drive it: the review service, the analysis id, the two
//! schedules and the event sender used by background polls. Every `AppEvent`
//! goes through [`App::handle_event`], one at a time, so state is never
//! touched concurrently.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use revu_core::nav::{self, Effect, Input, Outcome};
use revu_core::scheduler::Schedule;
use revu_core::service::ReviewService;
use revu_core::state::SessionState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::event::{AppEvent, PollOutcome};
use crate::input::{decode_key, decode_mouse};

/// How long shutdown waits for the best-effort stop-analysis request.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// What the loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Idle,
    Render,
    Quit,
}

/// Writes text to the clipboard; swapped out in tests.
pub type CopyFn = fn(&str) -> anyhow::Result<()>;

pub struct App<S: ReviewService> {
    pub state: SessionState,
    service: Arc<S>,
    analysis_id: String,
    tx: UnboundedSender<AppEvent>,
    poll_timer: Option<Schedule>,
    tick_timer: Option<Schedule>,
    poll_in_flight: bool,
    /// Set once shutdown starts; late poll results are dropped.
    closed: bool,
    /// Terminal width, for resolving mouse columns to panels.
    width: u16,
    copy: CopyFn,
}

impl<S: ReviewService> App<S> {
    pub fn new(
        state: SessionState,
        service: Arc<S>,
        analysis_id: String,
        tx: UnboundedSender<AppEvent>,
        width: u16,
    ) -> Self {
        Self {
            state,
            service,
            analysis_id,
            tx,
            poll_timer: None,
            tick_timer: None,
            poll_in_flight: false,
            closed: false,
            width,
            copy: crate::clipboard::copy,
        }
    }

    #[cfg(test)]
    pub fn with_copy(mut self, copy: CopyFn) -> Self {
        self.copy = copy;
        self
    }

    /// Starts the poll and tick schedules and queues an immediate first poll.
    /// A zero `tick` skips the spinner schedule (headless runs).
    pub fn start_timers(&mut self, poll: Duration, tick: Duration) {
        let _ = self.tx.send(AppEvent::Poll);
        let on_poll = forward(self.tx.clone(), || AppEvent::Poll);
        self.poll_timer = Some(Schedule::every("poll", poll, on_poll));
        if !tick.is_zero() {
            let on_tick = forward(self.tx.clone(), || AppEvent::Tick);
            self.tick_timer = Some(Schedule::every("tick", tick, on_tick));
        }
        info!(analysis = %self.analysis_id, poll_secs = poll.as_secs(), "timers started");
    }

    pub fn timers_running(&self) -> bool {
        self.poll_timer.is_some() || self.tick_timer.is_some()
    }

    /// Cancels both schedules. Safe to call more than once.
    pub fn stop_timers(&mut self) {
        for timer in [self.poll_timer.take(), self.tick_timer.take()].into_iter().flatten() {
            timer.cancel();
        }
    }

    /// Applies one event to the session.
    pub fn handle_event(&mut self, event: AppEvent) -> Step {
        match event {
            AppEvent::Key(key) => match decode_key(key) {
                Some(press) => self.apply(Input::Key(press)),
                None => Step::Idle,
            },
            AppEvent::Mouse(mouse) => {
                let input = decode_mouse(&mouse, self.state.mode, self.width);
                self.apply(Input::Mouse(input))
            }
            AppEvent::Resize(width, _) => {
                self.width = width;
                self.apply(Input::Resize)
            }
            AppEvent::Tick => self.apply(Input::Tick),
            AppEvent::Poll => {
                self.start_poll();
                Step::Idle
            }
            AppEvent::PollResult(outcome) => self.apply_poll(*outcome),
            AppEvent::PollAborted => self.abort_poll(),
            AppEvent::Quit => Step::Quit,
        }
    }

    fn apply(&mut self, input: Input) -> Step {
        let Outcome { render, effect } = nav::reduce(&mut self.state, &input);
        match effect {
            Some(Effect::Quit) => Step::Quit,
            Some(Effect::CopyPrompt(prompt)) => {
                self.state.notice = Some(match (self.copy)(&prompt) {
                    Ok(()) => "Prompt copied to clipboard".to_owned(),
                    Err(e) => {
                        warn!(error = %e, "copy prompt failed");
                        format!("Copy failed: {e}")
                    }
                });
                Step::Render
            }
            None if render => Step::Render,
            None => Step::Idle,
        }
    }

    /// Spawns a poll unless one is already running or the analysis is over.
    fn start_poll(&mut self) {
        if self.poll_in_flight || self.closed || !self.state.is_running() {
            return;
        }
        self.poll_in_flight = true;
        let service = Arc::clone(&self.service);
        let id = self.analysis_id.clone();
        let tx = self.tx.clone();
        let poll = tokio::spawn(async move {
            let comments = service.poll_comments(&id).await;
            let status = service.get_status(&id).await;
            PollOutcome { comments, status }
        });
        // The watcher always reports back, so a dead poll task cannot leave
        // `poll_in_flight` set.
        tokio::spawn(async move {
            let event = match poll.await {
                Ok(outcome) => AppEvent::PollResult(Box::new(outcome)),
                Err(e) => {
                    error!(error = %e, "poll task died");
                    AppEvent::PollAborted
                }
            };
            let _ = tx.send(event);
        });
        debug!(analysis = %self.analysis_id, "poll started");
    }

    /// A poll task that panicked has already run the panic hook, which
    /// restored the terminal, so the session ends instead of drawing on.
    fn abort_poll(&mut self) -> Step {
        self.poll_in_flight = false;
        if self.closed {
            return Step::Idle;
        }
        warn!(analysis = %self.analysis_id, "ending session after failed poll task");
        Step::Quit
    }

    /// Merges a finished poll. Failures are logged and left for the next poll.
    fn apply_poll(&mut self, outcome: PollOutcome) -> Step {
        self.poll_in_flight = false;
        if self.closed {
            debug!("discarding poll result after shutdown");
            return Step::Idle;
        }

        let added = match outcome.comments {
            Ok(comments) => self.state.merge_comments(comments),
            Err(e) => {
                warn!(error = %e, "poll comments failed");
                0
            }
        };
        let status_changed = match outcome.status {
            Ok(status) => {
                let changed = self.state.set_status(status);
                if changed {
                    info!(?status, total = self.state.total_comments, "analysis status changed");
                }
                changed
            }
            Err(e) => {
                warn!(error = %e, "get status failed");
                false
            }
        };
        if !self.state.is_running() && self.timers_running() {
            self.stop_timers();
        }
        if added > 0 || status_changed { Step::Render } else { Step::Idle }
    }

    /// Stops the timers and, if the analysis is still running, asks the
    /// service to cancel it. Errors and timeouts are logged, never returned.
    pub async fn shutdown(&mut self) {
        self.closed = true;
        self.stop_timers();
        if !self.state.is_running() {
            return;
        }
        let stop = self.service.stop_analysis(&self.analysis_id);
        match tokio::time::timeout(STOP_TIMEOUT, stop).await {
            Ok(Ok(())) => info!(analysis = %self.analysis_id, "analysis stopped"),
            Ok(Err(e)) => warn!(error = %e, "stop analysis failed"),
            Err(_) => warn!("stop analysis timed out"),
        }
    }
}

/// Schedule callback that pushes an event and stops once the loop is gone.
fn forward(
    tx: UnboundedSender<AppEvent>,
    make: fn() -> AppEvent,
) -> impl FnMut() -> ControlFlow<()> + Send + 'static {
    move || {
        if tx.send(make()).is_ok() { ControlFlow::Continue(()) } else { ControlFlow::Break(()) }
    }
}
