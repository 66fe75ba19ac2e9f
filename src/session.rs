//! Host side of a scan: picks the route, drives it, and turns every outcome
//! into a notice instead of an error.
//!
//! A session moves through `Idle → Scanning → Completed | Errored | Cancelled
//! → Idle`. Starting a new scan while one is running cancels the old one
//! first. Worker messages from a run the session no longer tracks are
//! dropped.

use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::error::AppError;
use crate::export::to_text;
use crate::model::{CategoryBuckets, ScanProgress, ScanSummary};
use crate::scanners::{
    Envelope, RunId, ScanOptions, ScanRequest, ScanRoute, SliceStep, SlicedScan, WorkerHandle,
    WorkerMessage,
};
use crate::utils::plural;

const WORKER_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning(ScanRoute),
    Completed,
    Errored,
    Cancelled,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanState::Idle => write!(f, "idle"),
            ScanState::Scanning(route) => write!(f, "scanning({route})"),
            ScanState::Completed => write!(f, "completed"),
            ScanState::Errored => write!(f, "errored"),
            ScanState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Terminal result of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed { buckets: CategoryBuckets, summary: ScanSummary },
    Errored(String),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Progress(ScanProgress),
    Finished(ScanOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A user-facing message produced by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into() }
    }
}

/// Text taken from the clipboard, and the route of the scan it started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastedInput {
    pub text: String,
    pub route: Option<ScanRoute>,
}

enum ActiveScan {
    Sliced(SlicedScan),
    Worker(WorkerHandle),
}

pub struct ScanSession<C: Clipboard> {
    options: ScanOptions,
    auto_extract: bool,
    auto_copy: bool,
    clipboard: C,
    state: ScanState,
    active: Option<ActiveScan>,
    input_was_empty: bool,
    progress: Option<ScanProgress>,
    last_result: Option<CategoryBuckets>,
    notices: Vec<Notice>,
    next_run: RunId,
    stale_messages: usize,
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
}

impl<C: Clipboard> ScanSession<C> {
    pub fn new(config: &Config, clipboard: C) -> Self {
        let mut session = Self::with_options(ScanOptions::from_config(config), clipboard);
        session.auto_extract = config.auto_extract;
        session.auto_copy = config.auto_copy;
        session
    }

    /// A session with auto-extract and auto-copy switched off.
    pub fn with_options(options: ScanOptions, clipboard: C) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            options,
            auto_extract: false,
            auto_copy: false,
            clipboard,
            state: ScanState::Idle,
            active: None,
            input_was_empty: false,
            progress: None,
            last_result: None,
            notices: Vec::new(),
            next_run: 0,
            stale_messages: 0,
            tx,
            rx,
        }
    }

    pub fn set_auto_extract(&mut self, enabled: bool) {
        self.auto_extract = enabled;
    }

    pub fn set_auto_copy(&mut self, enabled: bool) {
        self.auto_copy = enabled;
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_scanning(&self) -> bool {
        self.active.is_some()
    }

    pub fn progress(&self) -> Option<&ScanProgress> {
        self.progress.as_ref()
    }

    /// Buckets of the most recent completed scan, if it was not superseded.
    pub fn last_result(&self) -> Option<&CategoryBuckets> {
        self.last_result.as_ref()
    }

    /// Worker messages dropped because their run was no longer active.
    pub fn stale_messages(&self) -> usize {
        self.stale_messages
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Begin scanning `text`, cancelling any scan still in flight.
    pub fn start(&mut self, text: impl Into<String>) -> Result<ScanRoute, AppError> {
        if self.is_scanning() {
            self.cancel();
        }

        let text = text.into();
        let route = ScanRoute::for_input(text.len(), self.options.large_input_threshold);
        tracing::info!(bytes = text.len(), %route, "Scan started");

        self.last_result = None;
        self.input_was_empty = text.trim().is_empty();

        let active = match route {
            ScanRoute::Sliced => ActiveScan::Sliced(SlicedScan::new(&text, &self.options)),
            ScanRoute::Worker => {
                self.next_run += 1;
                let request = ScanRequest { text, chunk_size: self.options.chunk_size };
                match WorkerHandle::spawn(self.next_run, request, self.tx.clone()) {
                    Ok(handle) => ActiveScan::Worker(handle),
                    Err(err) => {
                        self.transition(ScanState::Errored);
                        self.notify(NoticeLevel::Error, format!("Could not start scan: {err}"));
                        self.transition(ScanState::Idle);
                        return Err(err);
                    }
                }
            }
        };

        self.active = Some(active);
        self.progress = Some(ScanProgress::started("Extracting emails..."));
        self.transition(ScanState::Scanning(route));
        Ok(route)
    }

    /// Auto-extract policy: scan on every input change that is cheap enough.
    ///
    /// Returns the route taken, or `None` when the change did not trigger a
    /// scan.
    pub fn input_changed(&mut self, text: &str) -> Result<Option<ScanRoute>, AppError> {
        if !self.auto_extract {
            return Ok(None);
        }
        if text.len() > self.options.large_input_threshold {
            tracing::debug!(bytes = text.len(), "Input too large for auto-extract");
            return Ok(None);
        }
        self.start(text).map(Some)
    }

    /// Replace the input with the clipboard contents and, when auto-extract
    /// is on, scan them straight away. Unlike `input_changed` there is no
    /// size guard; a large paste goes to the worker.
    pub fn paste_from_clipboard(&mut self) -> Result<PastedInput, AppError> {
        let text = match self.clipboard.read_text() {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "Paste failed");
                self.notify(NoticeLevel::Error, "Failed to paste from clipboard!");
                return Err(err);
            }
        };
        self.notify(NoticeLevel::Success, "Text pasted from clipboard!");

        let route = if self.auto_extract { Some(self.start(text.clone())?) } else { None };
        Ok(PastedInput { text, route })
    }

    /// Advance the active scan, waiting on the worker if necessary.
    pub fn next_event(&mut self) -> Option<SessionEvent> {
        self.drive(true)
    }

    /// Advance the active scan without ever blocking on the worker.
    pub fn poll_event(&mut self) -> Option<SessionEvent> {
        self.drive(false)
    }

    /// Start a scan and drive it to its terminal outcome.
    pub fn run_to_end(
        &mut self,
        text: impl Into<String>,
        on_progress: impl FnMut(&ScanProgress),
    ) -> Result<ScanOutcome, AppError> {
        self.start(text)?;
        Ok(self.wait_for_outcome(on_progress).unwrap_or(ScanOutcome::Cancelled))
    }

    /// Drive the active scan to its terminal outcome; `None` when idle.
    pub fn wait_for_outcome(
        &mut self,
        mut on_progress: impl FnMut(&ScanProgress),
    ) -> Option<ScanOutcome> {
        while let Some(event) = self.next_event() {
            match event {
                SessionEvent::Progress(progress) => on_progress(&progress),
                SessionEvent::Finished(outcome) => return Some(outcome),
            }
        }
        None
    }

    /// Abandon the active scan. Returns `false` when there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        if let ActiveScan::Worker(handle) = active {
            handle.terminate();
        }
        self.progress = None;
        self.transition(ScanState::Cancelled);
        self.notify(NoticeLevel::Info, "Scan cancelled.");
        self.transition(ScanState::Idle);
        true
    }

    fn drive(&mut self, block: bool) -> Option<SessionEvent> {
        match self.active.as_mut()? {
            ActiveScan::Sliced(scan) => match scan.step() {
                Some(SliceStep::Progress(progress)) => {
                    self.progress = Some(progress.clone());
                    Some(SessionEvent::Progress(progress))
                }
                Some(SliceStep::Done(buckets)) => {
                    Some(SessionEvent::Finished(self.complete(buckets)))
                }
                None => {
                    self.active = None;
                    None
                }
            },
            ActiveScan::Worker(handle) => {
                let run = handle.run();
                self.drive_worker(run, block)
            }
        }
    }

    fn drive_worker(&mut self, run: RunId, block: bool) -> Option<SessionEvent> {
        loop {
            let envelope = if block {
                match self.rx.recv_timeout(WORKER_POLL_INTERVAL) {
                    Ok(envelope) => envelope,
                    Err(RecvTimeoutError::Timeout) => {
                        if !self.worker_finished() {
                            continue;
                        }
                        // The worker may have sent its last message just before exiting.
                        match self.rx.try_recv() {
                            Ok(envelope) => envelope,
                            Err(_) => {
                                return Some(SessionEvent::Finished(
                                    self.fail("worker exited without a result".to_string()),
                                ));
                            }
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        return Some(SessionEvent::Finished(
                            self.fail("worker channel closed".to_string()),
                        ));
                    }
                }
            } else {
                match self.rx.try_recv() {
                    Ok(envelope) => envelope,
                    Err(_) => return None,
                }
            };

            if envelope.run != run {
                self.stale_messages += 1;
                tracing::debug!(
                    stale_run = envelope.run,
                    active_run = run,
                    "Dropped stale worker message"
                );
                continue;
            }

            return Some(match envelope.message {
                WorkerMessage::Progress { progress, processed } => {
                    let progress = ScanProgress {
                        percent: progress,
                        found: processed,
                        status: format!("Scanning in background, {processed} found"),
                    };
                    self.progress = Some(progress.clone());
                    SessionEvent::Progress(progress)
                }
                WorkerMessage::Complete { result, total_processed } => {
                    tracing::debug!(run, total_processed, "Worker result received");
                    SessionEvent::Finished(self.complete(result))
                }
                WorkerMessage::Error { error } => SessionEvent::Finished(self.fail(error)),
            });
        }
    }

    fn worker_finished(&self) -> bool {
        match &self.active {
            Some(ActiveScan::Worker(handle)) => handle.is_finished(),
            _ => true,
        }
    }

    fn complete(&mut self, buckets: CategoryBuckets) -> ScanOutcome {
        self.active = None;
        self.progress = None;
        self.transition(ScanState::Completed);

        let total = buckets.len();
        if total == 0 {
            let message = if self.input_was_empty {
                "No text to scan."
            } else {
                "No valid emails found in the text."
            };
            self.notify(NoticeLevel::Warning, message);
        } else if self.auto_copy {
            let blob = to_text(&buckets.combined());
            match self.clipboard.write_text(&blob) {
                Ok(()) => self.notify(
                    NoticeLevel::Success,
                    format!(
                        "Extracted {total} {} and copied to clipboard!",
                        plural(total, "email", "emails")
                    ),
                ),
                Err(err) => {
                    tracing::warn!(error = %err, "Auto-copy failed");
                    let noun = plural(total, "email", "emails");
                    self.notify(
                        NoticeLevel::Warning,
                        format!("Extracted {total} {noun} (copy failed)"),
                    );
                }
            }
        } else {
            self.notify(
                NoticeLevel::Success,
                format!("Extracted {total} unique {}!", plural(total, "email", "emails")),
            );
        }

        let summary = buckets.summary();
        self.last_result = Some(buckets.clone());
        self.transition(ScanState::Idle);
        ScanOutcome::Completed { buckets, summary }
    }

    fn fail(&mut self, error: String) -> ScanOutcome {
        // Dropping the handle stops a worker that is somehow still running.
        self.active = None;
        self.progress = None;
        tracing::error!(%error, "Scan failed");
        self.transition(ScanState::Errored);
        self.notify(NoticeLevel::Error, format!("Error processing text: {error}"));
        self.transition(ScanState::Idle);
        ScanOutcome::Errored(error)
    }

    fn transition(&mut self, next: ScanState) {
        tracing::debug!(from = %self.state, to = %next, "Scan state changed");
        self.state = next;
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice::new(level, message));
    }
}
