use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::{CategoryBuckets, percent};
use crate::pattern::candidates;

use super::{BucketAccumulator, chunk_bounds, normalize};

/// Identifies one worker run within a session.
pub type RunId = u64;

/// The single message a worker receives, at spawn time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub text: String,
    pub chunk_size: usize,
}

/// Messages a worker sends back. Zero or more `Progress`, then exactly one
/// `Complete` or `Error`, unless the run was terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerMessage {
    Progress {
        progress: u8,
        processed: usize,
    },
    Complete {
        result: CategoryBuckets,
        #[serde(rename = "totalProcessed")]
        total_processed: usize,
    },
    Error {
        error: String,
    },
}

impl WorkerMessage {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerMessage::Progress { .. })
    }
}

/// A worker message tagged with the run that produced it.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub run: RunId,
    pub message: WorkerMessage,
}

/// Host-side handle to a running worker thread.
///
/// Dropping the handle stops a run that is still going: the worker quits at
/// its next chunk boundary and sends nothing further. Only `terminate`
/// counts as cancelling the run.
pub struct WorkerHandle {
    run: RunId,
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn spawn(
        run: RunId,
        request: ScanRequest,
        tx: Sender<Envelope>,
    ) -> Result<Self, AppError> {
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);

        let thread = thread::Builder::new().name(format!("mailsift-worker-{run}")).spawn(
            move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    run_worker(run, request, &tx, &worker_cancel);
                }));
                if result.is_err() && !worker_cancel.load(Ordering::SeqCst) {
                    tracing::error!(run, "Worker thread panicked");
                    let _ = tx.send(Envelope {
                        run,
                        message: WorkerMessage::Error {
                            error: "internal error: worker panicked".to_string(),
                        },
                    });
                }
            },
        )?;

        tracing::debug!(run, "Worker spawned");
        Ok(Self { run, cancel, thread: Some(thread) })
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the worker and detach from it. Any state it holds is discarded.
    pub fn terminate(mut self) {
        if !self.cancel.swap(true, Ordering::SeqCst) {
            tracing::debug!(run = self.run, "Worker terminated");
        }
        self.thread.take();
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        // After a terminal message the flag is never read again.
        self.cancel.store(true, Ordering::SeqCst);
    }
}

fn run_worker(run: RunId, request: ScanRequest, tx: &Sender<Envelope>, cancel: &AtomicBool) {
    let send = |message: WorkerMessage| tx.send(Envelope { run, message }).is_ok();

    if request.chunk_size == 0 {
        send(WorkerMessage::Error { error: "chunk size must be greater than zero".to_string() });
        return;
    }

    let text = request.text.as_str();
    let total = text.len();
    let mut accumulator = BucketAccumulator::default();

    for (start, end) in chunk_bounds(text, request.chunk_size) {
        if cancel.load(Ordering::SeqCst) {
            return;
        }

        let found: Vec<&str> = candidates(&text[start..end]).collect();
        let validated: Vec<Option<String>> = found.par_iter().map(|raw| normalize(raw)).collect();
        for email in validated.into_iter().flatten() {
            accumulator.accept(email);
        }

        let progress = WorkerMessage::Progress {
            progress: percent(end, total),
            processed: accumulator.found(),
        };
        if !send(progress) {
            // Host dropped its receiver.
            return;
        }
    }

    if cancel.load(Ordering::SeqCst) {
        return;
    }

    let total_processed = accumulator.found();
    tracing::debug!(run, total_processed, "Worker finished");
    send(WorkerMessage::Complete { result: accumulator.finish(), total_processed });
}
