use std::collections::HashSet;
use std::fmt;

use crate::config::Config;
use crate::model::{CategoryBuckets, Provider};
use crate::pattern::{candidates, is_email_byte, is_valid_email};

pub mod sliced;
pub mod worker;

pub use sliced::{SliceStep, SlicedScan, YieldPolicy};
pub use worker::{Envelope, RunId, ScanRequest, WorkerHandle, WorkerMessage};

/// Which execution route a scan takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanRoute {
    /// Bounded slices on the calling thread.
    Sliced,
    /// A background worker thread reporting over a channel.
    Worker,
}

impl ScanRoute {
    pub fn for_input(len: usize, large_input_threshold: usize) -> Self {
        if len > large_input_threshold { ScanRoute::Worker } else { ScanRoute::Sliced }
    }
}

impl fmt::Display for ScanRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanRoute::Sliced => write!(f, "sliced"),
            ScanRoute::Worker => write!(f, "worker"),
        }
    }
}

/// Tuning shared by both scan routes.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub large_input_threshold: usize,
    pub chunk_size: usize,
    pub slice_size: usize,
    pub yield_policy: YieldPolicy,
}

impl ScanOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            large_input_threshold: config.large_input_threshold,
            chunk_size: config.chunk_size,
            slice_size: config.slice_size,
            yield_policy: YieldPolicy::default(),
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions::from_config(&Config::default())
    }
}

/// Lowercase and trim a raw candidate, keeping it only if it passes validation.
pub(crate) fn normalize(candidate: &str) -> Option<String> {
    let email = candidate.trim().to_ascii_lowercase();
    is_valid_email(&email).then_some(email)
}

/// Folds candidates into buckets, enforcing dedup and first-seen order.
#[derive(Debug, Default)]
pub(crate) struct BucketAccumulator {
    seen: HashSet<String>,
    buckets: CategoryBuckets,
}

impl BucketAccumulator {
    pub(crate) fn offer(&mut self, candidate: &str) -> bool {
        match normalize(candidate) {
            Some(email) => self.accept(email),
            None => false,
        }
    }

    /// Take an address that already went through [`normalize`].
    pub(crate) fn accept(&mut self, email: String) -> bool {
        if self.seen.contains(&email) {
            return false;
        }
        let provider = Provider::categorize(&email);
        self.seen.insert(email.clone());
        self.buckets.push(provider, email);
        true
    }

    pub(crate) fn found(&self) -> usize {
        self.seen.len()
    }

    pub(crate) fn finish(self) -> CategoryBuckets {
        self.buckets
    }
}

/// Scan `text` in one go on the current thread.
pub fn scan_text(text: &str) -> CategoryBuckets {
    let mut accumulator = BucketAccumulator::default();
    for candidate in candidates(text) {
        accumulator.offer(candidate);
    }
    accumulator.finish()
}

/// Split `text` into pieces of roughly `chunk_size` bytes without cutting a
/// candidate or a UTF-8 sequence.
pub(crate) fn chunk_bounds(text: &str, chunk_size: usize) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut bounds = Vec::new();
    let mut start = 0;
    while start < bytes.len() {
        let mut end = start.saturating_add(chunk_size.max(1)).min(bytes.len());
        while end < bytes.len() && (!text.is_char_boundary(end) || is_email_byte(bytes[end])) {
            end += 1;
        }
        bounds.push((start, end));
        start = end;
    }
    bounds
}
