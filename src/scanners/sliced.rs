use std::thread;
use std::time::Duration;

use crate::model::{CategoryBuckets, ScanProgress, percent};
use crate::pattern::candidates;

use super::{BucketAccumulator, ScanOptions};

/// How a sliced scan hands the thread back between slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YieldPolicy {
    /// Pause after every slice; zero means a plain `yield_now`.
    pub slice_pause: Duration,
    /// Processed-candidate interval at which the longer pause kicks in.
    pub long_pause_every: usize,
    pub long_pause: Duration,
}

impl YieldPolicy {
    /// Never pause; used when nothing else shares the thread.
    pub fn none() -> Self {
        Self { slice_pause: Duration::ZERO, long_pause_every: 0, long_pause: Duration::ZERO }
    }
}

impl Default for YieldPolicy {
    fn default() -> Self {
        Self {
            slice_pause: Duration::ZERO,
            long_pause_every: 1000,
            long_pause: Duration::from_millis(1),
        }
    }
}

/// Result of advancing a [`SlicedScan`] by one slice.
#[derive(Debug)]
pub enum SliceStep {
    Progress(ScanProgress),
    Done(CategoryBuckets),
}

/// Small-input scan that validates candidates a bounded slice at a time.
///
/// The permissive pass runs up front; each [`step`](Self::step) then folds at
/// most `slice_size` candidates into the buckets. Dropping the scan abandons
/// it; nothing is surfaced for the slices already done.
pub struct SlicedScan {
    candidates: Vec<String>,
    cursor: usize,
    slice_size: usize,
    yield_policy: YieldPolicy,
    accumulator: BucketAccumulator,
    finished: bool,
}

impl SlicedScan {
    pub fn new(text: &str, options: &ScanOptions) -> Self {
        let candidates: Vec<String> = candidates(text).map(str::to_owned).collect();
        tracing::debug!(candidates = candidates.len(), "Sliced scan prepared");
        Self {
            candidates,
            cursor: 0,
            slice_size: options.slice_size.max(1),
            yield_policy: options.yield_policy,
            accumulator: BucketAccumulator::default(),
            finished: false,
        }
    }

    pub fn total(&self) -> usize {
        self.candidates.len()
    }

    pub fn processed(&self) -> usize {
        self.cursor
    }

    /// Process the next slice. Returns `None` once `Done` has been handed out.
    pub fn step(&mut self) -> Option<SliceStep> {
        if self.finished {
            return None;
        }

        if self.cursor >= self.candidates.len() {
            self.finished = true;
            let accumulator = std::mem::take(&mut self.accumulator);
            return Some(SliceStep::Done(accumulator.finish()));
        }

        let end = (self.cursor + self.slice_size).min(self.candidates.len());
        let before = self.cursor;
        for candidate in &self.candidates[before..end] {
            self.accumulator.offer(candidate);
        }
        self.cursor = end;
        self.pause(before, end);

        Some(SliceStep::Progress(ScanProgress {
            percent: percent(self.cursor, self.candidates.len()),
            found: self.accumulator.found(),
            status: format!("Validated {} of {} candidates", self.cursor, self.candidates.len()),
        }))
    }

    /// Drive the scan to the end, reporting each slice.
    pub fn run(mut self, mut on_progress: impl FnMut(&ScanProgress)) -> CategoryBuckets {
        loop {
            match self.step() {
                Some(SliceStep::Progress(progress)) => on_progress(&progress),
                Some(SliceStep::Done(buckets)) => return buckets,
                None => return CategoryBuckets::new(),
            }
        }
    }

    fn pause(&self, before: usize, after: usize) {
        let policy = self.yield_policy;
        let crossed_long_mark = policy.long_pause_every > 0
            && before / policy.long_pause_every != after / policy.long_pause_every;

        if crossed_long_mark && !policy.long_pause.is_zero() {
            thread::sleep(policy.long_pause);
        } else if policy.slice_pause.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(policy.slice_pause);
        }
    }
}
