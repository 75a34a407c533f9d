// ABOUTME: Run-length-encoded queue of pending (not-yet-audible) audio
// ABOUTME: Push merges equal-rate tails, pop splits runs mid-block

use std::collections::VecDeque;

/// A contiguous block of buffered frames all produced at one playback rate.
///
/// Rate `0.0` is silence or underrun padding, not real media content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Run {
    pub(crate) frames: i64,
    pub(crate) rate: f64,
}

/// Ordered sequence of [`Run`]s, oldest (soonest to be heard) first.
///
/// Equal-rate pushes merge into the tail run, so the length is bounded by
/// the number of buffered rate changes, not the number of callbacks.
#[derive(Debug, Default)]
pub(crate) struct PendingQueue {
    runs: VecDeque<Run>,
    total_frames: i64,
}

impl PendingQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Sum of frame counts over all runs, maintained incrementally.
    pub(crate) fn total_frames(&self) -> i64 {
        self.total_frames
    }

    /// Number of runs currently buffered.
    pub(crate) fn run_count(&self) -> usize {
        self.runs.len()
    }

    pub(crate) fn runs(&self) -> impl Iterator<Item = &Run> {
        self.runs.iter()
    }

    /// Append `frames` at `rate`, merging into an equal-rate tail run.
    pub(crate) fn push(&mut self, frames: i64, rate: f64) {
        debug_assert!(frames >= 0);
        if frames == 0 {
            return;
        }

        self.total_frames += frames;

        if let Some(tail) = self.runs.back_mut() {
            if tail.rate == rate {
                tail.frames += frames;
                return;
            }
        }

        self.runs.push_back(Run { frames, rate });
    }

    /// Remove `frames` from the front, splitting a run if the pop ends
    /// mid-run.
    pub(crate) fn pop(&mut self, frames: i64) {
        debug_assert!(frames >= 0 && frames <= self.total_frames);

        self.total_frames -= frames;

        let mut remaining = frames;
        while remaining > 0 {
            let front = self
                .runs
                .front_mut()
                .expect("pending queue drained below zero");
            let popped = front.frames.min(remaining);
            front.frames -= popped;
            if front.frames == 0 {
                self.runs.pop_front();
            }
            remaining -= popped;
        }
    }

    /// Rate-scaled frame count of the first `frames` buffered frames: each
    /// run contributes `frames × rate`, a partial run its prefix share.
    /// Multiplying by the sample period yields the media time those frames
    /// span.
    pub(crate) fn scaled_frames_in(&self, frames: i64) -> f64 {
        debug_assert!(frames <= self.total_frames);

        let mut remaining = frames;
        let mut scaled = 0.0;
        for run in &self.runs {
            if remaining <= 0 {
                break;
            }
            let counted = run.frames.min(remaining);
            scaled += counted as f64 * run.rate;
            remaining -= counted;
        }

        scaled
    }

    /// Debug-only consistency check: `total_frames` matches the run sum.
    pub(crate) fn check_total_invariant(&self) {
        if cfg!(debug_assertions) {
            let sum: i64 = self.runs.iter().map(|r| r.frames).sum();
            debug_assert_eq!(sum, self.total_frames);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_merges_equal_rate_tail() {
        let mut queue = PendingQueue::new();
        queue.push(100, 1.0);
        queue.push(50, 1.0);

        assert_eq!(queue.run_count(), 1);
        assert_eq!(queue.total_frames(), 150);

        queue.push(25, 2.0);
        assert_eq!(queue.run_count(), 2);
        assert_eq!(queue.total_frames(), 175);
    }

    #[test]
    fn test_push_zero_frames_is_noop() {
        let mut queue = PendingQueue::new();
        queue.push(0, 1.0);

        assert!(queue.is_empty());
        assert_eq!(queue.total_frames(), 0);
    }

    #[test]
    fn test_pop_splits_run() {
        let mut queue = PendingQueue::new();
        queue.push(100, 1.0);
        queue.push(100, 2.0);

        queue.pop(150);
        assert_eq!(queue.run_count(), 1);
        assert_eq!(queue.total_frames(), 50);
        assert_eq!(queue.runs().next().unwrap().rate, 2.0);

        queue.pop(50);
        assert!(queue.is_empty());
        assert_eq!(queue.total_frames(), 0);
    }

    #[test]
    fn test_scaled_frames_partial_run() {
        let mut queue = PendingQueue::new();
        queue.push(100, 0.0);
        queue.push(100, 2.0);

        // Silence contributes nothing, half the second run counts at 2x.
        assert_eq!(queue.scaled_frames_in(150), 100.0);
        assert_eq!(queue.scaled_frames_in(200), 200.0);
        assert_eq!(queue.scaled_frames_in(100), 0.0);
    }

    #[test]
    fn test_total_invariant_after_mixed_ops() {
        let mut queue = PendingQueue::new();
        queue.push(480, 1.0);
        queue.push(480, 1.0);
        queue.push(120, 0.0);
        queue.pop(700);
        queue.push(480, 0.5);

        queue.check_total_invariant();
        assert_eq!(queue.total_frames(), 480 + 480 + 120 - 700 + 480);
    }
}
