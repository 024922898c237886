//! Watch-funnel progress classification.
//!
//! The elapsed/duration ratio is mapped onto a small set of buckets. Within a
//! session the reported bucket only ever moves forward: `ProgressTracker`
//! drops backward moves (a rewind does not "un-reach" a quartile) and
//! coalesces repeats.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Discrete progress bucket, ordered from start to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressBucket {
    /// Nothing played yet (ratio exactly 0)
    Prepare,
    /// `(0, 0.25)`
    Impression,
    /// `[0.25, 0.5)`
    FirstQuartile,
    /// `[0.5, 0.75)`
    SecondQuartile,
    /// `[0.75, 1)`
    ThirdQuartile,
    /// `1` or end of media
    Completion,
}

/// Classify an elapsed/duration ratio. Returns `None` for NaN.
pub fn classify_ratio(ratio: f64) -> Option<ProgressBucket> {
    if ratio.is_nan() {
        return None;
    }
    let bucket = if ratio <= 0.0 {
        ProgressBucket::Prepare
    } else if ratio < 0.25 {
        ProgressBucket::Impression
    } else if ratio < 0.5 {
        ProgressBucket::FirstQuartile
    } else if ratio < 0.75 {
        ProgressBucket::SecondQuartile
    } else if ratio < 1.0 {
        ProgressBucket::ThirdQuartile
    } else {
        ProgressBucket::Completion
    };
    Some(bucket)
}

/// Classify an elapsed time against a total duration.
///
/// A zero duration cannot be classified.
pub fn classify(elapsed: Duration, duration: Duration) -> Option<ProgressBucket> {
    if duration.is_zero() {
        return None;
    }
    classify_ratio(elapsed.as_secs_f64() / duration.as_secs_f64())
}

/// Monotonic bucket state for one session.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    current: ProgressBucket,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            current: ProgressBucket::Prepare,
        }
    }

    pub fn current(&self) -> ProgressBucket {
        self.current
    }

    /// Offer a freshly classified bucket; returns it only if it moves forward.
    pub fn advance(&mut self, bucket: ProgressBucket) -> Option<ProgressBucket> {
        if bucket > self.current {
            self.current = bucket;
            Some(bucket)
        } else {
            None
        }
    }

    /// End of media was reported; completion is emitted once at most.
    pub fn complete(&mut self) -> Option<ProgressBucket> {
        self.advance(ProgressBucket::Completion)
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LatchState {
    Idle,
    Armed,
    Fired,
}

/// One-shot minimum-viewable-duration latch.
///
/// Armed by the first progress callback of a session, fired once by the
/// delayed timer. Neither step can repeat.
#[derive(Debug, Clone)]
pub struct ViewabilityLatch {
    state: LatchState,
}

impl ViewabilityLatch {
    pub fn new() -> Self {
        Self {
            state: LatchState::Idle,
        }
    }

    /// Returns `true` only on the first call; the caller starts the timer then.
    pub fn arm(&mut self) -> bool {
        if self.state == LatchState::Idle {
            self.state = LatchState::Armed;
            true
        } else {
            false
        }
    }

    /// Returns `true` only when an armed latch fires for the first time.
    pub fn fire(&mut self) -> bool {
        if self.state == LatchState::Armed {
            self.state = LatchState::Fired;
            true
        } else {
            false
        }
    }

    pub fn has_fired(&self) -> bool {
        self.state == LatchState::Fired
    }
}

impl Default for ViewabilityLatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_boundaries_are_half_open() {
        assert_eq!(classify_ratio(0.0), Some(ProgressBucket::Prepare));
        assert_eq!(classify_ratio(0.01), Some(ProgressBucket::Impression));
        assert_eq!(classify_ratio(0.25), Some(ProgressBucket::FirstQuartile));
        assert_eq!(classify_ratio(0.4999), Some(ProgressBucket::FirstQuartile));
        assert_eq!(classify_ratio(0.5), Some(ProgressBucket::SecondQuartile));
        assert_eq!(classify_ratio(0.75), Some(ProgressBucket::ThirdQuartile));
        assert_eq!(classify_ratio(0.999), Some(ProgressBucket::ThirdQuartile));
        assert_eq!(classify_ratio(1.0), Some(ProgressBucket::Completion));
        assert_eq!(classify_ratio(1.2), Some(ProgressBucket::Completion));
        assert_eq!(classify_ratio(f64::NAN), None);
    }

    #[test]
    fn classify_against_duration() {
        let total = Duration::from_secs(40);
        assert_eq!(
            classify(Duration::from_secs(10), total),
            Some(ProgressBucket::FirstQuartile)
        );
        assert_eq!(classify(Duration::from_secs(1), Duration::ZERO), None);
    }

    #[test]
    fn tracker_never_moves_backward() {
        let mut t = ProgressTracker::new();
        assert_eq!(
            t.advance(ProgressBucket::SecondQuartile),
            Some(ProgressBucket::SecondQuartile)
        );
        assert_eq!(t.advance(ProgressBucket::Impression), None);
        assert_eq!(t.advance(ProgressBucket::SecondQuartile), None);
        assert_eq!(t.current(), ProgressBucket::SecondQuartile);
        assert_eq!(t.complete(), Some(ProgressBucket::Completion));
        assert_eq!(t.complete(), None);
    }

    #[test]
    fn viewability_latch_is_one_shot() {
        let mut l = ViewabilityLatch::new();
        assert!(!l.fire());
        assert!(l.arm());
        assert!(!l.arm());
        assert!(l.fire());
        assert!(!l.fire());
        assert!(l.has_fired());
    }
}
