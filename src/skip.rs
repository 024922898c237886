//! One-shot "skip now allowed" latch.
//!
//! The gate counts playing time from the periodic position callbacks. Jumps
//! between two samples larger than `MAX_SAMPLE_STEP` are seeks, not playback,
//! and are not counted.

use std::time::Duration;

/// Largest position advance between two samples that still counts as playback.
pub const MAX_SAMPLE_STEP: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct SkipGate {
    threshold: Option<Duration>,
    played: Duration,
    last_position: Option<Duration>,
    fired: bool,
}

impl SkipGate {
    /// `None`, negative, non-finite or out-of-range thresholds disable the
    /// gate.
    pub fn new(threshold_secs: Option<f64>) -> Self {
        let threshold = threshold_secs
            .filter(|s| *s >= 0.0)
            .and_then(|s| Duration::try_from_secs_f64(s).ok());
        Self {
            threshold,
            played: Duration::ZERO,
            last_position: None,
            fired: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.threshold.is_some()
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn played(&self) -> Duration {
        self.played
    }

    /// Feed one position sample. Returns `true` exactly once, on the sample
    /// that carries cumulative playing time to the threshold.
    pub fn observe(&mut self, position: Duration, playing: bool) -> bool {
        let Some(threshold) = self.threshold else {
            return false;
        };
        if self.fired {
            return false;
        }

        if let Some(last) = self.last_position {
            if playing && position > last {
                let step = position - last;
                if step <= MAX_SAMPLE_STEP {
                    self.played += step;
                }
            }
        }
        self.last_position = Some(position);

        if playing && self.played >= threshold {
            self.fired = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn fires_once_after_threshold() {
        let mut gate = SkipGate::new(Some(2.0));
        assert!(!gate.observe(secs(0), true));
        assert!(!gate.observe(secs(1), true));
        assert!(gate.observe(secs(2), true));
        assert!(!gate.observe(secs(3), true));
        assert!(gate.has_fired());
    }

    #[test]
    fn disabled_gate_never_fires() {
        for t in [None, Some(-1.0), Some(f64::NAN), Some(f64::INFINITY), Some(1e20)] {
            let mut gate = SkipGate::new(t);
            assert!(!gate.is_enabled());
            for s in 0..10 {
                assert!(!gate.observe(secs(s), true));
            }
        }
    }

    #[test]
    fn zero_threshold_fires_on_first_playing_sample() {
        let mut gate = SkipGate::new(Some(0.0));
        assert!(!gate.observe(secs(0), false));
        assert!(gate.observe(secs(0), true));
    }

    #[test]
    fn seek_jumps_and_paused_samples_do_not_count() {
        let mut gate = SkipGate::new(Some(3.0));
        gate.observe(secs(0), true);
        gate.observe(secs(30), true);
        assert_eq!(gate.played(), Duration::ZERO);
        gate.observe(secs(31), false);
        assert_eq!(gate.played(), Duration::ZERO);
        gate.observe(secs(32), true);
        gate.observe(secs(33), true);
        assert!(!gate.has_fired());
        assert!(gate.observe(secs(34), true));
    }
}
