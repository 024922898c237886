//! Seek serialization.
//!
//! Only one seek is tracked at a time. Every request gets a fresh ticket and
//! replaces whatever was in flight; completions carrying an older ticket are
//! stale and ignored.

use crate::engine::SeekTolerance;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to seek to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeekTarget {
    /// Fraction of the total duration, 0..1
    Fraction(f64),
    /// Absolute position
    Time(Duration),
}

/// Where the player lands once the engine confirms the seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landing {
    /// Resume playback (`play()`); the default
    Resume,
    /// Stay paused
    Paused,
    /// Land in `ready`; used by the start-offset seek
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeekRequest {
    pub target: SeekTarget,
    pub tolerance: SeekTolerance,
    pub landing: Landing,
}

impl SeekRequest {
    pub fn fraction(fraction: f64) -> Self {
        Self {
            target: SeekTarget::Fraction(fraction),
            tolerance: SeekTolerance::Tolerant,
            landing: Landing::Resume,
        }
    }

    pub fn time(position: Duration) -> Self {
        Self {
            target: SeekTarget::Time(position),
            tolerance: SeekTolerance::Tolerant,
            landing: Landing::Resume,
        }
    }

    /// Request a frame-accurate seek.
    pub fn exact(mut self) -> Self {
        self.tolerance = SeekTolerance::Exact;
        self
    }

    /// Land paused instead of resuming.
    pub fn paused(mut self) -> Self {
        self.landing = Landing::Paused;
        self
    }

    pub(crate) fn landing(mut self, landing: Landing) -> Self {
        self.landing = landing;
        self
    }

    /// Resolve the target against the known total duration, clamped to
    /// `[0, total]`. Fractions need a known total; times without one are only
    /// clamped from below.
    pub fn resolve(&self, total: Option<Duration>) -> Option<Duration> {
        match self.target {
            SeekTarget::Fraction(f) => {
                let total = total?;
                if !f.is_finite() {
                    return None;
                }
                Some(total.mul_f64(f.clamp(0.0, 1.0)))
            }
            SeekTarget::Time(t) => Some(match total {
                Some(total) => t.min(total),
                None => t,
            }),
        }
    }
}

/// Apply a signed delta in seconds to `current`, clamped to `[0, total]`.
pub fn offset_by(current: Duration, delta_secs: f64, total: Duration) -> Duration {
    let target = (current.as_secs_f64() + delta_secs).clamp(0.0, total.as_secs_f64());
    Duration::from_secs_f64(target)
}

/// Identifies one seek request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeekTicket(pub(crate) u64);

#[derive(Debug, Clone, Copy)]
struct InFlight {
    ticket: SeekTicket,
    landing: Landing,
    failed: bool,
}

/// Result of an engine completion, as seen by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOutcome {
    /// Superseded or unknown ticket
    Stale,
    /// Engine reported non-success; status stays `seeking`
    Failed,
    /// Seek done; apply the landing policy
    Landed(Landing),
}

#[derive(Debug, Default)]
pub struct SeekCoordinator {
    next: u64,
    in_flight: Option<InFlight>,
}

impl SeekCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new seek, superseding any in-flight one.
    pub fn begin(&mut self, landing: Landing) -> SeekTicket {
        self.next += 1;
        let ticket = SeekTicket(self.next);
        self.in_flight = Some(InFlight {
            ticket,
            landing,
            failed: false,
        });
        ticket
    }

    /// A seek is awaiting its engine completion.
    pub fn is_pending(&self) -> bool {
        matches!(self.in_flight, Some(f) if !f.failed)
    }

    /// Ticket of the latest seek that has not landed (pending or failed).
    pub fn current(&self) -> Option<SeekTicket> {
        self.in_flight.map(|f| f.ticket)
    }

    /// Ticket of a seek the engine reported as failed, if it is still current.
    pub fn failed(&self) -> Option<SeekTicket> {
        self.in_flight.filter(|f| f.failed).map(|f| f.ticket)
    }

    pub fn complete(&mut self, ticket: SeekTicket, finished: bool) -> SeekOutcome {
        let Some(f) = self
            .in_flight
            .as_mut()
            .filter(|f| f.ticket == ticket && !f.failed)
        else {
            return SeekOutcome::Stale;
        };
        if finished {
            let landing = f.landing;
            self.in_flight = None;
            SeekOutcome::Landed(landing)
        } else {
            f.failed = true;
            SeekOutcome::Failed
        }
    }

    /// Forget the current seek (used when it timed out).
    pub fn abandon(&mut self, ticket: SeekTicket) -> bool {
        if self.current() == Some(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }
}
