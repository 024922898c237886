//! Per-source playback session.
//!
//! A session is created whenever a source is assigned and thrown away when
//! the next one replaces it. All one-shot state (viewability, skip gate,
//! start offset, seek tickets) lives here so a reload always starts clean.

use crate::controls::PlaybackTimes;
use crate::engine::MediaItem;
use crate::progress::{ProgressTracker, ViewabilityLatch};
use crate::seek::SeekCoordinator;
use crate::skip::SkipGate;
use crate::PlayerConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub(crate) u64);

impl SessionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub struct PlaybackSession {
    pub id: SessionId,
    pub source: String,
    /// `None` when the source could not be loaded
    pub item: Option<Box<dyn MediaItem>>,
    pub total_duration: Option<Duration>,
    pub position: Duration,
    pub autoplay: bool,
    pub muted: bool,
    pub keep_up: bool,
    pub ready_to_play: bool,
    pub progress: ProgressTracker,
    pub viewability: ViewabilityLatch,
    pub skip_gate: SkipGate,
    pub seeks: SeekCoordinator,
    start_offset: f64,
}

impl PlaybackSession {
    pub fn new(id: SessionId, source: &str, config: &PlayerConfig, start_offset: f64) -> Self {
        Self {
            id,
            source: source.to_string(),
            item: None,
            total_duration: None,
            position: Duration::ZERO,
            autoplay: config.autoplay,
            muted: config.muted,
            keep_up: false,
            ready_to_play: false,
            progress: ProgressTracker::new(),
            viewability: ViewabilityLatch::new(),
            skip_gate: SkipGate::new(config.skip_after_secs),
            seeks: SeekCoordinator::new(),
            start_offset,
        }
    }

    /// Engine reports both keep-up and ready-to-play.
    pub fn is_playable(&self) -> bool {
        self.keep_up && self.ready_to_play
    }

    /// Record the total duration. Only the first non-zero value sticks.
    pub fn set_total_duration(&mut self, total: Duration) -> bool {
        if self.total_duration.is_some() || total.is_zero() {
            return false;
        }
        self.total_duration = Some(total);
        true
    }

    /// Pick up the duration from the engine if it is still unknown.
    pub fn refresh_total_duration(&mut self) -> bool {
        if self.total_duration.is_some() {
            return false;
        }
        match self.item.as_ref().and_then(|item| item.duration()) {
            Some(total) => self.set_total_duration(total),
            None => false,
        }
    }

    pub fn pending_start_offset(&self) -> f64 {
        self.start_offset
    }

    pub fn set_start_offset(&mut self, offset: f64) {
        self.start_offset = offset;
    }

    /// Consume the start offset. Yields it once if positive, then resets it.
    pub fn take_start_offset(&mut self) -> Option<f64> {
        let offset = std::mem::take(&mut self.start_offset);
        (offset > 0.0).then_some(offset)
    }

    pub fn times(&self) -> Option<PlaybackTimes> {
        self.total_duration
            .map(|total| PlaybackTimes::new(self.position, total))
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("loaded", &self.item.is_some())
            .field("total_duration", &self.total_duration)
            .field("position", &self.position)
            .finish()
    }
}
