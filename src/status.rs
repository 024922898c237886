//! Playback status values and the category masks control adapters declare.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Where the player is in its lifecycle.
///
/// `Prepare` is the initial state of every session. `Finished` can only be
/// left through `play()` (which replays from zero) and `Failed` only by
/// assigning a new source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    Prepare,
    Ready,
    Playing,
    Pause,
    Seeking,
    Stalled,
    Finished,
    Failed,
}

impl PlaybackStatus {
    pub const ALL: [PlaybackStatus; 8] = [
        PlaybackStatus::Prepare,
        PlaybackStatus::Ready,
        PlaybackStatus::Playing,
        PlaybackStatus::Pause,
        PlaybackStatus::Seeking,
        PlaybackStatus::Stalled,
        PlaybackStatus::Finished,
        PlaybackStatus::Failed,
    ];

    /// The single-bit category for this status.
    pub fn category(self) -> Categories {
        match self {
            PlaybackStatus::Prepare => Categories::PREPARE,
            PlaybackStatus::Ready => Categories::READY,
            PlaybackStatus::Playing => Categories::PLAYING,
            PlaybackStatus::Pause => Categories::PAUSE,
            PlaybackStatus::Seeking => Categories::SEEKING,
            PlaybackStatus::Stalled => Categories::STALLED,
            PlaybackStatus::Finished => Categories::FINISHED,
            PlaybackStatus::Failed => Categories::FAILED,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackStatus::Prepare => "prepare",
            PlaybackStatus::Ready => "ready",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Pause => "pause",
            PlaybackStatus::Seeking => "seeking",
            PlaybackStatus::Stalled => "stalled",
            PlaybackStatus::Finished => "finished",
            PlaybackStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Set of statuses in which a control adapter is shown.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Categories: u16 {
        const PREPARE = 1 << 0;
        const READY = 1 << 1;
        const PLAYING = 1 << 2;
        const PAUSE = 1 << 3;
        const SEEKING = 1 << 4;
        const STALLED = 1 << 5;
        const FINISHED = 1 << 6;
        const FAILED = 1 << 7;
    }
}

impl Categories {
    /// Whether an adapter with this mask is visible in `status`.
    pub fn shows(self, status: PlaybackStatus) -> bool {
        self.contains(status.category())
    }
}

impl From<PlaybackStatus> for Categories {
    fn from(status: PlaybackStatus) -> Self {
        status.category()
    }
}

impl FromIterator<PlaybackStatus> for Categories {
    fn from_iter<I: IntoIterator<Item = PlaybackStatus>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Categories::empty(), |acc, s| acc | s.category())
    }
}

/// Current status with de-duplicated transitions.
#[derive(Debug, Clone)]
pub struct StatusCell {
    current: PlaybackStatus,
}

impl StatusCell {
    pub fn new() -> Self {
        Self {
            current: PlaybackStatus::Prepare,
        }
    }

    pub fn get(&self) -> PlaybackStatus {
        self.current
    }

    /// Move to `next`. Returns `false` (and changes nothing) when `next` is
    /// already the current status.
    pub fn set(&mut self, next: PlaybackStatus) -> bool {
        if self.current == next {
            return false;
        }
        self.current = next;
        true
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_has_a_distinct_category() {
        let all: Categories = PlaybackStatus::ALL.into_iter().collect();
        assert_eq!(all, Categories::all());
        for s in PlaybackStatus::ALL {
            assert_eq!(s.category().bits().count_ones(), 1);
        }
    }

    #[test]
    fn mask_shows_only_its_members() {
        let mask = Categories::PAUSE | Categories::READY;
        assert!(mask.shows(PlaybackStatus::Pause));
        assert!(mask.shows(PlaybackStatus::Ready));
        assert!(!mask.shows(PlaybackStatus::Playing));
        assert!(!Categories::empty().shows(PlaybackStatus::Prepare));
    }

    #[test]
    fn status_cell_dedupes() {
        let mut cell = StatusCell::new();
        assert!(!cell.set(PlaybackStatus::Prepare));
        assert!(cell.set(PlaybackStatus::Ready));
        assert!(!cell.set(PlaybackStatus::Ready));
        assert_eq!(cell.get(), PlaybackStatus::Ready);
    }

    #[test]
    fn status_serializes_snake_case() {
        let s = serde_json::to_string(&PlaybackStatus::Seeking).unwrap();
        assert_eq!(s, "\"seeking\"");
    }
}
