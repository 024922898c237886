//! RFox Player Controller
//!
//! A reactive playback controller that sits between an asynchronous media
//! engine and a dynamic set of UI control adapters.
//!
//! # Features
//!
//! - **Status state machine**: de-duplicated `PlaybackStatus` stream driven by
//!   engine signals, host commands and platform notifications
//! - **Progress funnel**: monotonic quartile buckets plus a one-shot
//!   viewability signal
//! - **Seek serialization**: last-writer-wins seeks with explicit landing
//!   policy
//! - **Capability-based adapters**: controls declare what they can show and
//!   which statuses they are visible in
//!
//! # Example
//!
//! ```no_run
//! use rfplayer::sim::{SimConfig, SimulatedEngine};
//! use rfplayer::{Player, PlayerConfig};
//!
//! # async fn demo() -> rfplayer::Result<()> {
//! let config = PlayerConfig {
//!     autoplay: true,
//!     skip_after_secs: Some(5.0),
//!     ..Default::default()
//! };
//!
//! let engine = SimulatedEngine::new(SimConfig::default());
//! let remote = engine.remote();
//! let player = Player::spawn(engine, config)?;
//! let mut status = player.subscribe_status();
//!
//! player.set_source("https://media.example/clip.m3u8").await?;
//! remote.tick();
//! while let Some(s) = status.recv().await {
//!     println!("status: {}", s);
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod error;
pub use error::{Error, Result};

pub mod engine;
pub mod event;
pub mod notify;
pub mod progress;
pub mod seek;
pub mod session;
pub mod skip;
pub mod status;
pub mod stream;

pub mod controls;

pub mod controller;

// Async-friendly player handle (controller loop on a tokio task)
pub mod async_api;

// Deterministic engine for tests, demos and the CLI
#[cfg(feature = "sim")]
pub mod sim;

pub use async_api::Player;
pub use controller::Controller;
pub use controls::{
    AdapterId, Capabilities, Control, ControlAction, ControlAdapter, PlaybackTimes, PlayerEvent,
    PlayerEventKind, PlayerLink,
};
pub use engine::{EngineEvent, EngineSink, MediaEngine, MediaItem, SeekCompletion, SeekTolerance};
pub use event::{ManualScheduler, Scheduler, TokioScheduler};
pub use notify::Notification;
pub use progress::ProgressBucket;
pub use seek::{Landing, SeekRequest, SeekTarget};
pub use session::SessionId;
pub use status::{Categories, PlaybackStatus};

/// Configuration for the player controller
///
/// Defaults mirror a typical inline player: no autoplay, unmuted, no skip
/// gate, viewability after one second and ten-second forward/rewind steps.
///
/// # Examples
///
/// ```
/// let cfg = rfplayer::PlayerConfig::default();
/// assert!(!cfg.autoplay);
/// assert_eq!(cfg.viewable_delay_ms, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Start playback as soon as the session is ready
    pub autoplay: bool,
    /// One-shot start position (fraction 0..1) for the next source
    pub start_offset: f64,
    /// Initial engine mute flag for each session
    pub muted: bool,
    /// Seconds of playback before skip is allowed; `None` or negative disables
    pub skip_after_secs: Option<f64>,
    /// Delay after the first progress callback before `viewable` fires
    pub viewable_delay_ms: u64,
    /// Forward/rewind step in seconds
    pub step_secs: f64,
    /// Mark the session failed if a seek has not landed after this long.
    /// `None` leaves a seek whose completion fails in `seeking`.
    pub seek_timeout_ms: Option<u64>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            autoplay: false,
            start_offset: 0.0,
            muted: false,
            skip_after_secs: None,
            viewable_delay_ms: 1000,
            step_secs: 10.0,
            seek_timeout_ms: None,
        }
    }
}

impl PlayerConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.start_offset) {
            return Err(Error::ConfigError(format!(
                "start_offset must be within 0..1, got {}",
                self.start_offset
            )));
        }
        if !self.step_secs.is_finite() || self.step_secs <= 0.0 {
            return Err(Error::ConfigError(format!(
                "step_secs must be a positive number, got {}",
                self.step_secs
            )));
        }
        if self.viewable_delay_ms == 0 {
            return Err(Error::ConfigError(
                "viewable_delay_ms must be non-zero".to_string(),
            ));
        }
        if self.seek_timeout_ms == Some(0) {
            return Err(Error::ConfigError(
                "seek_timeout_ms must be non-zero when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Point-in-time view of the controller, for hosts and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub source: Option<String>,
    pub session: Option<SessionId>,
    pub status: PlaybackStatus,
    pub progress: ProgressBucket,
    pub muted: bool,
    pub position_secs: f64,
    pub total_secs: Option<f64>,
    pub skip_allowed: bool,
    /// Number of registered adapters
    pub adapters: usize,
}

/// Create a synchronous controller over the simulated engine.
///
/// Timers go through a `ManualScheduler`, so the whole session is driven by
/// hand: tick the remote, advance the clock, `pump` the controller.
#[cfg(feature = "sim")]
pub fn new_player(
    config: PlayerConfig,
    sim: sim::SimConfig,
) -> Result<(Controller, sim::SimRemote, ManualScheduler)> {
    let engine = sim::SimulatedEngine::new(sim);
    let remote = engine.remote();
    let clock = ManualScheduler::new();
    let controller = Controller::new(engine, config, clock.clone())?;
    Ok((controller, remote, clock))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert!(!config.autoplay);
        assert_eq!(config.step_secs, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config = PlayerConfig::from_json_str(r#"{"autoplay": true, "skip_after_secs": 5}"#)
            .unwrap();
        assert!(config.autoplay);
        assert_eq!(config.skip_after_secs, Some(5.0));
        assert_eq!(config.viewable_delay_ms, 1000);
    }

    #[test]
    fn test_config_rejects_out_of_range_offset() {
        let err = PlayerConfig::from_json_str(r#"{"start_offset": 1.5}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
        assert!(matches!(
            PlayerConfig::from_json_str("not json"),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_config_rejects_bad_step() {
        let config = PlayerConfig {
            step_secs: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
