//! Control adapters: pluggable UI surfaces bound to the controller.
//!
//! An adapter is one value implementing `Control` plus whichever capability
//! interfaces it supports. The registry asks for each capability once at
//! registration and indexes the adapter by what it can do, so dispatch never
//! depends on the adapter's concrete type.

pub mod link;
pub mod recording;
pub mod registry;

pub use link::{ControlAction, PlayerLink};
pub use recording::{ControlLog, RecordingControl};
pub use registry::ControlRegistry;

use crate::status::Categories;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Registry-assigned adapter identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdapterId(pub(crate) u64);

impl AdapterId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Elapsed, total and remaining time for time-display sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackTimes {
    pub current: Duration,
    pub total: Duration,
    pub remaining: Duration,
}

impl PlaybackTimes {
    /// `current` is clamped to `total`.
    pub fn new(current: Duration, total: Duration) -> Self {
        let current = current.min(total);
        Self {
            current,
            total,
            remaining: total.saturating_sub(current),
        }
    }

    /// Elapsed fraction, 0..1 (0 for an empty total).
    pub fn fraction(&self) -> f64 {
        if self.total.is_zero() {
            0.0
        } else {
            self.current.as_secs_f64() / self.total.as_secs_f64()
        }
    }
}

/// Current/total/remaining labels.
pub trait TimeDisplay {
    fn show_times(&mut self, times: PlaybackTimes);
}

/// A draggable position control.
pub trait ScrubControl {
    /// The user is holding the control; position pushes are suppressed.
    fn is_dragging(&self) -> bool;

    fn show_position(&mut self, fraction: f64);
}

pub trait MuteIndicator {
    fn show_muted(&mut self, muted: bool);
}

/// Skip-to-end control, shown only once the skip gate has fired.
pub trait SkipControl {
    fn set_skip_visible(&mut self, visible: bool);
}

/// Base interface every adapter implements.
pub trait Control: Send {
    /// Statuses in which the adapter is shown
    fn categories(&self) -> Categories;

    fn set_visible(&mut self, visible: bool);

    /// Whether the adapter wants a `PlayerLink` injected at registration
    fn needs_player(&self) -> bool {
        false
    }

    fn attach(&mut self, _link: PlayerLink) {}

    fn time_display(&mut self) -> Option<&mut dyn TimeDisplay> {
        None
    }

    fn scrub(&mut self) -> Option<&mut dyn ScrubControl> {
        None
    }

    fn mute_indicator(&mut self) -> Option<&mut dyn MuteIndicator> {
        None
    }

    fn skip_control(&mut self) -> Option<&mut dyn SkipControl> {
        None
    }
}

bitflags! {
    /// What an adapter can do, as discovered at registration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const TIME = 1 << 0;
        const SCRUB = 1 << 1;
        const MUTE = 1 << 2;
        const SKIP = 1 << 3;
        const LINK = 1 << 4;
    }
}

impl Capabilities {
    pub fn probe(control: &mut dyn Control) -> Self {
        let mut caps = Capabilities::empty();
        caps.set(Capabilities::TIME, control.time_display().is_some());
        caps.set(Capabilities::SCRUB, control.scrub().is_some());
        caps.set(Capabilities::MUTE, control.mute_indicator().is_some());
        caps.set(Capabilities::SKIP, control.skip_control().is_some());
        caps.set(Capabilities::LINK, control.needs_player());
        caps
    }
}

/// A named control handed to the registry.
pub struct ControlAdapter {
    name: String,
    control: Box<dyn Control>,
}

impl ControlAdapter {
    pub fn new(name: impl Into<String>, control: impl Control + 'static) -> Self {
        Self {
            name: name.into(),
            control: Box::new(control),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn categories(&self) -> Categories {
        self.control.categories()
    }

    pub(crate) fn control_mut(&mut self) -> &mut dyn Control {
        self.control.as_mut()
    }
}

impl std::fmt::Debug for ControlAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlAdapter")
            .field("name", &self.name)
            .field("categories", &self.control.categories())
            .finish()
    }
}

/// Discrete taps relayed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerEventKind {
    Closed,
    ContentTapped,
}

/// Outbound event carrying the adapter's opaque context payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEvent {
    pub kind: PlayerEventKind,
    pub adapter: AdapterId,
    pub context: Option<serde_json::Value>,
}
