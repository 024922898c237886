//! The back-reference adapters use to talk to the player.

use super::AdapterId;
use crate::event::{Event, EventSender};
use log::debug;

/// Adapter-originated actions.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    Play,
    Pause,
    ToggleMute,
    Forward,
    Rewind,
    Skip,
    /// Scrub moved while dragging (preview only)
    ScrubChanged(f64),
    /// Scrub released; seek to this fraction
    ScrubReleased(f64),
    Closed(Option<serde_json::Value>),
    ContentTapped(Option<serde_json::Value>),
}

/// Handle injected into adapters that ask for one.
///
/// Every call queues one event for the controller and returns immediately.
#[derive(Debug, Clone)]
pub struct PlayerLink {
    tx: EventSender,
    adapter: AdapterId,
}

impl PlayerLink {
    pub(crate) fn new(tx: EventSender, adapter: AdapterId) -> Self {
        Self { tx, adapter }
    }

    pub fn adapter(&self) -> AdapterId {
        self.adapter
    }

    pub fn send(&self, action: ControlAction) {
        let posted = self.tx.post(Event::Control {
            adapter: self.adapter,
            action,
        });
        if !posted {
            debug!("Adapter {:?}: player is gone, action dropped", self.adapter);
        }
    }

    pub fn play(&self) {
        self.send(ControlAction::Play);
    }

    pub fn pause(&self) {
        self.send(ControlAction::Pause);
    }

    pub fn toggle_mute(&self) {
        self.send(ControlAction::ToggleMute);
    }

    pub fn forward(&self) {
        self.send(ControlAction::Forward);
    }

    pub fn rewind(&self) {
        self.send(ControlAction::Rewind);
    }

    pub fn skip(&self) {
        self.send(ControlAction::Skip);
    }

    pub fn scrub_changed(&self, fraction: f64) {
        self.send(ControlAction::ScrubChanged(fraction));
    }

    pub fn scrub_released(&self, fraction: f64) {
        self.send(ControlAction::ScrubReleased(fraction));
    }

    pub fn close(&self, context: Option<serde_json::Value>) {
        self.send(ControlAction::Closed(context));
    }

    pub fn content_tapped(&self, context: Option<serde_json::Value>) {
        self.send(ControlAction::ContentTapped(context));
    }
}
