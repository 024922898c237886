//! Platform notifications (audio session, app lifecycle).
//!
//! These are not state of their own: each one maps to at most one of the two
//! public commands, guarded by the current status.

use crate::status::PlaybackStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    InterruptionBegan,
    InterruptionEnded,
    RouteChanged,
    EnteredBackground,
    EnteredForeground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeAction {
    Play,
    Pause,
}

/// Decide what a notification does in `status`.
pub fn bridge(notification: Notification, status: PlaybackStatus) -> Option<BridgeAction> {
    use Notification::*;
    use PlaybackStatus::{Pause, Playing};

    match (notification, status) {
        (InterruptionBegan, Playing) => Some(BridgeAction::Pause),
        (InterruptionEnded, _) => Some(BridgeAction::Play),
        (RouteChanged, Playing) => Some(BridgeAction::Play),
        (EnteredBackground, Playing) => Some(BridgeAction::Pause),
        (EnteredForeground, Pause) => Some(BridgeAction::Play),
        _ => None,
    }
}
