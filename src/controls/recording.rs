//! In-memory control that records what the controller pushes to it.
//!
//! Useful for tests, demos and headless hosts. Clones share one log, so a
//! clone can be registered while the original is kept for inspection.

use super::{
    Capabilities, Control, MuteIndicator, PlaybackTimes, PlayerLink, ScrubControl, SkipControl,
    TimeDisplay,
};
use crate::status::Categories;
use parking_lot::Mutex;
use std::sync::Arc;

/// Everything a `RecordingControl` has been told so far.
#[derive(Debug, Clone, Default)]
pub struct ControlLog {
    /// Latest visibility, `None` until first set
    pub visible: Option<bool>,
    /// Every `set_visible` call, in order
    pub visibility: Vec<bool>,
    pub times: Vec<PlaybackTimes>,
    pub positions: Vec<f64>,
    pub muted: Vec<bool>,
    pub skip_visible: Vec<bool>,
    pub link: Option<PlayerLink>,
    pub dragging: bool,
}

#[derive(Debug, Clone)]
pub struct RecordingControl {
    categories: Categories,
    caps: Capabilities,
    log: Arc<Mutex<ControlLog>>,
}

impl RecordingControl {
    pub fn new(categories: Categories) -> Self {
        Self {
            categories,
            caps: Capabilities::empty(),
            log: Arc::new(Mutex::new(ControlLog::default())),
        }
    }

    pub fn with_time_display(mut self) -> Self {
        self.caps |= Capabilities::TIME;
        self
    }

    pub fn with_scrub(mut self) -> Self {
        self.caps |= Capabilities::SCRUB;
        self
    }

    pub fn with_mute(mut self) -> Self {
        self.caps |= Capabilities::MUTE;
        self
    }

    pub fn with_skip(mut self) -> Self {
        self.caps |= Capabilities::SKIP;
        self
    }

    pub fn with_link(mut self) -> Self {
        self.caps |= Capabilities::LINK;
        self
    }

    pub fn log(&self) -> ControlLog {
        self.log.lock().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.log.lock().visible.unwrap_or(false)
    }

    pub fn link(&self) -> Option<PlayerLink> {
        self.log.lock().link.clone()
    }

    /// Simulate the user holding (or letting go of) the scrub control.
    pub fn set_dragging(&self, dragging: bool) {
        self.log.lock().dragging = dragging;
    }

    pub fn clear(&self) {
        let mut log = self.log.lock();
        let link = log.link.take();
        let dragging = log.dragging;
        *log = ControlLog {
            link,
            dragging,
            ..ControlLog::default()
        };
    }
}

impl Control for RecordingControl {
    fn categories(&self) -> Categories {
        self.categories
    }

    fn set_visible(&mut self, visible: bool) {
        let mut log = self.log.lock();
        log.visible = Some(visible);
        log.visibility.push(visible);
    }

    fn needs_player(&self) -> bool {
        self.caps.contains(Capabilities::LINK)
    }

    fn attach(&mut self, link: PlayerLink) {
        self.log.lock().link = Some(link);
    }

    fn time_display(&mut self) -> Option<&mut dyn TimeDisplay> {
        if self.caps.contains(Capabilities::TIME) {
            Some(self)
        } else {
            None
        }
    }

    fn scrub(&mut self) -> Option<&mut dyn ScrubControl> {
        if self.caps.contains(Capabilities::SCRUB) {
            Some(self)
        } else {
            None
        }
    }

    fn mute_indicator(&mut self) -> Option<&mut dyn MuteIndicator> {
        if self.caps.contains(Capabilities::MUTE) {
            Some(self)
        } else {
            None
        }
    }

    fn skip_control(&mut self) -> Option<&mut dyn SkipControl> {
        if self.caps.contains(Capabilities::SKIP) {
            Some(self)
        } else {
            None
        }
    }
}

impl TimeDisplay for RecordingControl {
    fn show_times(&mut self, times: PlaybackTimes) {
        self.log.lock().times.push(times);
    }
}

impl ScrubControl for RecordingControl {
    fn is_dragging(&self) -> bool {
        self.log.lock().dragging
    }

    fn show_position(&mut self, fraction: f64) {
        self.log.lock().positions.push(fraction);
    }
}

impl MuteIndicator for RecordingControl {
    fn show_muted(&mut self, muted: bool) {
        self.log.lock().muted.push(muted);
    }
}

impl SkipControl for RecordingControl {
    fn set_skip_visible(&mut self, visible: bool) {
        self.log.lock().skip_visible.push(visible);
    }
}
