//! The media-engine seam.
//!
//! The engine is an opaque collaborator: it loads a locator, plays, pauses,
//! seeks and reports what happens through an `EngineSink`. Every sink is
//! bound to the session that created it, so signals from a replaced source
//! can never reach the state of the current one.

use crate::event::{Event, EventSender};
use crate::seek::SeekTicket;
use crate::session::SessionId;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// How precisely a seek must land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeekTolerance {
    /// Engine may land on a nearby keyframe
    #[default]
    Tolerant,
    /// Frame-accurate
    Exact,
}

/// Signals an engine reports back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Buffer is likely to keep up with playback
    LikelyToKeepUp(bool),
    /// Item is ready to play
    ReadyToPlay(bool),
    /// Playback rate changed; 0 means not playing
    RateChanged(f32),
    /// Periodic position callback (about 1 Hz)
    PeriodicTime(Duration),
    /// End of media reached
    PlayedToEnd,
    /// Playback buffer ran dry
    Stalled,
    /// Unrecoverable failure
    Failed(String),
    /// Mute flag changed
    MuteChanged(bool),
    /// A seek finished; `finished == false` means the engine gave up on it
    SeekCompleted { ticket: SeekTicket, finished: bool },
}

/// Session-bound outlet for engine signals.
#[derive(Debug, Clone)]
pub struct EngineSink {
    tx: EventSender,
    session: SessionId,
}

impl EngineSink {
    pub(crate) fn new(tx: EventSender, session: SessionId) -> Self {
        Self { tx, session }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Queue a signal. Returns `false` if the controller is gone.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx.post(Event::Engine {
            session: self.session,
            event,
        })
    }
}

/// One-shot continuation handed to the engine with every seek.
#[derive(Debug)]
#[must_use = "a seek that is never completed leaves the player seeking"]
pub struct SeekCompletion {
    sink: EngineSink,
    ticket: SeekTicket,
}

impl SeekCompletion {
    pub(crate) fn new(sink: EngineSink, ticket: SeekTicket) -> Self {
        Self { sink, ticket }
    }

    pub fn ticket(&self) -> SeekTicket {
        self.ticket
    }

    /// Report the outcome of the seek. Consumes the continuation.
    pub fn complete(self, finished: bool) {
        self.sink.emit(EngineEvent::SeekCompleted {
            ticket: self.ticket,
            finished,
        });
    }
}

/// A loaded source. Dropping it releases the engine's hold on the source.
pub trait MediaItem: Send {
    fn play(&mut self);

    fn pause(&mut self);

    /// Start a seek; the engine must eventually call `completion.complete`.
    fn seek(&mut self, target: Duration, tolerance: SeekTolerance, completion: SeekCompletion);

    fn set_muted(&mut self, muted: bool);

    fn is_muted(&self) -> bool;

    fn current_time(&self) -> Duration;

    /// Total duration, once known
    fn duration(&self) -> Option<Duration>;

    /// Current playback rate
    fn rate(&self) -> f32;
}

/// Core trait for media engine implementations
pub trait MediaEngine: Send {
    /// Load a source. Signals for the new item must go through `sink`.
    fn load(&mut self, locator: &Url, sink: EngineSink) -> Result<Box<dyn MediaItem>>;
}
