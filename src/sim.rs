//! Deterministic in-memory media engine.
//!
//! `SimulatedEngine` is a `MediaEngine` with no decoding behind it: position
//! only moves when `SimRemote::tick` is called, and every engine signal can be
//! injected by hand. Tests, the CLI and the demos drive playback through it.

use crate::engine::{
    EngineEvent, EngineSink, MediaEngine, MediaItem, SeekCompletion, SeekTolerance,
};
use crate::{Error, Result};
use log::{debug, trace};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Behaviour knobs for the simulated engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Media length; `None` simulates a live or not-yet-known duration
    pub duration: Option<Duration>,
    /// Report keep-up and ready-to-play right after `load`
    pub ready_on_load: bool,
    /// Land seeks immediately instead of waiting for `complete_seek`
    pub auto_complete_seeks: bool,
    /// Locators `load` refuses
    pub rejected: Vec<String>,
    /// Position advance per `tick`
    pub tick: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            duration: Some(Duration::from_secs(30)),
            ready_on_load: true,
            auto_complete_seeks: true,
            rejected: Vec::new(),
            tick: Duration::from_secs(1),
        }
    }
}

struct PendingSeek {
    generation: u64,
    target: Duration,
    tolerance: SeekTolerance,
    completion: SeekCompletion,
}

struct SimState {
    config: SimConfig,
    generation: u64,
    sink: Option<EngineSink>,
    position: Duration,
    rate: f32,
    muted: bool,
    pending: VecDeque<PendingSeek>,
    loads: Vec<String>,
}

impl SimState {
    fn emit(&self, event: EngineEvent) {
        if let Some(sink) = self.sink.as_ref() {
            trace!("sim {} emits {:?}", sink.session(), event);
            sink.emit(event);
        }
    }

    fn set_rate(&mut self, rate: f32) {
        if self.rate != rate {
            self.rate = rate;
            self.emit(EngineEvent::RateChanged(rate));
        }
    }
}

type Shared = Arc<Mutex<SimState>>;

/// The engine side: hands out one `SimulatedMedia` per load.
pub struct SimulatedEngine {
    state: Shared,
}

impl SimulatedEngine {
    pub fn new(config: SimConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                config,
                generation: 0,
                sink: None,
                position: Duration::ZERO,
                rate: 0.0,
                muted: false,
                pending: VecDeque::new(),
                loads: Vec::new(),
            })),
        }
    }

    /// Handle for driving the engine from outside the controller.
    pub fn remote(&self) -> SimRemote {
        SimRemote {
            state: self.state.clone(),
        }
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl MediaEngine for SimulatedEngine {
    fn load(&mut self, locator: &Url, sink: EngineSink) -> Result<Box<dyn MediaItem>> {
        let mut state = self.state.lock();
        state.loads.push(locator.to_string());
        if state.config.rejected.iter().any(|r| r == locator.as_str()) {
            return Err(Error::EngineFailure(format!("cannot open {}", locator)));
        }

        state.generation += 1;
        state.position = Duration::ZERO;
        state.rate = 0.0;
        state.sink = Some(sink);
        debug!("sim loaded {} (generation {})", locator, state.generation);

        if state.config.ready_on_load {
            state.emit(EngineEvent::LikelyToKeepUp(true));
            state.emit(EngineEvent::ReadyToPlay(true));
        }
        Ok(Box::new(SimulatedMedia {
            state: self.state.clone(),
            generation: state.generation,
        }))
    }
}

/// One loaded item. Calls on an item that was replaced by a later load are
/// ignored.
pub struct SimulatedMedia {
    state: Shared,
    generation: u64,
}

impl SimulatedMedia {
    fn with_live<R>(&self, f: impl FnOnce(&mut SimState) -> R) -> Option<R> {
        let mut state = self.state.lock();
        (state.generation == self.generation).then(|| f(&mut state))
    }
}

impl MediaItem for SimulatedMedia {
    fn play(&mut self) {
        self.with_live(|s| s.set_rate(1.0));
    }

    fn pause(&mut self) {
        self.with_live(|s| s.set_rate(0.0));
    }

    fn seek(&mut self, target: Duration, tolerance: SeekTolerance, completion: SeekCompletion) {
        let completion = {
            let mut state = self.state.lock();
            if state.generation != self.generation {
                Some(completion)
            } else if state.config.auto_complete_seeks {
                state.position = target;
                Some(completion)
            } else {
                state.pending.push_back(PendingSeek {
                    generation: self.generation,
                    target,
                    tolerance,
                    completion,
                });
                None
            }
        };
        // Completing outside the lock; a replaced item reports failure.
        if let Some(completion) = completion {
            let live = self.with_live(|_| ()).is_some();
            completion.complete(live);
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.with_live(|s| {
            if s.muted != muted {
                s.muted = muted;
                s.emit(EngineEvent::MuteChanged(muted));
            }
        });
    }

    fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    fn current_time(&self) -> Duration {
        self.with_live(|s| s.position).unwrap_or_default()
    }

    fn duration(&self) -> Option<Duration> {
        self.state.lock().config.duration
    }

    fn rate(&self) -> f32 {
        self.with_live(|s| s.rate).unwrap_or(0.0)
    }
}

/// Drives the current item: time, stalls, failures, seek completions.
#[derive(Clone)]
pub struct SimRemote {
    state: Shared,
}

impl SimRemote {
    /// Advance the position by one tick while playing. Reaching the end
    /// emits played-to-end followed by a rate drop. Returns `false` once
    /// nothing is playing.
    pub fn tick(&self) -> bool {
        let mut state = self.state.lock();
        if state.rate <= 0.0 {
            return false;
        }
        let step = state.config.tick;
        let next = state.position + step;
        match state.config.duration {
            Some(total) if next >= total => {
                state.position = total;
                state.emit(EngineEvent::PeriodicTime(total));
                state.emit(EngineEvent::PlayedToEnd);
                state.set_rate(0.0);
                false
            }
            _ => {
                state.position = next;
                state.emit(EngineEvent::PeriodicTime(next));
                true
            }
        }
    }

    /// Report an arbitrary position without moving the playhead logic.
    pub fn emit_time(&self, position: Duration) {
        let mut state = self.state.lock();
        state.position = position;
        state.emit(EngineEvent::PeriodicTime(position));
    }

    pub fn stall(&self) {
        let state = self.state.lock();
        state.emit(EngineEvent::LikelyToKeepUp(false));
        state.emit(EngineEvent::Stalled);
    }

    /// Recover from a stall; re-announces the rate if still playing.
    pub fn resume(&self) {
        let state = self.state.lock();
        state.emit(EngineEvent::LikelyToKeepUp(true));
        if state.rate > 0.0 {
            state.emit(EngineEvent::RateChanged(state.rate));
        }
    }

    pub fn fail(&self, reason: &str) {
        let mut state = self.state.lock();
        state.emit(EngineEvent::Failed(reason.to_string()));
        state.set_rate(0.0);
    }

    /// Report readiness (for engines configured without `ready_on_load`).
    pub fn set_ready(&self) {
        let state = self.state.lock();
        state.emit(EngineEvent::LikelyToKeepUp(true));
        state.emit(EngineEvent::ReadyToPlay(true));
    }

    /// Complete the oldest outstanding seek, including seeks issued by items
    /// that have since been replaced. Returns `false` if none was waiting.
    pub fn complete_seek(&self, finished: bool) -> bool {
        let next = {
            let mut state = self.state.lock();
            let next = state.pending.pop_front();
            if let Some(seek) = next.as_ref() {
                if finished && seek.generation == state.generation {
                    state.position = seek.target;
                }
            }
            next
        };
        match next {
            Some(seek) => {
                debug!(
                    "sim completes seek {:?} to {:?} ({:?}, finished={})",
                    seek.completion.ticket(),
                    seek.target,
                    seek.tolerance,
                    finished
                );
                seek.completion.complete(finished);
                true
            }
            None => false,
        }
    }

    pub fn pending_seeks(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Target of the most recent outstanding seek.
    pub fn last_seek_target(&self) -> Option<Duration> {
        self.state.lock().pending.back().map(|s| s.target)
    }

    pub fn position(&self) -> Duration {
        self.state.lock().position
    }

    pub fn rate(&self) -> f32 {
        self.state.lock().rate
    }

    pub fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    /// Every locator passed to `load`, accepted or not.
    pub fn loads(&self) -> Vec<String> {
        self.state.lock().loads.clone()
    }
}
