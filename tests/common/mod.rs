#![allow(dead_code)]

use rfplayer::sim::{SimConfig, SimRemote};
use rfplayer::{Controller, ManualScheduler, PlaybackStatus, PlayerConfig, ProgressBucket};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

pub const SRC: &str = "https://media.example/clip.mp4";
pub const OTHER_SRC: &str = "https://media.example/other.mp4";

/// A controller over the simulated engine plus its subscriptions.
pub struct Rig {
    pub controller: Controller,
    pub remote: SimRemote,
    pub clock: ManualScheduler,
    pub status: UnboundedReceiver<PlaybackStatus>,
    pub progress: UnboundedReceiver<ProgressBucket>,
}

impl Rig {
    pub fn new(config: PlayerConfig) -> Self {
        Self::with_sim(config, SimConfig::default())
    }

    pub fn with_sim(config: PlayerConfig, sim: SimConfig) -> Self {
        let (controller, remote, clock) =
            rfplayer::new_player(config, sim).expect("valid config");
        let status = controller.subscribe_status();
        let progress = controller.subscribe_progress();
        Self {
            controller,
            remote,
            clock,
            status,
            progress,
        }
    }

    /// Assign `SRC` and process the load signals.
    pub fn load(&mut self) {
        self.controller.set_source(SRC).expect("source accepted");
        self.controller.pump();
    }

    pub fn pump(&mut self) -> usize {
        self.controller.pump()
    }

    /// One engine tick followed by a pump.
    pub fn tick(&mut self) -> bool {
        let more = self.remote.tick();
        self.controller.pump();
        more
    }

    pub fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    pub fn run_to_end(&mut self) {
        while self.tick() {}
    }

    pub fn advance(&mut self, by: Duration) -> usize {
        let fired = self.clock.advance(by);
        self.controller.pump();
        fired
    }

    pub fn statuses(&mut self) -> Vec<PlaybackStatus> {
        drain(&mut self.status)
    }

    pub fn buckets(&mut self) -> Vec<ProgressBucket> {
        drain(&mut self.progress)
    }

    pub fn status(&self) -> PlaybackStatus {
        self.controller.status()
    }
}

pub fn drain<T>(rx: &mut UnboundedReceiver<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Ok(v) = rx.try_recv() {
        out.push(v);
    }
    out
}

pub fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}
