//! The playback controller: status state machine and the wiring between the
//! engine, the seek coordinator, the progress classifier, the skip gate and
//! the control adapters.
//!
//! The controller is synchronous. Everything it reacts to arrives through its
//! event queue and is handled one event at a time, either by `pump` (tests,
//! embedding in a host loop) or by `run` on a tokio task.

use crate::controls::{
    AdapterId, ControlAction, ControlAdapter, ControlRegistry, PlaybackTimes, PlayerEvent,
    PlayerEventKind,
};
use crate::engine::{EngineEvent, EngineSink, MediaEngine, SeekCompletion};
use crate::event::{self, Command, Event, EventSender, Scheduler, TimerEvent};
use crate::notify::{self, BridgeAction, Notification};
use crate::progress::{self, ProgressBucket};
use crate::seek::{self, Landing, SeekOutcome, SeekRequest, SeekTicket};
use crate::session::{PlaybackSession, SessionId};
use crate::status::{PlaybackStatus, StatusCell};
use crate::stream::Streams;
use crate::{Error, PlayerConfig, PlayerSnapshot, Result};
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

/// How far before the end a skip lands.
const SKIP_END_MARGIN: Duration = Duration::from_millis(1);

pub struct Controller {
    config: PlayerConfig,
    engine: Box<dyn MediaEngine>,
    scheduler: Box<dyn Scheduler>,
    tx: EventSender,
    rx: mpsc::UnboundedReceiver<Event>,
    status: StatusCell,
    session: Option<PlaybackSession>,
    next_session: u64,
    pending_offset: f64,
    controls: ControlRegistry,
    streams: Streams,
    skip_visible: bool,
}

impl Controller {
    pub fn new(
        engine: impl MediaEngine + 'static,
        config: PlayerConfig,
        scheduler: impl Scheduler + 'static,
    ) -> Result<Self> {
        config.validate()?;
        let (tx, rx) = event::channel();
        Ok(Self {
            pending_offset: config.start_offset,
            config,
            engine: Box::new(engine),
            scheduler: Box::new(scheduler),
            tx,
            rx,
            status: StatusCell::new(),
            session: None,
            next_session: 0,
            controls: ControlRegistry::new(),
            streams: Streams::new(),
            skip_visible: false,
        })
    }

    /// Producer side of the queue (engine sinks, links and handles use it).
    pub fn sender(&self) -> EventSender {
        self.tx.clone()
    }

    pub fn streams(&self) -> Streams {
        self.streams.clone()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    // --- queue -------------------------------------------------------------

    /// Handle every queued event, including ones queued while handling.
    /// Returns the number of events handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.rx.try_recv() {
            handled += 1;
            self.handle(event);
        }
        handled
    }

    /// Drive the controller from its queue until a shutdown command arrives.
    pub async fn run(mut self) {
        info!("Playback controller started");
        while let Some(event) = self.rx.recv().await {
            if !self.handle(event) {
                break;
            }
        }
        info!("Playback controller stopped");
    }

    /// Handle one event. Returns `false` once shutdown was requested.
    pub fn handle(&mut self, event: Event) -> bool {
        match event {
            Event::Engine { session, event } => {
                if self.is_current(session) {
                    self.on_engine(event);
                } else {
                    debug!("Dropping {:?} from stale session {}", event, session);
                }
            }
            Event::Timer { session, timer } => {
                if self.is_current(session) {
                    self.on_timer(timer);
                } else {
                    debug!("Dropping {:?} timer from stale session {}", timer, session);
                }
            }
            Event::Control { adapter, action } => self.on_control(adapter, action),
            Event::Notification(n) => self.notify(n),
            Event::Command(command) => return self.on_command(command),
        }
        true
    }

    fn is_current(&self, session: SessionId) -> bool {
        self.session.as_ref().map(|s| s.id) == Some(session)
    }

    // --- accessors ---------------------------------------------------------

    pub fn status(&self) -> PlaybackStatus {
        self.status.get()
    }

    pub fn progress(&self) -> ProgressBucket {
        self.session
            .as_ref()
            .map(|s| s.progress.current())
            .unwrap_or(ProgressBucket::Prepare)
    }

    pub fn muted(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.muted)
            .unwrap_or(self.config.muted)
    }

    pub fn position(&self) -> Duration {
        self.session
            .as_ref()
            .map(|s| s.position)
            .unwrap_or(Duration::ZERO)
    }

    pub fn total_duration(&self) -> Option<Duration> {
        self.session.as_ref().and_then(|s| s.total_duration)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Start offset still waiting to be applied: the current session's if
    /// unconsumed, otherwise the one held for the next source.
    pub fn pending_start_offset(&self) -> f64 {
        self.session
            .as_ref()
            .map(|s| s.pending_start_offset())
            .filter(|offset| *offset > 0.0)
            .unwrap_or(self.pending_offset)
    }

    pub fn skip_allowed(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.skip_gate.has_fired())
            .unwrap_or(false)
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            source: self.session.as_ref().map(|s| s.source.clone()),
            session: self.session_id(),
            status: self.status(),
            progress: self.progress(),
            muted: self.muted(),
            position_secs: self.position().as_secs_f64(),
            total_secs: self.total_duration().map(|d| d.as_secs_f64()),
            skip_allowed: self.skip_allowed(),
            adapters: self.controls.len(),
        }
    }

    pub fn subscribe_status(&self) -> mpsc::UnboundedReceiver<PlaybackStatus> {
        self.streams.status.subscribe()
    }

    pub fn subscribe_progress(&self) -> mpsc::UnboundedReceiver<ProgressBucket> {
        self.streams.progress.subscribe()
    }

    pub fn subscribe_seek_position(&self) -> mpsc::UnboundedReceiver<f64> {
        self.streams.seek_position.subscribe()
    }

    pub fn subscribe_skip_allowed(&self) -> mpsc::UnboundedReceiver<bool> {
        self.streams.skip_allowed.subscribe()
    }

    pub fn subscribe_events(&self) -> mpsc::UnboundedReceiver<PlayerEvent> {
        self.streams.events.subscribe()
    }

    pub fn subscribe_viewable(&self) -> mpsc::UnboundedReceiver<()> {
        self.streams.viewable.subscribe()
    }

    // --- host API ----------------------------------------------------------

    /// Assign a new source. The previous session is discarded along with its
    /// engine item, pending seek and timers.
    ///
    /// An invalid or unloadable source still creates a session, in `failed`.
    pub fn set_source(&mut self, locator: &str) -> Result<SessionId> {
        self.next_session += 1;
        let id = SessionId(self.next_session);
        if let Some(old) = self.session.take() {
            info!("Replacing session {} ({})", old.id, old.source);
        }

        let offset = std::mem::take(&mut self.pending_offset);
        let session = PlaybackSession::new(id, locator, &self.config, offset);
        self.session = Some(session);

        self.streams.progress.send_distinct(ProgressBucket::Prepare);
        self.transition(PlaybackStatus::Prepare);
        self.update_skip_visibility();

        let sink = EngineSink::new(self.tx.clone(), id);
        let loaded = parse_locator(locator).and_then(|url| self.engine.load(&url, sink));
        match loaded {
            Ok(mut item) => {
                item.set_muted(self.config.muted);
                let muted = item.is_muted();
                if let Some(session) = self.session.as_mut() {
                    session.muted = muted;
                    session.item = Some(item);
                }
                self.controls.show_muted(muted);
                info!("Session {} loading {}", id, locator);
                Ok(id)
            }
            Err(e) => {
                warn!("Session {} failed to load {}: {}", id, locator, e);
                self.transition(PlaybackStatus::Failed);
                Err(e)
            }
        }
    }

    /// Start or resume playback. From `finished` this replays from zero.
    pub fn play(&mut self) {
        let status = self.status();
        match status {
            PlaybackStatus::Failed => {
                debug!("play ignored while failed");
            }
            PlaybackStatus::Finished => {
                if self.session.as_ref().is_some_and(|s| s.item.is_some()) {
                    self.transition(PlaybackStatus::Prepare);
                    self.seek(SeekRequest::time(Duration::ZERO));
                }
            }
            _ => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                let Some(item) = session.item.as_mut() else {
                    return;
                };
                session.autoplay = false;
                if let Some(ticket) = session.seeks.failed() {
                    debug!("play abandons failed seek {:?}", ticket);
                    session.seeks.abandon(ticket);
                }
                item.play();
                let rate = item.rate();
                if rate > 0.0 {
                    self.on_rate(rate);
                }
            }
        }
    }

    /// Pause; only forwarded to the engine while `playing`.
    pub fn pause(&mut self) {
        if self.status() != PlaybackStatus::Playing {
            debug!("pause ignored in {}", self.status());
            return;
        }
        let Some(item) = self.session.as_mut().and_then(|s| s.item.as_mut()) else {
            return;
        };
        item.pause();
        let rate = item.rate();
        if rate == 0.0 {
            self.on_rate(rate);
        }
    }

    pub fn seek_fraction(&mut self, fraction: f64) {
        self.seek(SeekRequest::fraction(fraction));
    }

    pub fn seek_time(&mut self, position: Duration) {
        self.seek(SeekRequest::time(position));
    }

    /// Issue a seek, superseding any seek still in flight.
    pub fn seek(&mut self, request: SeekRequest) {
        let status = self.status();
        if matches!(status, PlaybackStatus::Finished | PlaybackStatus::Failed) {
            debug!("seek ignored in {}", status);
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(target) = request.resolve(session.total_duration) else {
            debug!("seek {:?} ignored: total duration unknown", request.target);
            return;
        };
        // A seek issued before readiness replaces the start offset.
        if status == PlaybackStatus::Prepare {
            if let Some(offset) = session.take_start_offset() {
                debug!("Session {}: start offset {} superseded by seek", session.id, offset);
            }
        }
        let Some(item) = session.item.as_mut() else {
            return;
        };

        let ticket = session.seeks.begin(request.landing);
        if status == PlaybackStatus::Playing {
            item.pause();
        }
        let sink = EngineSink::new(self.tx.clone(), session.id);
        item.seek(target, request.tolerance, SeekCompletion::new(sink, ticket));
        let session_id = session.id;
        debug!("seek {:?} to {:?} ({:?})", ticket, target, request.landing);

        self.transition(PlaybackStatus::Seeking);
        if let Some(ms) = self.config.seek_timeout_ms {
            self.scheduler.schedule(
                Duration::from_millis(ms),
                self.tx.clone(),
                Event::Timer {
                    session: session_id,
                    timer: TimerEvent::SeekTimeout(ticket),
                },
            );
        }
    }

    /// Jump forward by the configured step.
    pub fn forward(&mut self) {
        self.step(self.config.step_secs);
    }

    /// Jump back by the configured step.
    pub fn rewind(&mut self) {
        self.step(-self.config.step_secs);
    }

    fn step(&mut self, delta_secs: f64) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let (Some(item), Some(total)) = (session.item.as_ref(), session.total_duration) else {
            return;
        };
        let target = seek::offset_by(item.current_time(), delta_secs, total);
        self.seek(SeekRequest::time(target));
    }

    /// Seek (frame-accurately) to just before the end and keep playing.
    pub fn skip(&mut self) {
        let Some(total) = self.total_duration() else {
            debug!("skip ignored: total duration unknown");
            return;
        };
        self.seek(SeekRequest::time(total.saturating_sub(SKIP_END_MARGIN)).exact());
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.config.muted = muted;
        let Some(item) = self.session.as_mut().and_then(|s| s.item.as_mut()) else {
            return;
        };
        item.set_muted(muted);
        let reported = item.is_muted();
        self.reflect_mute(reported);
    }

    pub fn toggle_mute(&mut self) {
        self.set_muted(!self.muted());
    }

    pub fn set_autoplay(&mut self, autoplay: bool) {
        self.config.autoplay = autoplay;
        if let Some(session) = self.session.as_mut() {
            session.autoplay = autoplay;
        }
    }

    /// Set the one-shot start offset (fraction 0..1).
    ///
    /// Applies to the current session if it has not reached readiness yet
    /// (or seeks right away when it sits in `ready`), otherwise to the next
    /// source.
    pub fn set_start_offset(&mut self, offset: f64) {
        let offset = if offset.is_finite() {
            offset.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let loaded = self.session.as_ref().is_some_and(|s| s.item.is_some());
        match self.status() {
            PlaybackStatus::Prepare if loaded => {
                if let Some(session) = self.session.as_mut() {
                    session.set_start_offset(offset);
                }
            }
            PlaybackStatus::Ready if loaded && offset > 0.0 => {
                self.seek(SeekRequest::fraction(offset).landing(Landing::Ready));
            }
            _ => self.pending_offset = offset,
        }
    }

    pub fn register(&mut self, adapter: ControlAdapter) -> AdapterId {
        let id = self.controls.register(adapter, &self.tx);
        self.controls.apply_status_to(id, self.status());
        self.controls.show_muted_to(id, self.muted());
        self.controls.set_skip_visible_to(id, self.skip_visible);
        if let Some(times) = self.session.as_ref().and_then(|s| s.times()) {
            let seeking = self.status() == PlaybackStatus::Seeking;
            self.controls.show_progress_to(id, times, seeking);
        }
        id
    }

    pub fn unregister(&mut self, id: AdapterId) -> bool {
        self.controls.unregister(id).is_some()
    }

    pub fn adapter_count(&self) -> usize {
        self.controls.len()
    }

    /// Platform notification bridge.
    pub fn notify(&mut self, notification: Notification) {
        match notify::bridge(notification, self.status()) {
            Some(BridgeAction::Play) => {
                debug!("{:?} -> play", notification);
                self.play();
            }
            Some(BridgeAction::Pause) => {
                debug!("{:?} -> pause", notification);
                self.pause();
            }
            None => debug!("{:?} ignored in {}", notification, self.status()),
        }
    }

    // --- transitions -------------------------------------------------------

    fn transition(&mut self, next: PlaybackStatus) {
        let prev = self.status.get();
        if !self.status.set(next) {
            return;
        }
        debug!("status {} -> {}", prev, next);
        self.controls.apply_status(next);
        self.update_skip_visibility();
        self.streams.status.send(next);
    }

    fn update_skip_visibility(&mut self) {
        let visible = self.skip_allowed() && self.status() != PlaybackStatus::Finished;
        if visible != self.skip_visible {
            self.skip_visible = visible;
            self.controls.set_skip_visible(visible);
        }
    }

    fn reflect_mute(&mut self, muted: bool) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.muted != muted {
            session.muted = muted;
            self.controls.show_muted(muted);
        }
    }

    // --- engine signals ----------------------------------------------------

    fn on_engine(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::LikelyToKeepUp(flag) => {
                if let Some(session) = self.session.as_mut() {
                    session.keep_up = flag;
                }
                self.on_readiness();
            }
            EngineEvent::ReadyToPlay(flag) => {
                if let Some(session) = self.session.as_mut() {
                    session.ready_to_play = flag;
                }
                self.on_readiness();
            }
            EngineEvent::RateChanged(rate) => self.on_rate(rate),
            EngineEvent::PeriodicTime(position) => self.on_periodic_time(position),
            EngineEvent::PlayedToEnd => self.on_played_to_end(),
            EngineEvent::Stalled => self.on_stalled(),
            EngineEvent::Failed(reason) => self.on_failed(&reason),
            EngineEvent::MuteChanged(muted) => self.reflect_mute(muted),
            EngineEvent::SeekCompleted { ticket, finished } => {
                self.on_seek_completed(ticket, finished)
            }
        }
    }

    fn on_readiness(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.is_playable() {
            return;
        }
        if session.refresh_total_duration() {
            if let Some(times) = session.times() {
                self.controls.show_progress(times, false);
            }
        }
        if self.status() != PlaybackStatus::Prepare {
            return;
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        let autoplay = session.autoplay;
        match session.take_start_offset() {
            Some(offset) if session.total_duration.is_some() => {
                debug!("Session {}: seeking to start offset {}", session.id, offset);
                self.seek(SeekRequest::fraction(offset).landing(Landing::Ready));
            }
            other => {
                if let Some(offset) = other {
                    warn!("Start offset {} dropped: total duration unknown", offset);
                }
                self.transition(PlaybackStatus::Ready);
                if autoplay {
                    self.play();
                }
            }
        }
    }

    fn on_rate(&mut self, rate: f32) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if let Some(ticket) = session.seeks.current() {
            debug!("rate {} ignored while seek {:?} is outstanding", rate, ticket);
            return;
        }
        let status = self.status();
        if rate > 0.0 {
            if matches!(status, PlaybackStatus::Finished | PlaybackStatus::Failed) {
                return;
            }
            self.transition(PlaybackStatus::Playing);
        } else {
            if matches!(
                status,
                PlaybackStatus::Finished | PlaybackStatus::Prepare | PlaybackStatus::Failed
            ) {
                return;
            }
            self.transition(PlaybackStatus::Pause);
        }
    }

    fn on_periodic_time(&mut self, position: Duration) {
        let status = self.status();
        let viewable_delay = Duration::from_millis(self.config.viewable_delay_ms);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.position = position;
        session.refresh_total_duration();

        let arm_viewable = session.viewability.arm();
        let skip_fired = session
            .skip_gate
            .observe(position, status == PlaybackStatus::Playing);
        let session_id = session.id;

        let mut advanced = None;
        let mut times = None;
        if let Some(total) = session.total_duration {
            advanced =
                progress::classify(position, total).and_then(|b| session.progress.advance(b));
            times = Some(PlaybackTimes::new(position, total));
        }

        if arm_viewable {
            self.scheduler.schedule(
                viewable_delay,
                self.tx.clone(),
                Event::Timer {
                    session: session_id,
                    timer: TimerEvent::Viewable,
                },
            );
        }
        if let Some(bucket) = advanced {
            debug!("progress -> {:?}", bucket);
            self.streams.progress.send(bucket);
        }
        if let Some(times) = times {
            let seeking = status == PlaybackStatus::Seeking;
            self.controls.show_progress(times, seeking);
            if !seeking {
                self.streams.seek_position.send(times.fraction());
            }
        }
        if skip_fired {
            info!("Session {}: skip allowed", session_id);
            self.streams.skip_allowed.send(true);
            self.update_skip_visibility();
        }
    }

    fn on_played_to_end(&mut self) {
        if self.status() == PlaybackStatus::Failed {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(ticket) = session.seeks.current() {
            session.seeks.abandon(ticket);
        }
        if let Some(total) = session.total_duration {
            session.position = total;
        }
        let completed = session.progress.complete();

        self.transition(PlaybackStatus::Finished);
        if let Some(bucket) = completed {
            self.streams.progress.send(bucket);
        }
    }

    fn on_stalled(&mut self) {
        let status = self.status();
        if matches!(status, PlaybackStatus::Finished | PlaybackStatus::Failed) {
            return;
        }
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.seeks.is_pending())
        {
            debug!("stall ignored while seeking");
            return;
        }
        self.transition(PlaybackStatus::Stalled);
    }

    fn on_failed(&mut self, reason: &str) {
        error!("Engine failure: {}", reason);
        if let Some(session) = self.session.as_mut() {
            if let Some(ticket) = session.seeks.current() {
                session.seeks.abandon(ticket);
            }
        }
        self.transition(PlaybackStatus::Failed);
    }

    fn on_seek_completed(&mut self, ticket: SeekTicket, finished: bool) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.seeks.complete(ticket, finished) {
            SeekOutcome::Stale => debug!("stale completion for seek {:?}", ticket),
            SeekOutcome::Failed => {
                warn!("Seek {:?} failed; status stays seeking", ticket);
            }
            SeekOutcome::Landed(Landing::Resume) => self.play(),
            SeekOutcome::Landed(Landing::Paused) => self.transition(PlaybackStatus::Pause),
            SeekOutcome::Landed(Landing::Ready) => {
                let autoplay = session.autoplay;
                self.transition(PlaybackStatus::Ready);
                if autoplay {
                    self.play();
                }
            }
        }
    }

    // --- timers ------------------------------------------------------------

    fn on_timer(&mut self, timer: TimerEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match timer {
            TimerEvent::Viewable => {
                if session.viewability.fire() {
                    info!("Session {}: viewable", session.id);
                    self.streams.viewable.send(());
                }
            }
            TimerEvent::SeekTimeout(ticket) => {
                if session.seeks.abandon(ticket) {
                    warn!("Seek {:?} did not land in time; marking failed", ticket);
                    self.transition(PlaybackStatus::Failed);
                }
            }
        }
    }

    // --- adapters ----------------------------------------------------------

    fn on_control(&mut self, adapter: AdapterId, action: ControlAction) {
        if !self.controls.contains(adapter) {
            warn!("Dropping {:?} from unregistered adapter {:?}", action, adapter);
            return;
        }
        match action {
            ControlAction::Play => self.play(),
            ControlAction::Pause => self.pause(),
            ControlAction::ToggleMute => self.toggle_mute(),
            ControlAction::Forward => self.forward(),
            ControlAction::Rewind => self.rewind(),
            ControlAction::Skip => self.skip(),
            ControlAction::ScrubChanged(fraction) => {
                if !fraction.is_finite() {
                    debug!("scrub preview {} from {:?} ignored", fraction, adapter);
                    return;
                }
                if let Some(total) = self.total_duration() {
                    let current = total.mul_f64(fraction.clamp(0.0, 1.0));
                    self.controls.preview(adapter, PlaybackTimes::new(current, total));
                }
            }
            ControlAction::ScrubReleased(fraction) => self.seek_fraction(fraction),
            ControlAction::Closed(context) => self.relay(PlayerEventKind::Closed, adapter, context),
            ControlAction::ContentTapped(context) => {
                self.relay(PlayerEventKind::ContentTapped, adapter, context)
            }
        }
    }

    fn relay(
        &mut self,
        kind: PlayerEventKind,
        adapter: AdapterId,
        context: Option<serde_json::Value>,
    ) {
        self.streams.events.send(PlayerEvent {
            kind,
            adapter,
            context,
        });
    }

    // --- commands ----------------------------------------------------------

    fn on_command(&mut self, command: Command) -> bool {
        match command {
            Command::SetSource(locator, reply) => {
                let _ = reply.send(self.set_source(&locator));
            }
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::Seek(request) => self.seek(request),
            Command::Forward => self.forward(),
            Command::Rewind => self.rewind(),
            Command::Skip => self.skip(),
            Command::SetMuted(muted) => self.set_muted(muted),
            Command::ToggleMute => self.toggle_mute(),
            Command::SetAutoplay(autoplay) => self.set_autoplay(autoplay),
            Command::SetStartOffset(offset) => self.set_start_offset(offset),
            Command::Register(adapter, reply) => {
                let _ = reply.send(self.register(adapter));
            }
            Command::Unregister(id) => {
                self.unregister(id);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown(reply) => {
                info!("Shutdown requested");
                if let Some(reply) = reply {
                    let _ = reply.send(());
                }
                return false;
            }
        }
        true
    }
}

/// Parse a locator. `file://` locators must point at an existing path.
pub fn parse_locator(locator: &str) -> Result<Url> {
    let url = Url::parse(locator)
        .map_err(|e| Error::SourceInvalid(format!("{}: {}", locator, e)))?;
    if url.scheme() == "file" {
        let path = url
            .to_file_path()
            .map_err(|_| Error::SourceInvalid(format!("{}: not a local path", locator)))?;
        if !path.exists() {
            return Err(Error::SourceInvalid(format!(
                "{}: no such file",
                path.display()
            )));
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_locator_rejects_garbage_and_missing_files() {
        assert!(parse_locator("https://media.example/movie.m3u8").is_ok());
        assert!(matches!(
            parse_locator("not a url"),
            Err(Error::SourceInvalid(_))
        ));
        assert!(matches!(
            parse_locator("file:///definitely/not/here.mp4"),
            Err(Error::SourceInvalid(_))
        ));
    }

    #[test]
    fn parse_locator_accepts_existing_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("rfplayer-locator-{}.mp4", std::process::id()));
        std::fs::write(&path, b"").unwrap();
        let url = Url::from_file_path(&path).unwrap();
        assert!(parse_locator(url.as_str()).is_ok());
        let _ = std::fs::remove_file(&path);
    }
}
