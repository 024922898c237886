use crate::controller::Controller;
use crate::controls::{AdapterId, ControlAdapter, PlayerEvent};
use crate::engine::MediaEngine;
use crate::event::{Command, Event, EventSender, TokioScheduler};
use crate::notify::Notification;
use crate::progress::ProgressBucket;
use crate::seek::SeekRequest;
use crate::session::SessionId;
use crate::status::PlaybackStatus;
use crate::stream::Streams;
use crate::{Error, PlayerConfig, PlayerSnapshot, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Asks the loop to stop once the last handle is gone.
struct LoopGuard {
    tx: EventSender,
}

impl Drop for LoopGuard {
    fn drop(&mut self) {
        let _ = self.tx.post(Event::Command(Command::Shutdown(None)));
    }
}

/// An async-friendly player handle backed by a controller task.
///
/// The task owns the `Controller` and the engine; handles only post commands
/// into its queue, so they are cheap to clone and safe to share across tasks.
/// Commands are fire-and-forget unless they return a value.
#[derive(Clone)]
pub struct Player {
    tx: EventSender,
    streams: Streams,
    _guard: Arc<LoopGuard>,
}

impl Player {
    /// Spawn the controller loop on the current tokio runtime.
    pub fn spawn(engine: impl MediaEngine + 'static, config: PlayerConfig) -> Result<Self> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Other(format!("Player needs a tokio runtime: {}", e)))?;
        let controller = Controller::new(engine, config, TokioScheduler::new())?;
        let tx = controller.sender();
        let streams = controller.streams();
        handle.spawn(controller.run());
        Ok(Self {
            _guard: Arc::new(LoopGuard { tx: tx.clone() }),
            tx,
            streams,
        })
    }

    fn command(&self, command: Command) -> Result<()> {
        if self.tx.post(Event::Command(command)) {
            Ok(())
        } else {
            Err(Error::Closed)
        }
    }

    async fn request<T>(
        &self,
        what: &str,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.command(build(tx))?;
        rx.await
            .map_err(|e| Error::Canceled(format!("{}: {}", what, e)))
    }

    /// Assign a new source and wait for the controller to accept it.
    pub async fn set_source(&self, locator: &str) -> Result<SessionId> {
        let locator = locator.to_string();
        self.request("set_source", |tx| Command::SetSource(locator, tx))
            .await?
    }

    pub fn play(&self) -> Result<()> {
        self.command(Command::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.command(Command::Pause)
    }

    pub fn seek(&self, request: SeekRequest) -> Result<()> {
        self.command(Command::Seek(request))
    }

    pub fn seek_fraction(&self, fraction: f64) -> Result<()> {
        self.seek(SeekRequest::fraction(fraction))
    }

    pub fn seek_time(&self, position: Duration) -> Result<()> {
        self.seek(SeekRequest::time(position))
    }

    pub fn forward(&self) -> Result<()> {
        self.command(Command::Forward)
    }

    pub fn rewind(&self) -> Result<()> {
        self.command(Command::Rewind)
    }

    pub fn skip(&self) -> Result<()> {
        self.command(Command::Skip)
    }

    pub fn set_muted(&self, muted: bool) -> Result<()> {
        self.command(Command::SetMuted(muted))
    }

    pub fn toggle_mute(&self) -> Result<()> {
        self.command(Command::ToggleMute)
    }

    pub fn set_autoplay(&self, autoplay: bool) -> Result<()> {
        self.command(Command::SetAutoplay(autoplay))
    }

    pub fn set_start_offset(&self, offset: f64) -> Result<()> {
        self.command(Command::SetStartOffset(offset))
    }

    /// Forward a platform notification to the bridge.
    pub fn notify(&self, notification: Notification) -> Result<()> {
        if self.tx.post(Event::Notification(notification)) {
            Ok(())
        } else {
            Err(Error::Closed)
        }
    }

    pub async fn register(&self, adapter: ControlAdapter) -> Result<AdapterId> {
        self.request("register", |tx| Command::Register(adapter, tx))
            .await
    }

    pub fn unregister(&self, id: AdapterId) -> Result<()> {
        self.command(Command::Unregister(id))
    }

    pub async fn snapshot(&self) -> Result<PlayerSnapshot> {
        self.request("snapshot", Command::Snapshot).await
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

    /// Stop the controller loop and wait for it to acknowledge.
    pub async fn shutdown(self) -> Result<()> {
        self.request("shutdown", |tx| Command::Shutdown(Some(tx)))
            .await
    }

    /// `true` once the loop has exited.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
