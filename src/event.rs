//! The single-consumer event queue feeding the controller, and the timers
//! that post into it.
//!
//! Engine signals, adapter actions, platform notifications, timer expiries and
//! host commands all become `Event`s on one unbounded channel. Only the
//! controller reads it, so state transitions never interleave.

use crate::controls::{AdapterId, ControlAction, ControlAdapter};
use crate::engine::EngineEvent;
use crate::notify::Notification;
use crate::seek::{SeekRequest, SeekTicket};
use crate::session::SessionId;
use crate::{PlayerSnapshot, Result};
use log::warn;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Everything the controller reacts to.
pub enum Event {
    Engine {
        session: SessionId,
        event: EngineEvent,
    },
    Timer {
        session: SessionId,
        timer: TimerEvent,
    },
    Control {
        adapter: AdapterId,
        action: ControlAction,
    },
    Notification(Notification),
    Command(Command),
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Engine { session, event } => f
                .debug_struct("Engine")
                .field("session", session)
                .field("event", event)
                .finish(),
            Event::Timer { session, timer } => f
                .debug_struct("Timer")
                .field("session", session)
                .field("timer", timer)
                .finish(),
            Event::Control { adapter, action } => f
                .debug_struct("Control")
                .field("adapter", adapter)
                .field("action", action)
                .finish(),
            Event::Notification(n) => f.debug_tuple("Notification").field(n).finish(),
            Event::Command(c) => f.debug_tuple("Command").field(&c.name()).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Minimum viewable duration elapsed
    Viewable,
    /// A seek did not land in time
    SeekTimeout(SeekTicket),
}

/// Host commands posted by the async `Player` handle.
pub enum Command {
    SetSource(String, oneshot::Sender<Result<SessionId>>),
    Play,
    Pause,
    Seek(SeekRequest),
    Forward,
    Rewind,
    Skip,
    SetMuted(bool),
    ToggleMute,
    SetAutoplay(bool),
    SetStartOffset(f64),
    Register(ControlAdapter, oneshot::Sender<AdapterId>),
    Unregister(AdapterId),
    Snapshot(oneshot::Sender<PlayerSnapshot>),
    Shutdown(Option<oneshot::Sender<()>>),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetSource(..) => "set_source",
            Command::Play => "play",
            Command::Pause => "pause",
            Command::Seek(_) => "seek",
            Command::Forward => "forward",
            Command::Rewind => "rewind",
            Command::Skip => "skip",
            Command::SetMuted(_) => "set_muted",
            Command::ToggleMute => "toggle_mute",
            Command::SetAutoplay(_) => "set_autoplay",
            Command::SetStartOffset(_) => "set_start_offset",
            Command::Register(..) => "register",
            Command::Unregister(_) => "unregister",
            Command::Snapshot(_) => "snapshot",
            Command::Shutdown(_) => "shutdown",
        }
    }
}

/// Cloneable producer side of the controller queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    /// Queue an event. Returns `false` if the controller is gone.
    pub fn post(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub(crate) fn channel() -> (EventSender, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

/// Posts an event into the queue after a delay.
pub trait Scheduler: Send {
    fn schedule(&mut self, delay: Duration, tx: EventSender, event: Event);
}

/// Timer backed by the ambient tokio runtime.
#[derive(Debug, Default, Clone)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        TokioScheduler
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, tx: EventSender, event: Event) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    tx.post(event);
                });
            }
            Err(e) => warn!("Dropping timer {:?}: no tokio runtime ({})", event, e),
        }
    }
}

struct PendingTimer {
    due: Duration,
    seq: u64,
    tx: EventSender,
    event: Event,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    seq: u64,
    pending: Vec<PendingTimer>,
}

/// Virtual-time scheduler for deterministic tests and simulations.
///
/// Timers fire only when `advance` moves the virtual clock past their due
/// time; fired events are posted into the queue in due order.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.clock.lock().now
    }

    pub fn pending(&self) -> usize {
        self.clock.lock().pending.len()
    }

    /// Advance virtual time and post every timer that became due.
    /// Returns the number of timers fired.
    pub fn advance(&self, by: Duration) -> usize {
        let mut due = {
            let mut clock = self.clock.lock();
            clock.now += by;
            let now = clock.now;
            let (ready, waiting): (Vec<_>, Vec<_>) =
                clock.pending.drain(..).partition(|t| t.due <= now);
            clock.pending = waiting;
            ready
        };
        due.sort_by_key(|t| (t.due, t.seq));
        let fired = due.len();
        for timer in due {
            timer.tx.post(timer.event);
        }
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, tx: EventSender, event: Event) {
        let mut clock = self.clock.lock();
        clock.seq += 1;
        let timer = PendingTimer {
            due: clock.now + delay,
            seq: clock.seq,
            tx,
            event,
        };
        clock.pending.push(timer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;

    fn viewable(session: u64) -> Event {
        Event::Timer {
            session: SessionId(session),
            timer: TimerEvent::Viewable,
        }
    }

    #[test]
    fn manual_scheduler_fires_in_due_order() {
        let (tx, mut rx) = channel();
        let mut sched = ManualScheduler::new();
        sched.schedule(Duration::from_secs(2), tx.clone(), viewable(2));
        sched.schedule(Duration::from_secs(1), tx.clone(), viewable(1));
        assert_eq!(sched.pending(), 2);

        assert_eq!(sched.advance(Duration::from_millis(500)), 0);
        assert_eq!(sched.advance(Duration::from_secs(2)), 2);
        assert_eq!(sched.pending(), 0);

        let first = rx.try_recv().unwrap();
        assert!(matches!(first, Event::Timer { session: SessionId(1), .. }));
        let second = rx.try_recv().unwrap();
        assert!(matches!(second, Event::Timer { session: SessionId(2), .. }));
    }

    #[test]
    fn post_reports_closed_queue() {
        let (tx, rx) = channel();
        drop(rx);
        assert!(tx.is_closed());
        assert!(!tx.post(viewable(1)));
    }

    #[test]
    fn tokio_scheduler_without_runtime_does_not_panic() {
        let (tx, mut rx) = channel();
        TokioScheduler::new().schedule(Duration::from_millis(1), tx, viewable(1));
        assert!(rx.try_recv().is_err());
    }
}
