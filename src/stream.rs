//! Outbound streams exposed to adapters and the host.
//!
//! Each stream is a list of unbounded subscribers. Dropping a receiver
//! unsubscribes it on the next send.

use crate::controls::PlayerEvent;
use crate::progress::ProgressBucket;
use crate::status::PlaybackStatus;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

struct Shared<T> {
    subscribers: Vec<mpsc::UnboundedSender<T>>,
    latest: Option<T>,
    replay: bool,
}

/// Multi-subscriber fan-out of values of type `T`.
///
/// A replaying broadcaster hands its latest value to every new subscriber,
/// so late subscribers still see the current state.
pub struct Broadcaster<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

impl<T> Clone for Broadcaster<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone> Broadcaster<T> {
    /// Plain publish stream: subscribers only see values sent after they joined.
    pub fn new() -> Self {
        Self::build(false, None)
    }

    /// Stream that replays `initial` (later: the latest value) on subscribe.
    pub fn replaying(initial: T) -> Self {
        Self::build(true, Some(initial))
    }

    fn build(replay: bool, latest: Option<T>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                subscribers: Vec::new(),
                latest,
                replay,
            })),
        }
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut shared = self.shared.lock();
        if shared.replay {
            if let Some(latest) = shared.latest.clone() {
                let _ = tx.send(latest);
            }
        }
        shared.subscribers.push(tx);
        rx
    }

    pub fn send(&self, value: T) {
        let mut shared = self.shared.lock();
        shared.subscribers.retain(|tx| tx.send(value.clone()).is_ok());
        shared.latest = Some(value);
    }

    pub fn latest(&self) -> Option<T> {
        self.shared.lock().latest.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        let mut shared = self.shared.lock();
        shared.subscribers.retain(|tx| !tx.is_closed());
        shared.subscribers.len()
    }
}

impl<T: Clone + PartialEq> Broadcaster<T> {
    /// Send only if `value` differs from the latest one.
    pub fn send_distinct(&self, value: T) -> bool {
        if self.latest().as_ref() == Some(&value) {
            return false;
        }
        self.send(value);
        true
    }
}

impl<T: Clone> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// All streams a controller publishes.
#[derive(Clone)]
pub struct Streams {
    pub status: Broadcaster<PlaybackStatus>,
    pub progress: Broadcaster<ProgressBucket>,
    /// Elapsed fraction, 0..1
    pub seek_position: Broadcaster<f64>,
    pub skip_allowed: Broadcaster<bool>,
    pub events: Broadcaster<PlayerEvent>,
    pub viewable: Broadcaster<()>,
}

impl Streams {
    pub fn new() -> Self {
        Self {
            status: Broadcaster::replaying(PlaybackStatus::Prepare),
            progress: Broadcaster::replaying(ProgressBucket::Prepare),
            seek_position: Broadcaster::new(),
            skip_allowed: Broadcaster::new(),
            events: Broadcaster::new(),
            viewable: Broadcaster::new(),
        }
    }
}

impl Default for Streams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaying_stream_seeds_new_subscribers() {
        let b = Broadcaster::replaying(1u32);
        let mut early = b.subscribe();
        b.send(2);
        let mut late = b.subscribe();
        assert_eq!(early.try_recv().unwrap(), 1);
        assert_eq!(early.try_recv().unwrap(), 2);
        assert_eq!(late.try_recv().unwrap(), 2);
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn plain_stream_does_not_replay() {
        let b = Broadcaster::new();
        b.send("a");
        let mut rx = b.subscribe();
        assert!(rx.try_recv().is_err());
        b.send("b");
        assert_eq!(rx.try_recv().unwrap(), "b");
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let b = Broadcaster::<u8>::new();
        let rx = b.subscribe();
        let _keep = b.subscribe();
        assert_eq!(b.subscriber_count(), 2);
        drop(rx);
        b.send(1);
        assert_eq!(b.subscriber_count(), 1);
    }

    #[test]
    fn send_distinct_coalesces() {
        let b = Broadcaster::replaying(0u8);
        let mut rx = b.subscribe();
        assert!(!b.send_distinct(0));
        assert!(b.send_distinct(3));
        assert!(!b.send_distinct(3));
        assert_eq!(rx.try_recv().unwrap(), 0);
        assert_eq!(rx.try_recv().unwrap(), 3);
        assert!(rx.try_recv().is_err());
    }
}
