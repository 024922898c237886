//! Registry and binder for control adapters.

use super::{AdapterId, Capabilities, ControlAdapter, PlaybackTimes, PlayerLink};
use crate::event::EventSender;
use crate::status::PlaybackStatus;
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const INDEXED: [Capabilities; 5] = [
    Capabilities::TIME,
    Capabilities::SCRUB,
    Capabilities::MUTE,
    Capabilities::SKIP,
    Capabilities::LINK,
];

struct Entry {
    adapter: ControlAdapter,
    caps: Capabilities,
}

/// Adapters keyed by id, with a per-capability index.
#[derive(Default)]
pub struct ControlRegistry {
    entries: BTreeMap<AdapterId, Entry>,
    by_capability: HashMap<Capabilities, BTreeSet<AdapterId>>,
    next: u64,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an adapter, injecting a `PlayerLink` if it asks for one.
    pub fn register(&mut self, mut adapter: ControlAdapter, tx: &EventSender) -> AdapterId {
        self.next += 1;
        let id = AdapterId(self.next);

        let caps = Capabilities::probe(adapter.control_mut());
        if caps.contains(Capabilities::LINK) {
            adapter
                .control_mut()
                .attach(PlayerLink::new(tx.clone(), id));
        }
        for cap in INDEXED {
            if caps.contains(cap) {
                self.by_capability.entry(cap).or_default().insert(id);
            }
        }
        debug!(
            "Registered adapter {} as {:?} with {:?}",
            adapter.name(),
            id,
            caps
        );
        self.entries.insert(id, Entry { adapter, caps });
        id
    }

    pub fn unregister(&mut self, id: AdapterId) -> Option<ControlAdapter> {
        let entry = self.entries.remove(&id)?;
        for ids in self.by_capability.values_mut() {
            ids.remove(&id);
        }
        debug!("Unregistered adapter {} ({:?})", entry.adapter.name(), id);
        Some(entry.adapter)
    }

    pub fn contains(&self, id: AdapterId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capabilities(&self, id: AdapterId) -> Option<Capabilities> {
        self.entries.get(&id).map(|e| e.caps)
    }

    /// Ids of adapters that have `cap`, in registration order.
    pub fn with_capability(&self, cap: Capabilities) -> Vec<AdapterId> {
        self.by_capability
            .get(&cap)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Show every adapter whose mask contains `status`, hide all others.
    pub fn apply_status(&mut self, status: PlaybackStatus) {
        for entry in self.entries.values_mut() {
            let visible = entry.adapter.categories().shows(status);
            entry.adapter.control_mut().set_visible(visible);
        }
    }

    pub fn apply_status_to(&mut self, id: AdapterId, status: PlaybackStatus) {
        if let Some(entry) = self.entries.get_mut(&id) {
            let visible = entry.adapter.categories().shows(status);
            entry.adapter.control_mut().set_visible(visible);
        }
    }

    fn is_dragging(entry: &mut Entry) -> bool {
        entry
            .adapter
            .control_mut()
            .scrub()
            .map(|s| s.is_dragging())
            .unwrap_or(false)
    }

    /// Push a periodic position update. Adapters whose scrub is being
    /// dragged get nothing; scrub positions are withheld while `seeking`.
    pub fn show_progress(&mut self, times: PlaybackTimes, seeking: bool) {
        let targets: BTreeSet<AdapterId> = self
            .with_capability(Capabilities::TIME)
            .into_iter()
            .chain(self.with_capability(Capabilities::SCRUB))
            .collect();
        for id in targets {
            self.show_progress_to(id, times, seeking);
        }
    }

    pub fn show_progress_to(&mut self, id: AdapterId, times: PlaybackTimes, seeking: bool) {
        let Some(entry) = self.entries.get_mut(&id) else {
            return;
        };
        if Self::is_dragging(entry) {
            return;
        }
        let control = entry.adapter.control_mut();
        if let Some(display) = control.time_display() {
            display.show_times(times);
        }
        if !seeking {
            if let Some(scrub) = control.scrub() {
                scrub.show_position(times.fraction());
            }
        }
    }

    /// Preview times for one adapter while its scrub is moving.
    pub fn preview(&mut self, id: AdapterId, times: PlaybackTimes) {
        if let Some(display) = self
            .entries
            .get_mut(&id)
            .and_then(|e| e.adapter.control_mut().time_display())
        {
            display.show_times(times);
        }
    }

    pub fn show_muted(&mut self, muted: bool) {
        for id in self.with_capability(Capabilities::MUTE) {
            self.show_muted_to(id, muted);
        }
    }

    pub fn show_muted_to(&mut self, id: AdapterId, muted: bool) {
        if let Some(indicator) = self
            .entries
            .get_mut(&id)
            .and_then(|e| e.adapter.control_mut().mute_indicator())
        {
            indicator.show_muted(muted);
        }
    }

    pub fn set_skip_visible(&mut self, visible: bool) {
        for id in self.with_capability(Capabilities::SKIP) {
            self.set_skip_visible_to(id, visible);
        }
    }

    pub fn set_skip_visible_to(&mut self, id: AdapterId, visible: bool) {
        if let Some(skip) = self
            .entries
            .get_mut(&id)
            .and_then(|e| e.adapter.control_mut().skip_control())
        {
            skip.set_skip_visible(visible);
        }
    }
}
