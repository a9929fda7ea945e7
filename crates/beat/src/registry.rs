use std::collections::{BTreeMap, HashMap};

use road_common::ListenerId;

/// One emitted pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub index: u64,
    /// Set for indices configured as scene-wide pulses.
    pub scene: bool,
}

/// What a listener wants after handling a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Drop the listener.
    Done,
    /// Keep the listener and deliver the given later pulse to it.
    Rearm(u64),
}

type Callback = Box<dyn FnMut(&Pulse) -> Reaction>;

/// Pulse subscriptions: a map from pulse index to the listeners waiting on it.
///
/// Listeners fire in registration order. A listener registered for an index
/// that has already been emitted never fires and is discarded on the next
/// dispatch.
#[derive(Default)]
pub struct PulseRegistry {
    callbacks: HashMap<ListenerId, Callback>,
    armed: HashMap<ListenerId, u64>,
    schedule: BTreeMap<u64, Vec<ListenerId>>,
}

impl PulseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for pulse `index`.
    pub fn register<F>(&mut self, index: u64, callback: F) -> ListenerId
    where
        F: FnMut(&Pulse) -> Reaction + 'static,
    {
        let id = ListenerId::new();
        self.callbacks.insert(id, Box::new(callback));
        self.arm(id, index);
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let Some(index) = self.armed.remove(&id) else {
            return false;
        };
        self.callbacks.remove(&id);
        self.disarm(id, index);
        true
    }

    /// Move a registered listener to a different pulse index.
    pub fn rearm(&mut self, id: ListenerId, index: u64) -> bool {
        let Some(previous) = self.armed.get(&id).copied() else {
            return false;
        };
        self.disarm(id, previous);
        self.arm(id, index);
        true
    }

    /// Pulse index a listener is waiting on.
    pub fn armed_index(&self, id: ListenerId) -> Option<u64> {
        self.armed.get(&id).copied()
    }

    /// Number of listeners waiting on `index`.
    pub fn listeners_at(&self, index: u64) -> usize {
        self.schedule.get(&index).map_or(0, Vec::len)
    }

    /// Total registered listeners.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Deliver `pulse` to everyone waiting on its index. Returns the number
    /// of listeners notified.
    pub fn dispatch(&mut self, pulse: &Pulse) -> usize {
        let later = self.schedule.split_off(&(pulse.index + 1));
        let due = std::mem::replace(&mut self.schedule, later);

        let mut notified = 0;
        for (index, ids) in due {
            if index < pulse.index {
                for id in ids {
                    tracing::debug!(?id, index, "dropping listener for past pulse");
                    self.armed.remove(&id);
                    self.callbacks.remove(&id);
                }
                continue;
            }
            for id in ids {
                self.armed.remove(&id);
                let Some(mut callback) = self.callbacks.remove(&id) else {
                    continue;
                };
                notified += 1;
                match callback(pulse) {
                    Reaction::Done => {}
                    Reaction::Rearm(next) => {
                        if next <= pulse.index {
                            tracing::debug!(?id, next, "listener re-armed for a past pulse");
                        }
                        self.callbacks.insert(id, callback);
                        self.arm(id, next);
                    }
                }
            }
        }
        notified
    }

    fn arm(&mut self, id: ListenerId, index: u64) {
        self.armed.insert(id, index);
        self.schedule.entry(index).or_default().push(id);
    }

    fn disarm(&mut self, id: ListenerId, index: u64) {
        if let Some(ids) = self.schedule.get_mut(&index) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.schedule.remove(&index);
            }
        }
    }
}

impl std::fmt::Debug for PulseRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PulseRegistry")
            .field("listeners", &self.callbacks.len())
            .field("schedule", &self.schedule)
            .finish()
    }
}
