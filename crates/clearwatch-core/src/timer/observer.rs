//! Subscriber registry for timer state.

use std::fmt;

use super::state::TimerState;

/// Callback invoked with every published state.
pub type Observer = Box<dyn FnMut(&TimerState) + Send>;

/// Handle for cancelling one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Observers in registration order.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Observer)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer` and hands it `current` right away.
    pub fn subscribe(&mut self, mut observer: Observer, current: &TimerState) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        observer(current);
        self.entries.push((id, observer));
        id
    }

    /// Returns `false` if `id` was already cancelled.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, state: &TimerState) {
        for (_, observer) in self.entries.iter_mut() {
            observer(state);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}
