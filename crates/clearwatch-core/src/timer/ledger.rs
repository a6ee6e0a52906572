use std::collections::{HashSet, VecDeque};

/// Completion keys already processed this session.
///
/// Unbounded unless a capacity is set, in which case the oldest keys are
/// forgotten first.
#[derive(Debug, Clone, Default)]
pub struct CompletionLedger {
    seen: HashSet<String>,
    order: VecDeque<String>,
    capacity: Option<usize>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::default()
        }
    }

    /// Records `key`; `false` if it was already known.
    pub fn insert(&mut self, key: String) -> bool {
        if self.seen.contains(&key) {
            return false;
        }
        if let Some(capacity) = self.capacity {
            while self.order.len() >= capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.seen.remove(&oldest);
                }
            }
            self.order.push_back(key.clone());
        }
        self.seen.insert(key);
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
