use std::collections::VecDeque;
use crate::types::observation::{Observation, WindowRow};

/// The most recent distinct observations, oldest first, bounded to
/// `capacity` entries with FIFO eviction.
#[derive(Clone, Debug)]
pub struct RollingWindow {
    entries: VecDeque<Observation>,
    capacity: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        RollingWindow {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Returns `true` when the observation was accepted, i.e. it is not equal
    /// on `(timestamp, value)` to anything currently held. Accepting the
    /// `capacity + 1`-th entry evicts the oldest.
    pub fn offer(&mut self, observation: Observation) -> bool {
        if self.entries.contains(&observation) {
            return false;
        }

        self.entries.push_back(observation);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    /// Window contents labeled with their 1-based position in insertion order.
    pub fn rows(&self) -> Vec<WindowRow> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, observation)| WindowRow { position: i + 1, observation: *observation })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
