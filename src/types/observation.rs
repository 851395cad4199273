use serde::{Deserialize, Serialize};
use crate::types::price::Price;
use crate::types::timestamp::Timestamp;

/// A single price reading.
///
/// Equality is over the full `(timestamp, value)` pair: a new price at an
/// already-seen timestamp is a distinct observation, and so is the same
/// price at a new timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: Timestamp,
    pub value: Price,
}

impl Observation {
    pub fn new(timestamp: Timestamp, value: Price) -> Self {
        Observation { timestamp, value }
    }
}

/// One line of rendered output: an observation plus its 1-based position in
/// the window, oldest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowRow {
    pub position: usize,
    pub observation: Observation,
}
