//! Simulation events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a simulated train, unique within an engine's lifetime.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainId(pub u64);

impl fmt::Debug for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrainId({})", self.0)
    }
}

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a simulated train.
///
/// `Running` is the only non-terminal state; a train that reaches
/// `Completed` or `Cancelled` never transitions again and no further
/// events for it are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainStatus {
    Running,
    Completed,
    Cancelled,
}

impl TrainStatus {
    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrainStatus::Completed | TrainStatus::Cancelled)
    }
}

/// One position update for one train.
///
/// `edge` indexes into the train's route (edge `i` joins stations `i` and
/// `i + 1`); `progress` is the fraction of that edge already covered, in
/// `[0, 1)` while running. The event carrying a terminal status is the last
/// event ever published for that train.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainEvent {
    pub train_id: TrainId,
    pub edge: usize,
    pub progress: f64,
    pub status: TrainStatus,
    pub timestamp: DateTime<Utc>,
}
