//! The train simulation engine.
//!
//! Owns every active train and advances them in lock-step on a fixed tick.
//! All mutation of the active set (tick, start, cancel) happens under one
//! mutex, so a tick is atomic as observed by concurrent callers: a train is
//! either fully included in a tick's output or not at all.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::domain::StationId;
use crate::planner::Route;

use super::event::{TrainEvent, TrainId, TrainStatus};
use super::hub::BroadcastHub;

/// Simulation timing parameters.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Wall-clock interval between ticks.
    pub tick_interval: Duration,

    /// Time compression: how many simulated minutes pass per real minute.
    /// 1.0 runs routes in real time; 60.0 turns each route minute into a
    /// wall-clock second.
    pub speed: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            speed: 60.0,
        }
    }
}

/// Error starting a simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// The route has fewer than two stations: nothing to simulate.
    #[error("route has fewer than two stations")]
    EmptyRoute,
}

/// A train in the active set. Mutated only under the engine lock.
#[derive(Debug)]
struct Train {
    id: TrainId,
    route: Route,
    edge: usize,
    progress: f64,
    started_at: DateTime<Utc>,
}

/// Read-only view of an active train, for listing and serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainSnapshot {
    pub train_id: TrainId,
    pub origin: StationId,
    pub destination: StationId,
    pub edge: usize,
    pub progress: f64,
    pub status: TrainStatus,
    pub started_at: DateTime<Utc>,
}

/// What became of one train during one tick.
enum Advance {
    Moved { edge: usize, progress: f64 },
    Completed,
    /// Internal inconsistency; the train must be force-cancelled.
    Corrupt(&'static str),
}

/// The simulation engine.
pub struct SimulationEngine {
    config: SimConfig,
    hub: BroadcastHub,
    trains: Mutex<BTreeMap<TrainId, Train>>,
    next_id: AtomicU64,
}

impl SimulationEngine {
    pub fn new(config: SimConfig, hub: BroadcastHub) -> Self {
        Self {
            config,
            hub,
            trains: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// The hub this engine publishes to.
    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Start simulating a train along `route`.
    ///
    /// The train begins at the route's first station and immediately
    /// publishes its starting position. Routes with fewer than two stations
    /// are rejected: there is no edge to travel.
    pub fn start(&self, route: Route) -> Result<TrainId, SimError> {
        if route.stations.len() < 2 {
            return Err(SimError::EmptyRoute);
        }

        let id = TrainId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let train = Train {
            id,
            route,
            edge: 0,
            progress: 0.0,
            started_at: Utc::now(),
        };

        let mut trains = self.trains.lock().expect("engine lock poisoned");
        info!(train = %id, stops = train.route.total_stops(), "train started");
        self.hub.publish(position_event(&train));
        trains.insert(id, train);

        Ok(id)
    }

    /// Cancel a running train.
    ///
    /// Publishes the train's single terminal event and removes it from the
    /// active set; once this returns, no further events for the train will
    /// be published. Unknown or already-terminal trains are a no-op
    /// (`false`), not an error.
    pub fn cancel(&self, id: TrainId) -> bool {
        let mut trains = self.trains.lock().expect("engine lock poisoned");
        match trains.remove(&id) {
            Some(train) => {
                info!(train = %id, edge = train.edge, "train cancelled");
                self.hub.publish(TrainEvent {
                    train_id: id,
                    edge: train.edge,
                    progress: train.progress,
                    status: TrainStatus::Cancelled,
                    timestamp: Utc::now(),
                });
                true
            }
            None => false,
        }
    }

    /// Advance every active train by `elapsed` wall-clock time.
    ///
    /// Each active train publishes exactly one event per tick: its new
    /// position, or its terminal event if it completed. The whole sweep
    /// runs under the engine lock, so `start`/`cancel` callers never
    /// observe a half-advanced tick.
    pub fn tick(&self, elapsed: Duration) {
        let simulated_min = elapsed.as_secs_f64() * self.config.speed / 60.0;

        let mut trains = self.trains.lock().expect("engine lock poisoned");
        let mut finished: Vec<TrainId> = Vec::new();

        for train in trains.values_mut() {
            match advance(train, simulated_min) {
                Advance::Moved { edge, progress } => {
                    train.edge = edge;
                    train.progress = progress;
                    self.hub.publish(position_event(train));
                }
                Advance::Completed => {
                    debug!(train = %train.id, "train completed");
                    self.hub.publish(TrainEvent {
                        train_id: train.id,
                        edge: train.route.total_stops() - 1,
                        progress: 1.0,
                        status: TrainStatus::Completed,
                        timestamp: Utc::now(),
                    });
                    finished.push(train.id);
                }
                Advance::Corrupt(reason) => {
                    error!(train = %train.id, edge = train.edge, reason, "train state corrupt, force-cancelling");
                    self.hub.publish(TrainEvent {
                        train_id: train.id,
                        edge: train.edge,
                        progress: train.progress,
                        status: TrainStatus::Cancelled,
                        timestamp: Utc::now(),
                    });
                    finished.push(train.id);
                }
            }
        }

        for id in finished {
            trains.remove(&id);
        }
    }

    /// Snapshots of all active trains, ordered by id.
    pub fn active(&self) -> Vec<TrainSnapshot> {
        let trains = self.trains.lock().expect("engine lock poisoned");
        trains
            .values()
            .map(|t| TrainSnapshot {
                train_id: t.id,
                origin: t.route.origin(),
                destination: t.route.destination(),
                edge: t.edge,
                progress: t.progress,
                status: TrainStatus::Running,
                started_at: t.started_at,
            })
            .collect()
    }

    /// Number of active trains.
    pub fn active_count(&self) -> usize {
        self.trains.lock().expect("engine lock poisoned").len()
    }

    /// Drive the tick loop forever at the configured interval.
    ///
    /// Each tick advances by the configured interval regardless of timer
    /// jitter, keeping simulated progress deterministic.
    pub async fn run(self: std::sync::Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.tick_interval);
        interval.tick().await; // First tick is immediate, skip it.
        loop {
            interval.tick().await;
            self.tick(self.config.tick_interval);
        }
    }
}

/// A train's current position as an event.
fn position_event(train: &Train) -> TrainEvent {
    TrainEvent {
        train_id: train.id,
        edge: train.edge,
        progress: train.progress,
        status: TrainStatus::Running,
        timestamp: Utc::now(),
    }
}

/// Advance one train by `simulated_min` minutes of route time.
///
/// Progress past an edge boundary moves the train to the start of the next
/// edge; fractional spill-over is discarded. A route whose embedded edge
/// data is missing or non-finite cannot be advanced safely and is reported
/// as corrupt. Such data cannot come out of the planner; this is a
/// defensive check on an invariant, not an expected path.
fn advance(train: &Train, simulated_min: f64) -> Advance {
    let edge_count = train.route.total_stops();

    let Some(&edge_min) = train.route.edge_times.get(train.edge) else {
        return Advance::Corrupt("edge index out of range of route edge times");
    };
    if !edge_min.is_finite() || edge_min < 0.0 {
        return Advance::Corrupt("edge travel time is negative or non-finite");
    }

    // A zero-minute edge is crossed in a single tick.
    let delta = if edge_min > 0.0 {
        simulated_min / edge_min
    } else {
        1.0
    };

    let progress = train.progress + delta;
    if progress < 1.0 {
        return Advance::Moved {
            edge: train.edge,
            progress,
        };
    }

    let next_edge = train.edge + 1;
    if next_edge >= edge_count {
        Advance::Completed
    } else {
        Advance::Moved {
            edge: next_edge,
            progress: 0.0,
        }
    }
}
