//! Planned routes.

use crate::domain::{Metric, StationId};

/// A planned route from origin to destination, inclusive.
///
/// Invariants, upheld by [`plan`](super::plan):
/// - `stations` is non-empty; a same-station request yields a single
///   station and no edges;
/// - consecutive stations are joined by a connection that exists in the
///   graph the route was planned against;
/// - `edge_times` has exactly one entry per consecutive pair, the travel
///   time in minutes of the connection used.
///
/// Carrying the per-edge times here means the simulation can follow a route
/// without ever consulting the graph again.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Station sequence, origin first.
    pub stations: Vec<StationId>,
    /// Minutes per traversed connection; `stations.len() - 1` entries.
    pub edge_times: Vec<f64>,
    /// The metric the route was optimised for.
    pub metric: Metric,
    /// Total travel time in minutes, whichever metric was used.
    pub total_time_min: f64,
    /// Fare for the origin/destination pair, when the schedule has one.
    /// Attached by the caller; planning itself never touches fares.
    pub fare: Option<f64>,
}

impl Route {
    /// Number of connections traversed (0 for a single-station route).
    pub fn total_stops(&self) -> usize {
        self.stations.len().saturating_sub(1)
    }

    /// The total cost under the metric the route was planned for.
    pub fn cost(&self) -> f64 {
        match self.metric {
            Metric::Stops => self.total_stops() as f64,
            Metric::Time => self.total_time_min,
        }
    }

    /// First station of the route.
    pub fn origin(&self) -> StationId {
        self.stations[0]
    }

    /// Last station of the route.
    pub fn destination(&self) -> StationId {
        *self.stations.last().expect("route is never empty")
    }

    /// Attach a fare amount.
    pub fn with_fare(mut self, fare: f64) -> Self {
        self.fare = Some(fare);
        self
    }
}
