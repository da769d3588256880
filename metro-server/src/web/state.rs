//! Application state for the web layer.

use std::sync::Arc;

use crate::fare::FareTable;
use crate::network::NetworkGraph;
use crate::sim::SimulationEngine;

/// Shared application state.
///
/// The graph and fare table are immutable after load; the engine
/// synchronises internally. Everything is constructed once in `main` and
/// shared by reference; there are no process-wide singletons.
#[derive(Clone)]
pub struct AppState {
    /// The loaded metro network
    pub graph: Arc<NetworkGraph>,

    /// Fare schedule for the network
    pub fares: Arc<FareTable>,

    /// Live train simulation
    pub engine: Arc<SimulationEngine>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(graph: NetworkGraph, fares: FareTable, engine: Arc<SimulationEngine>) -> Self {
        Self {
            graph: Arc::new(graph),
            fares: Arc::new(fares),
            engine,
        }
    }
}
