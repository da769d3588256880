//! Shortest-path route planning.
//!
//! Answers "how do I get from A to B" over the immutable network graph,
//! minimising either hop count or travel time. Planning is a pure function
//! of (graph, origin, destination, metric): no state, no side effects, safe
//! to call concurrently.

mod route;
mod search;

pub use route::Route;
pub use search::{PlanError, plan};
