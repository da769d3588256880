//! Metro route planner and live train simulation server.
//!
//! Loads a metro network from CSV data, answers shortest-route and fare
//! queries over it, and runs a tick-driven simulation of trains moving
//! along planned routes, streaming position updates to WebSocket
//! subscribers.

pub mod domain;
pub mod fare;
pub mod loader;
pub mod network;
pub mod planner;
pub mod sim;
pub mod web;
