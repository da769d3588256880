//! HTTP and WebSocket API.

pub mod dto;
mod routes;
mod state;
mod ws;

pub use routes::create_router;
pub use state::AppState;
