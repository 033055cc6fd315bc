//! UI layer: the axum router, WebSocket and HTTP handlers, and process
//! shutdown wiring.

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::Server;
