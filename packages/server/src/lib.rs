//! Kakehashi relay server library.
//!
//! Clients hold persistent WebSocket connections to this server, join named
//! channels, broadcast to every channel member, send direct point-to-point
//! messages and heartbeat. The wire protocol lives in `kakehashi-shared`.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
