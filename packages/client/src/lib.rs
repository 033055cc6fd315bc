//! Kakehashi relay client library.
//!
//! An interactive command-line client: `/join`, `/leave`, `/msg` and `/ping`
//! commands plus bare-line sends to the most recently joined channel.

pub mod command;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod ui;
