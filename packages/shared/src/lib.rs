//! Shared library for the Kakehashi message relay.
//!
//! Holds the wire protocol (order-significant JSON array envelopes) plus the
//! logging and time utilities used by both the server and the client.

pub mod logger;
pub mod time;
pub mod wire;
