//! DTOs for the HTTP observation API.

pub mod http;
