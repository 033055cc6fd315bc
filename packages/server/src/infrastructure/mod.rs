//! Infrastructure layer: concrete implementations of the domain interfaces
//! plus the DTOs of the HTTP observation API.

pub mod dto;
pub mod message_pusher;
pub mod repository;
