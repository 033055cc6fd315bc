//! Error types of the use case layer. The WebSocket handler maps these onto
//! wire error replies; the command connection stays open.

use thiserror::Error;

/// Failure to register a newly connected user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    /// The generated identifier collided with a connected user. With 128-bit
    /// random ids this is unreachable in practice.
    #[error("generated user id '{0}' is already registered")]
    IdentityCollision(String),
}

/// JOIN failures (wire code `ENOENT`).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("no such channel '{0}'")]
    ChannelNotFound(String),
}

/// LEAVE failures, in validation order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LeaveError {
    /// Wire code `EINVAL`.
    #[error("channel name is required")]
    MissingChannel,
    /// Wire code `ENOENT`.
    #[error("no such channel '{0}'")]
    ChannelNotFound(String),
    /// Wire code `NOT_IN_CHAN`.
    #[error("not a member of channel '{0}'")]
    NotInChannel(String),
}

/// MSG failures (wire code `ENOENT`).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("message target is required")]
    MissingTarget,
    #[error("no such channel or user '{0}'")]
    TargetNotFound(String),
}

/// Channel detail lookup failures (HTTP 404).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GetChannelDetailError {
    #[error("no such channel '{0}'")]
    NotFound(String),
}
