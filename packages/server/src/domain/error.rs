//! Error types for the relay domain.

use thiserror::Error;

/// Violations of value object invariants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("user id must not be empty")]
    EmptyUserId,
    #[error("user id must be at most 64 characters, got {0}")]
    UserIdTooLong(usize),
    #[error("channel name must not be empty")]
    EmptyChannelName,
    #[error("channel name must be at most 128 characters, got {0}")]
    ChannelNameTooLong(usize),
}

/// Errors raised by registry mutation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The identifier is already present among connected users. The identity
    /// generator makes this unreachable in practice.
    #[error("user '{0}' is already registered")]
    DuplicateUserId(String),
}

/// Errors raised when pushing a message to a client connection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessagePushError {
    #[error("client '{0}' is not registered")]
    ClientNotFound(String),
    #[error("failed to push message to client '{0}'")]
    PushFailed(String),
}
