//! HTTP API response DTOs.

use serde::Serialize;

/// One row of `GET /api/channels`.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummaryDto {
    pub name: String,
    pub member_count: usize,
    pub created_at: String,
}

/// Response of `GET /api/channels/{name}`.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelDetailDto {
    pub name: String,
    /// Member user ids in join order.
    pub members: Vec<String>,
    pub created_at: String,
}
