//! HTTP API endpoint handlers: read-only views over the registries.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use kakehashi_shared::time::timestamp_to_rfc3339;

use crate::infrastructure::dto::http::{ChannelDetailDto, ChannelSummaryDto};
use crate::ui::state::AppState;
use crate::usecase::GetChannelDetailError;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get the list of channels
pub async fn get_channels(State(state): State<Arc<AppState>>) -> Json<Vec<ChannelSummaryDto>> {
    let channels = state.get_channels_usecase.execute().await;

    // Domain Model から DTO への変換
    let summaries: Vec<ChannelSummaryDto> = channels
        .into_iter()
        .map(|channel| ChannelSummaryDto {
            name: channel.name.as_str().to_string(),
            member_count: channel.member_count(),
            created_at: timestamp_to_rfc3339(channel.created_at.value()),
        })
        .collect();

    Json(summaries)
}

/// Get channel detail by name
pub async fn get_channel_detail(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ChannelDetailDto>, StatusCode> {
    match state.get_channel_detail_usecase.execute(name).await {
        Ok(channel) => {
            // Domain Model から DTO への変換
            let detail = ChannelDetailDto {
                name: channel.name.as_str().to_string(),
                members: channel
                    .members
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
                created_at: timestamp_to_rfc3339(channel.created_at.value()),
            };
            Ok(Json(detail))
        }
        Err(GetChannelDetailError::NotFound(_)) => Err(StatusCode::NOT_FOUND),
    }
}
