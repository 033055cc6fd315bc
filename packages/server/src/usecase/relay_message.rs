//! UseCase: MSG コマンド処理
//!
//! 宛先はまずチャンネル名として、次にユーザー ID として解決します（同名
//! 衝突時はチャンネル優先）。どちらにも解決できなければ ENOENT。

use std::sync::Arc;

use kakehashi_shared::wire;
use serde_json::Value;

use crate::domain::{ChannelName, MessagePusher, RelayRepository, UserId};

use super::broadcast::fan_out;
use super::error::RelayError;

/// Result of a successful MSG.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayOutcome {
    /// Recipients whose delivery failed; the caller disconnects them.
    pub failed: Vec<UserId>,
}

/// MSG コマンドのユースケース
pub struct RelayMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelayMessageUseCase {
    pub fn new(
        repository: Arc<dyn RelayRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// MSG を実行
    ///
    /// # Arguments
    ///
    /// * `sender_id` - 送信者
    /// * `target` - 宛先（チャンネル名またはユーザー ID）
    /// * `payload` - フレームの残り要素（そのまま相手に中継される）
    pub async fn execute(
        &self,
        sender_id: &UserId,
        target: Option<String>,
        payload: Vec<Value>,
    ) -> Result<RelayOutcome, RelayError> {
        let raw = target.ok_or(RelayError::MissingTarget)?;
        let event = wire::message_event(sender_id.as_str(), &payload);

        // 1. チャンネル宛: メンバー全員（送信者も含む）へ参加順に中継
        if let Ok(name) = ChannelName::new(raw.clone())
            && let Some(channel) = self.repository.resolve_channel(&name).await
        {
            let failed =
                fan_out(self.message_pusher.as_ref(), &channel.members, &event).await;
            return Ok(RelayOutcome { failed });
        }

        // 2. ユーザー宛: 直接配信
        if let Ok(user) = UserId::new(raw.clone())
            && self.repository.lookup_user(&user).await.is_some()
        {
            let failed = match self.message_pusher.push_to(&user, &event).await {
                Ok(()) => Vec::new(),
                Err(e) => {
                    tracing::warn!("Failed to push message to client '{}': {}", user, e);
                    vec![user]
                }
            };
            return Ok(RelayOutcome { failed });
        }

        Err(RelayError::TargetNotFound(raw))
    }
}
