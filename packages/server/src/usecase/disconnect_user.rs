//! UseCase: 切断処理
//!
//! 明示的なクローズ・送信失敗・プロトコル違反のいずれで接続が終わっても、
//! この経路がユーザー表と全チャンネルの整合性を回復します。退出通知の配信
//! に失敗した相手も同じ経路で切断するため、再帰ではなく worklist で処理
//! します。

use std::sync::Arc;

use kakehashi_shared::wire;

use crate::domain::{MessagePusher, RelayRepository, UserId};

use super::broadcast::fan_out;

/// 切断処理のユースケース
pub struct DisconnectUserUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectUserUseCase {
    pub fn new(
        repository: Arc<dyn RelayRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 切断処理を実行
    ///
    /// ユーザーを MessagePusher とユーザー表から削除し、所属していた全
    /// チャンネルから退出させます。空になったチャンネルは削除し、残存
    /// メンバーには退出通知をブロードキャストします。冪等です。
    ///
    /// # Returns
    ///
    /// この呼び出しで切断処理を行ったユーザー ID のリスト（通知失敗で
    /// 連鎖的に切断された相手を含む）
    pub async fn execute(&self, user_id: &UserId) -> Vec<UserId> {
        let mut queue = vec![user_id.clone()];
        let mut dropped: Vec<UserId> = Vec::new();

        while let Some(id) = queue.pop() {
            if dropped.contains(&id) {
                continue;
            }
            dropped.push(id.clone());

            // Dropping the sender ends the connection's writer task, which
            // attempts the graceful close.
            self.message_pusher.unregister_client(&id).await;

            let departures = self.repository.purge_user(&id).await;
            for departure in departures {
                if departure.remaining.is_empty() {
                    tracing::info!("Removing empty channel '{}'", departure.channel);
                    continue;
                }
                tracing::info!("Removing '{}' from channel '{}'", id, departure.channel);
                let notice = wire::quit_event(
                    id.as_str(),
                    departure.channel.as_str(),
                    wire::QUIT_REASON,
                );
                let failed = fan_out(
                    self.message_pusher.as_ref(),
                    &departure.remaining,
                    &notice,
                )
                .await;
                queue.extend(failed);
            }
        }

        dropped
    }
}
