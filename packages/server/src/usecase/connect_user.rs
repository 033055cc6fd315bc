//! UseCase: 接続受付処理
//!
//! 新しい接続に識別子を割り当て、ユーザー表と MessagePusher に登録し、
//! 本人に `[0, "IDENT", id]` を通知します。

use std::sync::Arc;

use kakehashi_shared::{time::unix_timestamp_millis, wire};

use crate::domain::{
    MessagePusher, PusherChannel, RelayRepository, Timestamp, User, UserId, UserIdFactory,
};

use super::error::ConnectError;

/// Result of accepting a connection.
#[derive(Debug, Clone)]
pub struct ConnectOutcome {
    pub user: User,
    /// Whether the identity announcement reached the connection. `false`
    /// means the connection died before the first frame; the caller runs the
    /// disconnect path.
    pub ident_delivered: bool,
}

/// 接続受付のユースケース
pub struct ConnectUserUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectUserUseCase {
    pub fn new(
        repository: Arc<dyn RelayRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続受付を実行
    ///
    /// # Arguments
    ///
    /// * `addr` - 相手の `ip|port` 表記のアドレス
    /// * `sender` - この接続へのフレーム送信用チャンネル
    pub async fn execute(
        &self,
        addr: String,
        sender: PusherChannel,
    ) -> Result<ConnectOutcome, ConnectError> {
        // 1. 識別子を割り当てて登録
        let id: UserId = UserIdFactory::generate();
        let user = User::new(id.clone(), addr, Timestamp::new(unix_timestamp_millis()));
        self.repository
            .register_user(user.clone())
            .await
            .map_err(|_| ConnectError::IdentityCollision(id.to_string()))?;

        // 2. MessagePusher に sender を登録
        self.message_pusher.register_client(id.clone(), sender).await;

        // 3. 本人に識別子を通知
        let ident = wire::ident_event(id.as_str());
        let ident_delivered = match self.message_pusher.push_to(&id, &ident).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to send IDENT to '{}': {}", id, e);
                false
            }
        };

        tracing::info!("Client '{}' connected from {}", id, user.addr);
        Ok(ConnectOutcome {
            user,
            ident_delivered,
        })
    }
}
