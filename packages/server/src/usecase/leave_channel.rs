//! UseCase: LEAVE コマンド処理
//!
//! 検証順序は EINVAL（名前なし）→ ENOENT（チャンネルなし）→ NOT_IN_CHAN
//! （非メンバー）。退出通知は削除前のメンバー全員（本人を含む）に届き、
//! 空になったチャンネルは削除されます。

use std::sync::Arc;

use kakehashi_shared::wire;

use crate::domain::{ChannelName, DepartStatus, MessagePusher, RelayRepository, UserId};

use super::broadcast::fan_out;
use super::error::LeaveError;

/// Result of a successful LEAVE.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveOutcome {
    pub channel: ChannelName,
    /// Whether the channel was deleted because it became empty.
    pub deleted: bool,
    /// Recipients whose delivery failed; the caller disconnects them.
    pub failed: Vec<UserId>,
}

/// LEAVE コマンドのユースケース
pub struct LeaveChannelUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveChannelUseCase {
    pub fn new(
        repository: Arc<dyn RelayRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// LEAVE を実行
    pub async fn execute(
        &self,
        user_id: &UserId,
        requested: Option<String>,
    ) -> Result<LeaveOutcome, LeaveError> {
        // 1. 検証: 名前必須
        let raw = requested.ok_or(LeaveError::MissingChannel)?;
        let name = ChannelName::new(raw.clone())
            .map_err(|_| LeaveError::ChannelNotFound(raw.clone()))?;

        // 2. メンバー削除（通知対象は削除前のメンバー一覧）
        match self.repository.depart_channel(&name, user_id).await {
            DepartStatus::UnknownChannel => Err(LeaveError::ChannelNotFound(raw)),
            DepartStatus::NotAMember => Err(LeaveError::NotInChannel(raw)),
            DepartStatus::Departed {
                recipients,
                deleted,
            } => {
                // 3. 退出通知のブロードキャスト
                let event = wire::leave_event(user_id.as_str(), name.as_str());
                let failed =
                    fan_out(self.message_pusher.as_ref(), &recipients, &event).await;
                if deleted {
                    tracing::info!("Removing empty channel '{}'", name);
                }
                tracing::info!("Client '{}' left channel '{}'", user_id, name);
                Ok(LeaveOutcome {
                    channel: name,
                    deleted,
                    failed,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Registry, Timestamp};
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRelayRepository,
    };
    use std::collections::HashMap;
    use tokio::sync::{Mutex, mpsc};

    struct TestBed {
        usecase: LeaveChannelUseCase,
        repository: Arc<InMemoryRelayRepository>,
        pusher: Arc<WebSocketMessagePusher>,
    }

    fn create_test_bed() -> TestBed {
        let repository = Arc::new(InMemoryRelayRepository::new(Arc::new(Mutex::new(
            Registry::new(),
        ))));
        let pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));
        TestBed {
            usecase: LeaveChannelUseCase::new(repository.clone(), pusher.clone()),
            repository,
            pusher,
        }
    }

    fn uid(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn chan(name: &str) -> ChannelName {
        ChannelName::new(name.to_string()).unwrap()
    }

    async fn register(bed: &TestBed, id: &str) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        bed.pusher.register_client(uid(id), tx).await;
        rx
    }

    #[tokio::test]
    async fn test_leave_validation_order() {
        // テスト項目: 検証順序が EINVAL → ENOENT → NOT_IN_CHAN であること
        // given (前提条件): lobby には alice のみが参加
        let bed = create_test_bed();
        let _alice_rx = register(&bed, "alice").await;
        let _bob_rx = register(&bed, "bob").await;
        bed.repository
            .join_channel(&chan("lobby"), &uid("alice"), Timestamp::new(1000))
            .await;

        // when (操作) / then (期待する結果):
        assert_eq!(
            bed.usecase.execute(&uid("bob"), None).await,
            Err(LeaveError::MissingChannel)
        );
        assert_eq!(
            bed.usecase
                .execute(&uid("bob"), Some("nowhere".to_string()))
                .await,
            Err(LeaveError::ChannelNotFound("nowhere".to_string()))
        );
        assert_eq!(
            bed.usecase
                .execute(&uid("bob"), Some("lobby".to_string()))
                .await,
            Err(LeaveError::NotInChannel("lobby".to_string()))
        );
    }

    #[tokio::test]
    async fn test_leave_broadcasts_to_membership_including_leaver() {
        // テスト項目: 退出通知が本人を含む全メンバーに届く
        // given (前提条件):
        let bed = create_test_bed();
        let mut alice_rx = register(&bed, "alice").await;
        let mut bob_rx = register(&bed, "bob").await;
        bed.repository
            .join_channel(&chan("lobby"), &uid("alice"), Timestamp::new(1000))
            .await;
        bed.repository
            .join_channel(&chan("lobby"), &uid("bob"), Timestamp::new(1001))
            .await;

        // when (操作):
        let outcome = bed
            .usecase
            .execute(&uid("alice"), Some("lobby".to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!outcome.deleted);
        let event = r#"[0,"alice","LEAVE","lobby"]"#;
        assert_eq!(alice_rx.recv().await.unwrap(), event);
        assert_eq!(bob_rx.recv().await.unwrap(), event);
        let lobby = bed.repository.resolve_channel(&chan("lobby")).await.unwrap();
        assert_eq!(lobby.members, vec![uid("bob")]);
    }

    #[tokio::test]
    async fn test_leave_deletes_empty_channel() {
        // テスト項目: 最後のメンバーの LEAVE でチャンネルが削除される
        // given (前提条件):
        let bed = create_test_bed();
        let _alice_rx = register(&bed, "alice").await;
        bed.repository
            .join_channel(&chan("lobby"), &uid("alice"), Timestamp::new(1000))
            .await;

        // when (操作):
        let outcome = bed
            .usecase
            .execute(&uid("alice"), Some("lobby".to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(outcome.deleted);
        assert!(bed.repository.resolve_channel(&chan("lobby")).await.is_none());
    }
}
