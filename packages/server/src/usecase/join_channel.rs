//! UseCase: JOIN コマンド処理
//!
//! 名前付き JOIN は既存チャンネルにのみ参加でき、名前なし JOIN は生成名で
//! チャンネルを作ります。参加者本人には既存メンバーのロスターを参加順で
//! 送り、その後チャンネル全体（本人を含む）に参加を通知します。

use std::sync::Arc;

use kakehashi_shared::{time::unix_timestamp_millis, wire};

use crate::domain::{
    ChannelName, ChannelNameFactory, MessagePusher, RelayRepository, Timestamp, UserId,
};

use super::broadcast::fan_out;
use super::error::JoinError;

/// Result of a successful JOIN.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub channel: ChannelName,
    /// Whether the channel was created by this join.
    pub created: bool,
    /// Recipients whose delivery failed; the caller disconnects them.
    pub failed: Vec<UserId>,
}

/// JOIN コマンドのユースケース
pub struct JoinChannelUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinChannelUseCase {
    pub fn new(
        repository: Arc<dyn RelayRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// JOIN を実行
    ///
    /// # Arguments
    ///
    /// * `user_id` - 参加するユーザー
    /// * `requested` - クライアントが指定したチャンネル名（省略時は生成）
    pub async fn execute(
        &self,
        user_id: &UserId,
        requested: Option<String>,
    ) -> Result<JoinOutcome, JoinError> {
        // 1. チャンネル名の解決。名前付き JOIN は既存チャンネル必須
        let channel = match requested {
            Some(raw) => {
                let name = ChannelName::new(raw.clone())
                    .map_err(|_| JoinError::ChannelNotFound(raw.clone()))?;
                if self.repository.resolve_channel(&name).await.is_none() {
                    return Err(JoinError::ChannelNotFound(raw));
                }
                name
            }
            None => ChannelNameFactory::generate(),
        };

        // 2. メンバー追加（参加前後のメンバー一覧を 1 回の変更で取得）
        let now = Timestamp::new(unix_timestamp_millis());
        let snapshot = self.repository.join_channel(&channel, user_id, now).await;

        let mut failed: Vec<UserId> = Vec::new();

        // 3. 参加者本人に既存メンバーのロスターを参加順で送る
        for member in &snapshot.existing {
            let notice = wire::join_event(member.as_str(), channel.as_str());
            if let Err(e) = self.message_pusher.push_to(user_id, &notice).await {
                tracing::warn!("Failed to send roster to '{}': {}", user_id, e);
                failed.push(user_id.clone());
                break;
            }
        }

        // 4. チャンネル全体（本人を含む）に参加を通知
        let event = wire::join_event(user_id.as_str(), channel.as_str());
        for id in fan_out(self.message_pusher.as_ref(), &snapshot.members, &event).await {
            if !failed.contains(&id) {
                failed.push(id);
            }
        }

        tracing::info!("Client '{}' joined channel '{}'", user_id, channel);
        Ok(JoinOutcome {
            channel,
            created: snapshot.created,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Registry;
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRelayRepository,
    };
    use std::collections::HashMap;
    use tokio::sync::{Mutex, mpsc};

    struct TestBed {
        usecase: JoinChannelUseCase,
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
            usecase: JoinChannelUseCase::new(repository.clone(), pusher.clone()),
            repository,
            pusher,
        }
    }

    fn uid(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    async fn register(bed: &TestBed, id: &str) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        bed.pusher.register_client(uid(id), tx).await;
        rx
    }

    #[tokio::test]
    async fn test_join_without_name_creates_channel() {
        // テスト項目: 名前なし JOIN で生成名のチャンネルが作られ、本人に
        //             参加通知が届く
        // given (前提条件):
        let bed = create_test_bed();
        let mut alice_rx = register(&bed, "alice").await;

        // when (操作):
        let outcome = bed.usecase.execute(&uid("alice"), None).await.unwrap();

        // then (期待する結果):
        assert!(outcome.created);
        assert!(outcome.failed.is_empty());
        let event = alice_rx.recv().await.unwrap();
        assert_eq!(
            event,
            format!(r#"[0,"alice","JOIN","{}"]"#, outcome.channel.as_str())
        );
        let channel = bed
            .repository
            .resolve_channel(&outcome.channel)
            .await
            .unwrap();
        assert_eq!(channel.members, vec![uid("alice")]);
    }

    #[tokio::test]
    async fn test_join_named_nonexistent_channel_fails() {
        // テスト項目: 存在しないチャンネルへの名前付き JOIN は ENOENT に
        //             なり、チャンネルは作られない
        // given (前提条件):
        let bed = create_test_bed();
        let _alice_rx = register(&bed, "alice").await;

        // when (操作):
        let result = bed
            .usecase
            .execute(&uid("alice"), Some("foo".to_string()))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinError::ChannelNotFound("foo".to_string())));
        assert!(bed.repository.list_channels().await.is_empty());
    }

    #[tokio::test]
    async fn test_join_sends_roster_then_broadcast() {
        // テスト項目: 後から参加した人にはロスターが参加順で届き、既存
        //             メンバーには参加通知が届く
        // given (前提条件): alice と bob が lobby に参加済み
        let bed = create_test_bed();
        let mut alice_rx = register(&bed, "alice").await;
        let mut bob_rx = register(&bed, "bob").await;
        let mut charlie_rx = register(&bed, "charlie").await;

        let outcome = bed.usecase.execute(&uid("alice"), None).await.unwrap();
        let lobby = outcome.channel.as_str().to_string();
        alice_rx.recv().await.unwrap(); // alice の参加通知を読み捨てる
        bed.usecase
            .execute(&uid("bob"), Some(lobby.clone()))
            .await
            .unwrap();
        alice_rx.recv().await.unwrap(); // bob の参加通知
        bob_rx.recv().await.unwrap(); // ロスター (alice)
        bob_rx.recv().await.unwrap(); // bob の参加通知

        // when (操作): charlie が参加する
        bed.usecase
            .execute(&uid("charlie"), Some(lobby.clone()))
            .await
            .unwrap();

        // then (期待する結果): charlie にはロスター2件 + 参加通知1件
        assert_eq!(
            charlie_rx.recv().await.unwrap(),
            format!(r#"[0,"alice","JOIN","{lobby}"]"#)
        );
        assert_eq!(
            charlie_rx.recv().await.unwrap(),
            format!(r#"[0,"bob","JOIN","{lobby}"]"#)
        );
        let broadcast = format!(r#"[0,"charlie","JOIN","{lobby}"]"#);
        assert_eq!(charlie_rx.recv().await.unwrap(), broadcast);

        // 既存メンバーには参加通知のみ
        assert_eq!(alice_rx.recv().await.unwrap(), broadcast);
        assert_eq!(bob_rx.recv().await.unwrap(), broadcast);
    }

    #[tokio::test]
    async fn test_repeat_join_does_not_duplicate_membership() {
        // テスト項目: 同じチャンネルへの再 JOIN でメンバーが重複しない
        // given (前提条件):
        let bed = create_test_bed();
        let _alice_rx = register(&bed, "alice").await;
        let outcome = bed.usecase.execute(&uid("alice"), None).await.unwrap();

        // when (操作):
        bed.usecase
            .execute(&uid("alice"), Some(outcome.channel.as_str().to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        let channel = bed
            .repository
            .resolve_channel(&outcome.channel)
            .await
            .unwrap();
        assert_eq!(channel.members, vec![uid("alice")]);
    }

    #[tokio::test]
    async fn test_join_reports_dead_members() {
        // テスト項目: 参加通知の配信に失敗したメンバーが failed に載る
        // given (前提条件): alice の接続が死んでいる
        let bed = create_test_bed();
        let alice_rx = register(&bed, "alice").await;
        let mut bob_rx = register(&bed, "bob").await;
        let outcome = bed.usecase.execute(&uid("alice"), None).await.unwrap();
        drop(alice_rx);

        // when (操作): bob が同じチャンネルに参加する
        let result = bed
            .usecase
            .execute(&uid("bob"), Some(outcome.channel.as_str().to_string()))
            .await
            .unwrap();

        // then (期待する結果): alice が failed として報告され、bob には
        // ロスターと参加通知が届いている
        assert_eq!(result.failed, vec![uid("alice")]);
        assert_eq!(
            bob_rx.recv().await.unwrap(),
            format!(r#"[0,"alice","JOIN","{}"]"#, outcome.channel.as_str())
        );
        assert_eq!(
            bob_rx.recv().await.unwrap(),
            format!(r#"[0,"bob","JOIN","{}"]"#, outcome.channel.as_str())
        );
    }
}
