//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - クライアントへのフレーム送信（push_to）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は接続ごとの sender を預かり、フレームの送信に使用します。
//! 送信失敗（受信側タスクの終了）は「その接続が死んでいる」ことを意味し、
//! 呼び出し側が切断処理を起動できるようエラーとして返します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{MessagePushError, MessagePusher, PusherChannel, UserId};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// 接続中クライアントの sender
    ///
    /// Key: user id (String)
    /// Value: PusherChannel
    clients: Arc<Mutex<HashMap<String, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new(clients: Arc<Mutex<HashMap<String, PusherChannel>>>) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, client_id: UserId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(client_id.as_str().to_string(), sender);
        tracing::debug!("Client '{}' registered to MessagePusher", client_id);
    }

    async fn unregister_client(&self, client_id: &UserId) {
        let mut clients = self.clients.lock().await;
        clients.remove(client_id.as_str());
        tracing::debug!("Client '{}' unregistered from MessagePusher", client_id);
    }

    async fn push_to(&self, client_id: &UserId, content: &str) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let Some(sender) = clients.get(client_id.as_str()) else {
            return Err(MessagePushError::ClientNotFound(
                client_id.as_str().to_string(),
            ));
        };
        sender
            .send(content.to_string())
            .map_err(|_| MessagePushError::PushFailed(client_id.as_str().to_string()))?;
        tracing::trace!("<{}", content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn create_test_pusher() -> (
        WebSocketMessagePusher,
        Arc<Mutex<HashMap<String, PusherChannel>>>,
    ) {
        let clients = Arc::new(Mutex::new(HashMap::new()));
        let pusher = WebSocketMessagePusher::new(clients.clone());
        (pusher, clients)
    }

    fn uid(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 登録済みクライアントにフレームを送信できる
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let alice = uid("alice");
        pusher.register_client(alice.clone(), tx).await;

        // when (操作):
        let result = pusher.push_to(&alice, r#"[0,"IDENT","alice"]"#).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some(r#"[0,"IDENT","alice"]"#.to_string()));
    }

    #[tokio::test]
    async fn test_push_to_unknown_client() {
        // テスト項目: 未登録クライアントへの送信は ClientNotFound
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();

        // when (操作):
        let result = pusher.push_to(&uid("nobody"), "frame").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ClientNotFound("nobody".to_string()))
        );
    }

    #[tokio::test]
    async fn test_push_to_closed_connection_fails() {
        // テスト項目: 受信側が終了した接続への送信は PushFailed になる
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx, rx) = mpsc::unbounded_channel();
        let alice = uid("alice");
        pusher.register_client(alice.clone(), tx).await;
        drop(rx); // 接続の writer タスクが終了した状態

        // when (操作):
        let result = pusher.push_to(&alice, "frame").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::PushFailed("alice".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unregister_client_drops_sender() {
        // テスト項目: 登録解除後の送信は ClientNotFound になり、解除は冪等
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx, _rx) = mpsc::unbounded_channel();
        let alice = uid("alice");
        pusher.register_client(alice.clone(), tx).await;

        // when (操作):
        pusher.unregister_client(&alice).await;
        pusher.unregister_client(&alice).await;

        // then (期待する結果):
        assert!(matches!(
            pusher.push_to(&alice, "frame").await,
            Err(MessagePushError::ClientNotFound(_))
        ));
    }
}
