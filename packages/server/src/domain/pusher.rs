//! Outbound delivery interface.
//!
//! ドメイン層が必要とするメッセージ送信のインターフェース。
//! 具体的な実装（WebSocket）は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::MessagePushError;
use super::value_object::UserId;

/// Send handle of one client connection. Sends are fire-and-forget: the
/// frame is queued for the connection's writer task and failure surfaces
/// only when the receiving side is gone.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
///
/// Delivery failure means the recipient's connection is dead; callers treat
/// it as that peer having disconnected and never propagate it to the sender
/// of the triggering command.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Associate a connection send handle with a user id.
    async fn register_client(&self, client_id: UserId, sender: PusherChannel);

    /// Drop the send handle for a user id; a no-op for unknown ids.
    async fn unregister_client(&self, client_id: &UserId);

    /// Queue one frame for a single recipient.
    async fn push_to(&self, client_id: &UserId, content: &str) -> Result<(), MessagePushError>;
}
