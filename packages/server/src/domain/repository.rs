//! Repository trait 定義
//!
//! ドメイン層が必要とするレジストリ操作のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ユーザー表とチャンネル表は相互参照するため、複数段の読み書きを伴う操作
//! （join / depart / purge）は 1 回の呼び出しに畳み込み、実装側が単一の
//! ロックの下で実行します。

use async_trait::async_trait;

use super::entity::{Channel, DepartStatus, Departure, JoinSnapshot, User};
use super::error::RegistryError;
use super::value_object::{ChannelName, Timestamp, UserId};

/// Relay registry trait: the authoritative "who is online" and "who is in
/// what" tables behind one interface.
#[async_trait]
pub trait RelayRepository: Send + Sync {
    /// Insert a newly connected user; the id must not already exist.
    async fn register_user(&self, user: User) -> Result<(), RegistryError>;

    /// Look up a connected user by id.
    async fn lookup_user(&self, id: &UserId) -> Option<User>;

    /// Resolve a channel by name.
    async fn resolve_channel(&self, name: &ChannelName) -> Option<Channel>;

    /// Join a user to a channel, creating the channel if absent; captures
    /// the membership before and after under one mutation.
    async fn join_channel(
        &self,
        name: &ChannelName,
        user: &UserId,
        now: Timestamp,
    ) -> JoinSnapshot;

    /// Remove a user from a channel, deleting it if it becomes empty.
    async fn depart_channel(&self, name: &ChannelName, user: &UserId) -> DepartStatus;

    /// Remove a user from the user table and every channel containing it.
    /// Idempotent; returns one departure per affected channel.
    async fn purge_user(&self, id: &UserId) -> Vec<Departure>;

    /// All channels, sorted by name.
    async fn list_channels(&self) -> Vec<Channel>;

    /// 接続中のユーザー数を取得
    async fn user_count(&self) -> usize;
}
