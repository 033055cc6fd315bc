//! InMemory RelayRepository 実装
//!
//! ドメイン層が定義する RelayRepository trait の具体的な実装。
//! [`Registry`] を単一の `Mutex` で包み、ユーザー表とチャンネル表を常に
//! 同じロックの下で変更します。チャンネルのメンバーはユーザー表への参照
//! （ID）なので、表ごとに別々のロックを持つことはできません。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Channel, ChannelName, DepartStatus, Departure, JoinSnapshot, Registry, RegistryError,
    RelayRepository, Timestamp, User, UserId,
};

/// インメモリ RelayRepository 実装
pub struct InMemoryRelayRepository {
    registry: Arc<Mutex<Registry>>,
}

impl InMemoryRelayRepository {
    pub fn new(registry: Arc<Mutex<Registry>>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl RelayRepository for InMemoryRelayRepository {
    async fn register_user(&self, user: User) -> Result<(), RegistryError> {
        let mut registry = self.registry.lock().await;
        registry.register_user(user)
    }

    async fn lookup_user(&self, id: &UserId) -> Option<User> {
        let registry = self.registry.lock().await;
        registry.lookup_user(id).cloned()
    }

    async fn resolve_channel(&self, name: &ChannelName) -> Option<Channel> {
        let registry = self.registry.lock().await;
        registry.resolve_channel(name).cloned()
    }

    async fn join_channel(
        &self,
        name: &ChannelName,
        user: &UserId,
        now: Timestamp,
    ) -> JoinSnapshot {
        let mut registry = self.registry.lock().await;
        registry.join(name, user, now)
    }

    async fn depart_channel(&self, name: &ChannelName, user: &UserId) -> DepartStatus {
        let mut registry = self.registry.lock().await;
        registry.depart(name, user)
    }

    async fn purge_user(&self, id: &UserId) -> Vec<Departure> {
        let mut registry = self.registry.lock().await;
        registry.purge_user(id)
    }

    async fn list_channels(&self) -> Vec<Channel> {
        let registry = self.registry.lock().await;
        registry.channels().into_iter().cloned().collect()
    }

    async fn user_count(&self) -> usize {
        let registry = self.registry.lock().await;
        registry.user_count()
    }
}
