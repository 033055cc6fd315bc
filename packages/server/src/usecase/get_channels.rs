//! UseCase: チャンネル一覧取得

use std::sync::Arc;

use crate::domain::{Channel, RelayRepository};

/// チャンネル一覧取得のユースケース
pub struct GetChannelsUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
}

impl GetChannelsUseCase {
    pub fn new(repository: Arc<dyn RelayRepository>) -> Self {
        Self { repository }
    }

    /// 全チャンネルを名前順で返す
    pub async fn execute(&self) -> Vec<Channel> {
        self.repository.list_channels().await
    }
}
