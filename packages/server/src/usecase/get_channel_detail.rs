//! UseCase: チャンネル詳細取得

use std::sync::Arc;

use crate::domain::{Channel, ChannelName, RelayRepository};

use super::error::GetChannelDetailError;

/// チャンネル詳細取得のユースケース
pub struct GetChannelDetailUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
}

impl GetChannelDetailUseCase {
    pub fn new(repository: Arc<dyn RelayRepository>) -> Self {
        Self { repository }
    }

    /// 名前でチャンネルを取得する
    pub async fn execute(&self, name: String) -> Result<Channel, GetChannelDetailError> {
        let channel_name = ChannelName::new(name.clone())
            .map_err(|_| GetChannelDetailError::NotFound(name.clone()))?;
        self.repository
            .resolve_channel(&channel_name)
            .await
            .ok_or(GetChannelDetailError::NotFound(name))
    }
}
