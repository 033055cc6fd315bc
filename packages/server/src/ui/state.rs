//! Server state shared across handlers.

use std::sync::Arc;

use crate::domain::MessagePusher;
use crate::usecase::{
    ConnectUserUseCase, DisconnectUserUseCase, GetChannelDetailUseCase, GetChannelsUseCase,
    JoinChannelUseCase, LeaveChannelUseCase, RelayMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectUserUseCase（接続受付のユースケース）
    pub connect_user_usecase: Arc<ConnectUserUseCase>,
    /// DisconnectUserUseCase（切断処理のユースケース）
    pub disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    /// JoinChannelUseCase（JOIN コマンドのユースケース）
    pub join_channel_usecase: Arc<JoinChannelUseCase>,
    /// LeaveChannelUseCase（LEAVE コマンドのユースケース）
    pub leave_channel_usecase: Arc<LeaveChannelUseCase>,
    /// RelayMessageUseCase（MSG コマンドのユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    /// GetChannelsUseCase（チャンネル一覧のユースケース）
    pub get_channels_usecase: Arc<GetChannelsUseCase>,
    /// GetChannelDetailUseCase（チャンネル詳細のユースケース）
    pub get_channel_detail_usecase: Arc<GetChannelDetailUseCase>,
    /// 直接応答（PONG / ERROR）の送信に使う MessagePusher
    pub message_pusher: Arc<dyn MessagePusher>,
}
