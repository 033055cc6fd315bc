//! Use cases: one struct per relay operation, wired with the repository and
//! the message pusher through `Arc<dyn Trait>`.

pub mod broadcast;
pub mod connect_user;
pub mod disconnect_user;
pub mod error;
pub mod get_channel_detail;
pub mod get_channels;
pub mod join_channel;
pub mod leave_channel;
pub mod relay_message;

pub use connect_user::{ConnectOutcome, ConnectUserUseCase};
pub use disconnect_user::DisconnectUserUseCase;
pub use error::{ConnectError, GetChannelDetailError, JoinError, LeaveError, RelayError};
pub use get_channel_detail::GetChannelDetailUseCase;
pub use get_channels::GetChannelsUseCase;
pub use join_channel::{JoinChannelUseCase, JoinOutcome};
pub use leave_channel::{LeaveChannelUseCase, LeaveOutcome};
pub use relay_message::{RelayMessageUseCase, RelayOutcome};
