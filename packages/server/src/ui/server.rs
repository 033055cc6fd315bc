//! Server execution logic.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::domain::MessagePusher;
use crate::usecase::{
    ConnectUserUseCase, DisconnectUserUseCase, GetChannelDetailUseCase, GetChannelsUseCase,
    JoinChannelUseCase, LeaveChannelUseCase, RelayMessageUseCase,
};

use super::{
    handler::{get_channel_detail, get_channels, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket relay server
///
/// Wires the use cases into an axum router and runs it.
pub struct Server {
    connect_user_usecase: Arc<ConnectUserUseCase>,
    disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    join_channel_usecase: Arc<JoinChannelUseCase>,
    leave_channel_usecase: Arc<LeaveChannelUseCase>,
    relay_message_usecase: Arc<RelayMessageUseCase>,
    get_channels_usecase: Arc<GetChannelsUseCase>,
    get_channel_detail_usecase: Arc<GetChannelDetailUseCase>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl Server {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connect_user_usecase: Arc<ConnectUserUseCase>,
        disconnect_user_usecase: Arc<DisconnectUserUseCase>,
        join_channel_usecase: Arc<JoinChannelUseCase>,
        leave_channel_usecase: Arc<LeaveChannelUseCase>,
        relay_message_usecase: Arc<RelayMessageUseCase>,
        get_channels_usecase: Arc<GetChannelsUseCase>,
        get_channel_detail_usecase: Arc<GetChannelDetailUseCase>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            connect_user_usecase,
            disconnect_user_usecase,
            join_channel_usecase,
            leave_channel_usecase,
            relay_message_usecase,
            get_channels_usecase,
            get_channel_detail_usecase,
            message_pusher,
        }
    }

    /// Build the axum router. Exposed separately from [`Server::run`] so
    /// integration tests can serve it on an ephemeral port.
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            connect_user_usecase: self.connect_user_usecase,
            disconnect_user_usecase: self.disconnect_user_usecase,
            join_channel_usecase: self.join_channel_usecase,
            leave_channel_usecase: self.leave_channel_usecase,
            relay_message_usecase: self.relay_message_usecase,
            get_channels_usecase: self.get_channels_usecase,
            get_channel_detail_usecase: self.get_channel_detail_usecase,
            message_pusher: self.message_pusher,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/channels", get(get_channels))
            .route("/api/channels/{name}", get(get_channel_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the relay server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "WebSocket relay server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
