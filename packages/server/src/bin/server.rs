//! Kakehashi relay server binary.
//!
//! Clients connect over WebSocket, receive a generated identity, and can
//! join channels, broadcast to channel members, direct-message peers and
//! heartbeat.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kakehashi-server
//! cargo run --bin kakehashi-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{collections::HashMap, sync::Arc};

use clap::Parser;
use tokio::sync::Mutex;

use kakehashi_server::{
    domain::Registry,
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRelayRepository,
    },
    ui::Server,
    usecase::{
        ConnectUserUseCase, DisconnectUserUseCase, GetChannelDetailUseCase, GetChannelsUseCase,
        JoinChannelUseCase, LeaveChannelUseCase, RelayMessageUseCase,
    },
};
use kakehashi_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kakehashi-server")]
#[command(about = "WebSocket message relay server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Repository (in-memory registry; rebuilt from zero on restart)
    let registry = Arc::new(Mutex::new(Registry::new()));
    let repository = Arc::new(InMemoryRelayRepository::new(registry));

    // 2. Create MessagePusher (WebSocket implementation)
    let pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(pusher_clients));

    // 3. Create UseCases
    let connect_user_usecase = Arc::new(ConnectUserUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let disconnect_user_usecase = Arc::new(DisconnectUserUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let join_channel_usecase = Arc::new(JoinChannelUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let leave_channel_usecase = Arc::new(LeaveChannelUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let get_channels_usecase = Arc::new(GetChannelsUseCase::new(repository.clone()));
    let get_channel_detail_usecase = Arc::new(GetChannelDetailUseCase::new(repository.clone()));

    // 4. Create and run the server
    let server = Server::new(
        connect_user_usecase,
        disconnect_user_usecase,
        join_channel_usecase,
        leave_channel_usecase,
        relay_message_usecase,
        get_channels_usecase,
        get_channel_detail_usecase,
        message_pusher,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
