//! Kakehashi relay client binary.
//!
//! Connects to a relay server, shows the identity the server assigns, and
//! turns `/join`, `/leave`, `/msg` and `/ping` commands (or bare lines) into
//! wire frames. Reconnects on connection loss (max 5 attempts, 5 second
//! interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kakehashi-client
//! cargo run --bin kakehashi-client -- --url ws://example.org:8080/ws
//! ```

use clap::Parser;

use kakehashi_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kakehashi-client")]
#[command(about = "Interactive client for the Kakehashi message relay", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = kakehashi_client::runner::run_client(args.url).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
