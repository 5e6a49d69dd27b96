//! Command line chat client.
//!
//! Connects to a material group chat or a direct chat with an access token
//! and sends lines from stdin. `/typing on|off` and `/read <id>...` send
//! typing indicators and read receipts. Reconnects on disconnection (max 5
//! attempts with 5 second interval) unless the server rejected the handshake.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin classchat-client -- --token $TOKEN --material 3f1c...
//! cargo run --bin classchat-client -- -t $TOKEN --direct 42
//! ```

use clap::{ArgGroup, Parser};

use classchat_client::RoomSelector;
use classchat_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "classchat-client")]
#[command(about = "Chat client for classroom material and direct rooms", long_about = None)]
#[command(group(ArgGroup::new("room").required(true).args(["material", "direct"])))]
struct Args {
    /// Access token issued by the classroom backend
    #[arg(short = 't', long, env = "CLASSCHAT_TOKEN", hide_env_values = true)]
    token: String,

    /// Material id (UUID) whose group chat to join
    #[arg(short = 'm', long)]
    material: Option<String>,

    /// User id to chat with directly
    #[arg(short = 'd', long)]
    direct: Option<i64>,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8000")]
    url: String,
}

impl Args {
    fn room(&self) -> Option<RoomSelector> {
        match (&self.material, self.direct) {
            (Some(material), None) => Some(RoomSelector::Material(material.clone())),
            (None, Some(user_id)) => Some(RoomSelector::Direct(user_id)),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let Some(room) = args.room() else {
        tracing::error!("Pass exactly one of --material or --direct");
        std::process::exit(2);
    };

    // Run the client
    if let Err(e) = classchat_client::run_client(args.url, args.token, room).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
