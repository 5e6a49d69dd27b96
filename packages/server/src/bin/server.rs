//! Classroom chat server.
//!
//! Serves material group chats and direct chats over WebSocket, backed by the
//! classroom backend's SQLite database.
//!
//! Run with:
//! ```not_rust
//! CLASSCHAT_JWT_SECRET=... cargo run --bin classchat-server
//! cargo run --bin classchat-server -- --host 0.0.0.0 --port 8000 --database-url sqlite://db.sqlite3
//! ```

use std::sync::Arc;

use clap::Parser;

use classchat_server::{
    config::ServerConfig,
    infrastructure::{
        auth::JwtIdentityVerifier,
        registry::InMemoryRoomRegistry,
        repository::{SqliteDirectory, SqliteMessageStore, sqlite},
    },
    ui::{Collaborators, Server},
};
use classchat_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "classchat-server")]
#[command(about = "Real-time chat server for classroom materials and direct messages", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8000")]
    port: u16,

    /// Database of the classroom backend
    #[arg(long, env = "CLASSCHAT_DATABASE_URL", default_value = "sqlite://db.sqlite3")]
    database_url: String,

    /// Secret the backend signs access tokens with (HS256)
    #[arg(long, env = "CLASSCHAT_JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Outbound queue size per connection; slower clients are disconnected
    #[arg(long, default_value_t = 64)]
    outbound_buffer: usize,

    /// Default number of messages returned by the history endpoints
    #[arg(long, default_value_t = 50)]
    history_limit: usize,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Database pool
    // 2. Collaborators (directory, message store, verifier, room registry)
    // 3. Server

    // 1. Open the backend database
    let pool = match sqlite::connect(&args.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to open {}: {}", args.database_url, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Connected to {}", args.database_url);

    // 2. Create collaborators
    let directory = Arc::new(SqliteDirectory::new(pool.clone()));
    let collaborators = Collaborators {
        verifier: Arc::new(JwtIdentityVerifier::new(&args.jwt_secret, directory.clone())),
        users: directory.clone(),
        oracle: directory,
        store: Arc::new(SqliteMessageStore::new(pool)),
        registry: Arc::new(InMemoryRoomRegistry::new()),
    };

    // 3. Create and run the server
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        outbound_buffer: args.outbound_buffer,
        history_limit: args.history_limit,
    };
    let server = Server::new(config, collaborators);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
