//! Client execution logic with reconnection support.

use std::time::Duration;

use crate::domain::{RoomSelector, connect_url, should_attempt_reconnect, should_exit_immediately};

use super::session::run_client_session;

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the WebSocket client with reconnection logic
///
/// Exits the process with status 1 when the server rejects the handshake or
/// when every reconnection attempt fails.
pub async fn run_client(
    base_url: String,
    token: String,
    room: RoomSelector,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = connect_url(&base_url, &room, &token);
    let label = room.to_string();
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} on {} (attempt {}/{})",
            label,
            base_url,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&url, &label).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                break;
            }
            Err(e) => {
                if should_exit_immediately(&e) {
                    tracing::error!("{}", e);
                    tracing::error!("Check the token and that you may join {}. Exiting.", label);
                    std::process::exit(1);
                }

                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    std::process::exit(1);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }

    Ok(())
}
