//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{AuthorizationOracle, IdentityVerifier, MessageStore, RoomRegistry, UserDirectory},
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetDirectInboxUseCase,
        GetMessageHistoryUseCase, GetRoomsUseCase, PostMessageUseCase, RelaySignalUseCase,
        SendMessageUseCase,
    },
};

use super::{
    handler::{
        direct_history, direct_inbox, direct_websocket_handler, get_rooms, health_check,
        material_history, material_websocket_handler, post_direct_message,
        post_material_message,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// External collaborators the chat core depends on
pub struct Collaborators {
    pub verifier: Arc<dyn IdentityVerifier>,
    pub users: Arc<dyn UserDirectory>,
    pub oracle: Arc<dyn AuthorizationOracle>,
    pub store: Arc<dyn MessageStore>,
    pub registry: Arc<dyn RoomRegistry>,
}

/// WebSocket chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(ServerConfig::default(), collaborators);
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server, wiring the usecases onto `collaborators`
    pub fn new(config: ServerConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            verifier,
            users,
            oracle,
            store,
            registry,
        } = collaborators;

        let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
            verifier,
            users,
            oracle,
            registry.clone(),
        ));
        let disconnect_participant_usecase =
            Arc::new(DisconnectParticipantUseCase::new(registry.clone()));
        let send_message_usecase =
            Arc::new(SendMessageUseCase::new(store.clone(), registry.clone()));
        let relay_signal_usecase = Arc::new(RelaySignalUseCase::new(registry.clone()));
        let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(registry.clone()));
        let get_message_history_usecase = Arc::new(GetMessageHistoryUseCase::new(
            connect_participant_usecase.clone(),
            store.clone(),
            config.history_limit,
        ));
        let get_direct_inbox_usecase = Arc::new(GetDirectInboxUseCase::new(
            connect_participant_usecase.clone(),
            store,
            config.history_limit,
        ));
        let post_message_usecase = Arc::new(PostMessageUseCase::new(
            connect_participant_usecase.clone(),
            send_message_usecase.clone(),
        ));

        let state = Arc::new(AppState {
            connect_participant_usecase,
            disconnect_participant_usecase,
            send_message_usecase,
            relay_signal_usecase,
            get_rooms_usecase,
            get_message_history_usecase,
            get_direct_inbox_usecase,
            post_message_usecase,
            registry,
            outbound_buffer: config.outbound_buffer.max(1),
        });

        Self { config, state }
    }

    /// Build the HTTP / WebSocket router
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws/material/{material_id}", get(material_websocket_handler))
            .route("/ws/material/{material_id}/", get(material_websocket_handler))
            .route("/ws/direct/{other_user_id}", get(direct_websocket_handler))
            .route("/ws/direct/{other_user_id}/", get(direct_websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route(
                "/api/chat/material/{material_id}/messages",
                get(material_history).post(post_material_message),
            )
            .route("/api/chat/direct/messages", get(direct_inbox))
            .route(
                "/api/chat/direct/{other_user_id}/messages",
                get(direct_history).post(post_direct_message),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the chat server until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        // Bind the server to the host and port
        let bind_addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        let local_addr = listener.local_addr()?;
        tracing::info!("Chat server listening on {}", local_addr);
        tracing::info!("Material rooms: ws://{}/ws/material/{{material_id}}/", local_addr);
        tracing::info!("Direct rooms:   ws://{}/ws/direct/{{other_user_id}}/", local_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
