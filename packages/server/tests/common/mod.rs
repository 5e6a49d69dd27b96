//! Shared helpers for the integration tests.
//!
//! `TestServer` runs the real router in-process on an ephemeral port with the
//! JWT verifier and in-memory collaborators. Fixture users:
//!
//! | id | name | role |
//! |---|---|---|
//! | 1 | teacher | teaches the classroom owning `material` |
//! | 2 | alice | enrolled |
//! | 3 | bob | enrolled |
//! | 4 | mallory | exists, not enrolled |

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use jsonwebtoken::{EncodingKey, Header, encode};
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};
use uuid::Uuid;

use classchat_server::{
    config::ServerConfig,
    domain::{MaterialId, RoomKey, RoomRegistry, UserId},
    infrastructure::{
        auth::JwtIdentityVerifier,
        dto::websocket::OutboundEvent,
        registry::InMemoryRoomRegistry,
        repository::{InMemoryDirectory, InMemoryMessageStore},
    },
    ui::{Collaborators, Server},
};

pub const SECRET: &str = "integration-secret";
pub const TEACHER: i64 = 1;
pub const ALICE: i64 = 2;
pub const BOB: i64 = 3;
pub const MALLORY: i64 = 4;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

pub fn user(id: i64) -> UserId {
    UserId::new(id).unwrap()
}

/// HS256 access token for `user_id`, valid for an hour
pub fn token_for(user_id: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    encode(
        &Header::default(),
        &serde_json::json!({"user_id": user_id, "token_type": "access", "exp": exp}),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// Helper struct to manage an in-process server
pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub material: MaterialId,
    pub registry: Arc<InMemoryRoomRegistry>,
    pub store: Arc<InMemoryMessageStore>,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with the default outbound buffer
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        let directory = Arc::new(InMemoryDirectory::new());
        let classroom = Uuid::new_v4();
        let material = MaterialId::from_uuid(Uuid::new_v4());
        for (id, name) in [
            (TEACHER, "teacher"),
            (ALICE, "alice"),
            (BOB, "bob"),
            (MALLORY, "mallory"),
        ] {
            directory.add_user(user(id), name).await;
        }
        directory.add_classroom(classroom, user(TEACHER)).await;
        directory.add_material(material, classroom).await;
        directory.enroll(user(ALICE), classroom).await;
        directory.enroll(user(BOB), classroom).await;

        let registry = Arc::new(InMemoryRoomRegistry::new());
        let store = Arc::new(InMemoryMessageStore::new());
        let collaborators = Collaborators {
            verifier: Arc::new(JwtIdentityVerifier::new(SECRET, directory.clone())),
            users: directory.clone(),
            oracle: directory,
            store: store.clone(),
            registry: registry.clone(),
        };
        let app = Server::new(config, collaborators).router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            material,
            registry,
            store,
            task,
        }
    }

    pub fn material_room(&self) -> RoomKey {
        RoomKey::material(self.material)
    }

    pub fn material_url(&self, user_id: i64) -> String {
        format!(
            "ws://{}/ws/material/{}/?token={}",
            self.addr,
            self.material,
            token_for(user_id)
        )
    }

    pub fn direct_url(&self, user_id: i64, other_user_id: i64) -> String {
        format!(
            "ws://{}/ws/direct/{}/?token={}",
            self.addr,
            other_user_id,
            token_for(user_id)
        )
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait until `room` has exactly `count` joined sessions
    pub async fn wait_for_members(&self, room: &RoomKey, count: usize) {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        while self.registry.member_count(room).await != count {
            if tokio::time::Instant::now() > deadline {
                panic!(
                    "room {} has {} member(s), expected {}",
                    room,
                    self.registry.member_count(room).await,
                    count
                );
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Helper struct wrapping a WebSocket connection
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(url: &str) -> Result<Self, tungstenite::Error> {
        let (stream, _response) = connect_async(url).await?;
        Ok(Self { stream })
    }

    /// HTTP status of a rejected handshake, or `None` if it was accepted
    pub async fn rejection_status(url: &str) -> Option<u16> {
        match connect_async(url).await {
            Ok(_) => None,
            Err(tungstenite::Error::Http(response)) => Some(response.status().as_u16()),
            Err(e) => panic!("unexpected connection error: {}", e),
        }
    }

    pub async fn send_json(&mut self, value: serde_json::Value) {
        self.stream
            .send(Message::Text(value.to_string().into()))
            .await
            .unwrap();
    }

    pub async fn send_binary(&mut self, data: Vec<u8>) {
        self.stream.send(Message::Binary(data.into())).await.unwrap();
    }

    /// Next outbound event; panics after a timeout
    pub async fn recv_event(&mut self) -> OutboundEvent {
        self.try_recv_event(RECV_TIMEOUT)
            .await
            .expect("timed out waiting for an event")
    }

    /// Next outbound event within `timeout`, skipping control frames
    pub async fn try_recv_event(&mut self, timeout: Duration) -> Option<OutboundEvent> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let frame = tokio::time::timeout_at(deadline, self.stream.next())
                .await
                .ok()??;
            match frame.ok()? {
                Message::Text(text) => return Some(OutboundEvent::decode(text.as_str()).unwrap()),
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    /// Assert that nothing arrives for a short while
    pub async fn expect_silence(&mut self) {
        if let Some(event) = self.try_recv_event(Duration::from_millis(200)).await {
            panic!("unexpected event: {:?}", event);
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
