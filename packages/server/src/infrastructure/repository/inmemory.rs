//! In-memory collaborators for tests and local demos.
//!
//! `InMemoryDirectory` plays the classroom backend (users, classrooms,
//! materials, enrollments) and `InMemoryMessageStore` keeps chat messages in
//! process memory.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use classchat_shared::time::{Clock, SystemClock};

use crate::domain::{
    AuthorizationOracle, ChatMessage, Identity, MaterialId, MessageId, MessageStore,
    NewChatMessage, RepositoryError, RoomKey, Timestamp, UserDirectory, UserId,
};

#[derive(Debug, Default)]
struct DirectoryData {
    /// user id → display name
    users: HashMap<UserId, String>,
    /// classroom id → teacher
    classrooms: HashMap<Uuid, UserId>,
    /// material id → owning classroom
    materials: HashMap<MaterialId, Uuid>,
    enrollments: HashSet<(UserId, Uuid)>,
}

/// Users, classrooms, materials and enrollments held in memory
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    data: RwLock<DirectoryData>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user_id: UserId, display_name: impl Into<String>) {
        self.data
            .write()
            .await
            .users
            .insert(user_id, display_name.into());
    }

    pub async fn add_classroom(&self, classroom_id: Uuid, teacher: UserId) {
        self.data
            .write()
            .await
            .classrooms
            .insert(classroom_id, teacher);
    }

    pub async fn add_material(&self, material_id: MaterialId, classroom_id: Uuid) {
        self.data
            .write()
            .await
            .materials
            .insert(material_id, classroom_id);
    }

    pub async fn enroll(&self, user_id: UserId, classroom_id: Uuid) {
        self.data
            .write()
            .await
            .enrollments
            .insert((user_id, classroom_id));
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find(&self, user_id: UserId) -> Result<Option<Identity>, RepositoryError> {
        let data = self.data.read().await;
        Ok(data
            .users
            .get(&user_id)
            .map(|name| Identity::new(user_id, name.clone())))
    }
}

#[async_trait]
impl AuthorizationOracle for InMemoryDirectory {
    async fn material_exists(&self, material_id: MaterialId) -> Result<bool, RepositoryError> {
        Ok(self.data.read().await.materials.contains_key(&material_id))
    }

    async fn is_material_member(
        &self,
        user_id: UserId,
        material_id: MaterialId,
    ) -> Result<bool, RepositoryError> {
        let data = self.data.read().await;
        let Some(classroom_id) = data.materials.get(&material_id) else {
            return Ok(false);
        };
        let is_teacher = data.classrooms.get(classroom_id) == Some(&user_id);
        Ok(is_teacher || data.enrollments.contains(&(user_id, *classroom_id)))
    }
}

#[derive(Debug, Default)]
struct StoreData {
    last_id: i64,
    messages: Vec<ChatMessage>,
}

/// Append-only message store held in memory
pub struct InMemoryMessageStore {
    data: Mutex<StoreData>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageStore {
    /// Create a store stamping messages with the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a store stamping messages with `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            data: Mutex::new(StoreData::default()),
            clock,
        }
    }

    /// Every stored message of `room`, oldest first
    pub async fn messages_in(&self, room: &RoomKey) -> Vec<ChatMessage> {
        self.data
            .lock()
            .await
            .messages
            .iter()
            .filter(|m| &m.room == room)
            .cloned()
            .collect()
    }

    /// Total number of stored messages
    pub async fn len(&self) -> usize {
        self.data.lock().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: NewChatMessage) -> Result<ChatMessage, RepositoryError> {
        let mut data = self.data.lock().await;
        data.last_id += 1;
        let stored = ChatMessage::from_new(
            message,
            MessageId::new(data.last_id),
            Timestamp::new(self.clock.now_millis()),
        );
        data.messages.push(stored.clone());
        Ok(stored)
    }

    async fn recent(
        &self,
        room: RoomKey,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let data = self.data.lock().await;
        let mut recent: Vec<ChatMessage> = data
            .messages
            .iter()
            .rev()
            .filter(|m| m.room == room)
            .take(limit)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }

    async fn direct_inbox(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let data = self.data.lock().await;
        let mut inbox: Vec<ChatMessage> = data
            .messages
            .iter()
            .rev()
            .filter(|m| matches!(m.room, RoomKey::Direct { .. }))
            .filter(|m| m.sender.user_id == user_id || m.recipient == Some(user_id))
            .take(limit)
            .cloned()
            .collect();
        inbox.reverse();
        Ok(inbox)
    }
}
