//! SQLite collaborators backed by the classroom backend's database.
//!
//! The backend owns the schema. Tables read or written here:
//!
//! | table | used columns |
//! |---|---|
//! | `api_user` | `id`, `username` |
//! | `api_classroom` | `id`, `teacher_id` |
//! | `api_material` | `id`, `classroom_id` |
//! | `api_enrollment` | `user_id`, `classroom_id` |
//! | `api_classchatmessage` | `id`, `material_id`, `sender_id`, `content`, `timestamp` |
//! | `api_directchatmessage` | `id`, `sender_id`, `recipient_id`, `content`, `timestamp` |
//!
//! UUID keys are stored as 32 hex digits without hyphens, datetimes as
//! `YYYY-MM-DD HH:MM:SS.ffffff` text in UTC.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

use classchat_shared::time::{Clock, SystemClock, sql_to_timestamp, timestamp_to_sql};

use crate::domain::{
    AuthorizationOracle, ChatMessage, Identity, MaterialId, MessageBody, MessageId,
    MessageStore, NewChatMessage, RepositoryError, RoomKey, Timestamp, UserDirectory, UserId,
};

fn storage(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn material_key(material_id: MaterialId) -> String {
    material_id.as_uuid().simple().to_string()
}

/// Open a connection pool for `database_url` (e.g. `sqlite://db.sqlite3`)
pub async fn connect(database_url: &str) -> Result<SqlitePool, RepositoryError> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(storage)
}

/// Users and material membership read from the backend tables
#[derive(Clone)]
pub struct SqliteDirectory {
    pool: SqlitePool,
}

impl SqliteDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for SqliteDirectory {
    async fn find(&self, user_id: UserId) -> Result<Option<Identity>, RepositoryError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT username FROM api_user WHERE id = ?")
            .bind(user_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        Ok(row.map(|(username,)| Identity::new(user_id, username)))
    }
}

#[async_trait]
impl AuthorizationOracle for SqliteDirectory {
    async fn material_exists(&self, material_id: MaterialId) -> Result<bool, RepositoryError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM api_material WHERE id = ?")
            .bind(material_key(material_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        Ok(row.is_some())
    }

    async fn is_material_member(
        &self,
        user_id: UserId,
        material_id: MaterialId,
    ) -> Result<bool, RepositoryError> {
        let (member,): (i64,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1
                FROM api_material m
                JOIN api_classroom c ON c.id = m.classroom_id
                WHERE m.id = ?
                  AND (c.teacher_id = ?
                       OR EXISTS (SELECT 1 FROM api_enrollment e
                                  WHERE e.classroom_id = c.id AND e.user_id = ?))
            )",
        )
        .bind(material_key(material_id))
        .bind(user_id.value())
        .bind(user_id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;
        Ok(member != 0)
    }
}

/// Chat messages appended to the backend's chat tables
pub struct SqliteMessageStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

/// `(id, sender_id, username, recipient_id, content, timestamp)`
type MessageRow = (i64, i64, String, Option<i64>, String, String);

impl SqliteMessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Rebuild a stored message. `room` is `None` for direct rows read outside
    /// a single room; their key comes from sender and recipient.
    fn to_message(room: Option<RoomKey>, row: MessageRow) -> Result<ChatMessage, RepositoryError> {
        let (id, sender_id, username, recipient_id, content, timestamp) = row;
        let corrupt = |what: String| RepositoryError::CorruptRow(format!("message {}: {}", id, what));

        let sender = UserId::new(sender_id).map_err(|e| corrupt(e.to_string()))?;
        let recipient = recipient_id
            .map(UserId::new)
            .transpose()
            .map_err(|e| corrupt(e.to_string()))?;
        let room = match (room, recipient) {
            (Some(room), _) => room,
            (None, Some(recipient)) => RoomKey::direct(sender, recipient),
            (None, None) => return Err(corrupt("direct message without recipient".to_string())),
        };
        let body = MessageBody::from_stored(content);
        let created_at = sql_to_timestamp(&timestamp)
            .ok_or_else(|| corrupt(format!("bad timestamp '{}'", timestamp)))?;

        Ok(ChatMessage {
            id: MessageId::new(id),
            room,
            sender: Identity::new(sender, username),
            recipient,
            body,
            created_at: Timestamp::new(created_at),
        })
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn append(&self, message: NewChatMessage) -> Result<ChatMessage, RepositoryError> {
        let now = self.clock.now_millis();
        let timestamp = timestamp_to_sql(now);

        let result = match message.room {
            RoomKey::Material(material_id) => sqlx::query(
                "INSERT INTO api_classchatmessage (material_id, sender_id, content, timestamp)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(material_key(material_id))
            .bind(message.sender.user_id.value())
            .bind(message.body.as_str())
            .bind(&timestamp),
            RoomKey::Direct { .. } => {
                let recipient = message.recipient.ok_or_else(|| {
                    RepositoryError::Storage(format!(
                        "user {} is not a member of {}",
                        message.sender.user_id, message.room
                    ))
                })?;
                sqlx::query(
                    "INSERT INTO api_directchatmessage (sender_id, recipient_id, content, timestamp)
                     VALUES (?, ?, ?, ?)",
                )
                .bind(message.sender.user_id.value())
                .bind(recipient.value())
                .bind(message.body.as_str())
                .bind(&timestamp)
            }
        }
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        let id = MessageId::new(result.last_insert_rowid());
        // Stored text keeps microseconds, so millisecond values survive a round trip.
        Ok(ChatMessage::from_new(message, id, Timestamp::new(now)))
    }

    async fn recent(
        &self,
        room: RoomKey,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows: Vec<MessageRow> = match room {
            RoomKey::Material(material_id) => sqlx::query_as(
                "SELECT m.id, m.sender_id, u.username, NULL, m.content, m.timestamp
                 FROM api_classchatmessage m
                 JOIN api_user u ON u.id = m.sender_id
                 WHERE m.material_id = ?
                 ORDER BY m.id DESC
                 LIMIT ?",
            )
            .bind(material_key(material_id))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?,
            RoomKey::Direct { low, high } => sqlx::query_as(
                "SELECT m.id, m.sender_id, u.username, m.recipient_id, m.content, m.timestamp
                 FROM api_directchatmessage m
                 JOIN api_user u ON u.id = m.sender_id
                 WHERE (m.sender_id = ? AND m.recipient_id = ?)
                    OR (m.sender_id = ? AND m.recipient_id = ?)
                 ORDER BY m.id DESC
                 LIMIT ?",
            )
            .bind(low.value())
            .bind(high.value())
            .bind(high.value())
            .bind(low.value())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?,
        };

        rows.into_iter()
            .rev()
            .map(|row| Self::to_message(Some(room), row))
            .collect()
    }

    async fn direct_inbox(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT m.id, m.sender_id, u.username, m.recipient_id, m.content, m.timestamp
             FROM api_directchatmessage m
             JOIN api_user u ON u.id = m.sender_id
             WHERE m.sender_id = ? OR m.recipient_id = ?
             ORDER BY m.id DESC
             LIMIT ?",
        )
        .bind(user_id.value())
        .bind(user_id.value())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.into_iter()
            .rev()
            .map(|row| Self::to_message(None, row))
            .collect()
    }
}
