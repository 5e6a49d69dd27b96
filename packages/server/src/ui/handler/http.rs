//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;

use crate::{
    domain::{MaterialId, RoomTarget, UserId},
    infrastructure::dto::http::{
        DirectInboxDto, HistoryMessageDto, MessageHistoryDto, PostMessageRequest, RoomSummaryDto,
    },
    ui::state::AppState,
    usecase::{GetMessageHistoryError, PostMessageError, SendMessageError},
};

use super::{credential, status_for};

/// Query parameters of the history endpoints
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub token: Option<String>,
}

/// Query parameters of the post endpoints
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of live rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.into_iter().map(RoomSummaryDto::from).collect())
}

/// Recent messages of a material room
pub async fn material_history(
    State(state): State<Arc<AppState>>,
    Path(material_id): Path<String>,
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
) -> Result<Json<MessageHistoryDto>, StatusCode> {
    let material_id = material_id
        .parse::<MaterialId>()
        .map_err(|_| StatusCode::NOT_FOUND)?;
    history(state, RoomTarget::Material(material_id), query, &headers).await
}

/// Recent messages of the caller's direct room with another user
pub async fn direct_history(
    State(state): State<Arc<AppState>>,
    Path(other_user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
) -> Result<Json<MessageHistoryDto>, StatusCode> {
    let peer = other_user_id
        .parse::<UserId>()
        .map_err(|_| StatusCode::NOT_FOUND)?;
    history(state, RoomTarget::Direct(peer), query, &headers).await
}

async fn history(
    state: Arc<AppState>,
    target: RoomTarget,
    query: HistoryQuery,
    headers: &HeaderMap,
) -> Result<Json<MessageHistoryDto>, StatusCode> {
    let token = credential(query.token, headers);
    match state
        .get_message_history_usecase
        .execute(token.as_deref(), target, query.limit)
        .await
    {
        Ok(history) => Ok(Json(MessageHistoryDto::new(history.room, history.messages))),
        Err(GetMessageHistoryError::Access(e)) => {
            tracing::warn!("History request rejected: {}", e);
            Err(status_for(&e))
        }
        Err(GetMessageHistoryError::StoreFailed(_)) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Direct messages sent or received by the caller, across every peer
pub async fn direct_inbox(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
) -> Result<Json<DirectInboxDto>, StatusCode> {
    let token = credential(query.token, &headers);
    match state
        .get_direct_inbox_usecase
        .execute(token.as_deref(), query.limit)
        .await
    {
        Ok(inbox) => Ok(Json(DirectInboxDto::new(inbox.owner.user_id, inbox.messages))),
        Err(GetMessageHistoryError::Access(e)) => {
            tracing::warn!("Inbox request rejected: {}", e);
            Err(status_for(&e))
        }
        Err(GetMessageHistoryError::StoreFailed(_)) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Post a message to a material room as the caller
pub async fn post_material_message(
    State(state): State<Arc<AppState>>,
    Path(material_id): Path<String>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    Json(request): Json<PostMessageRequest>,
) -> Result<(StatusCode, Json<HistoryMessageDto>), StatusCode> {
    let material_id = material_id
        .parse::<MaterialId>()
        .map_err(|_| StatusCode::NOT_FOUND)?;
    post(state, RoomTarget::Material(material_id), query, &headers, request).await
}

/// Post a direct message to another user as the caller
pub async fn post_direct_message(
    State(state): State<Arc<AppState>>,
    Path(other_user_id): Path<String>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    Json(request): Json<PostMessageRequest>,
) -> Result<(StatusCode, Json<HistoryMessageDto>), StatusCode> {
    let peer = other_user_id
        .parse::<UserId>()
        .map_err(|_| StatusCode::NOT_FOUND)?;
    post(state, RoomTarget::Direct(peer), query, &headers, request).await
}

async fn post(
    state: Arc<AppState>,
    target: RoomTarget,
    query: TokenQuery,
    headers: &HeaderMap,
    request: PostMessageRequest,
) -> Result<(StatusCode, Json<HistoryMessageDto>), StatusCode> {
    let token = credential(query.token, headers);
    match state
        .post_message_usecase
        .execute(token.as_deref(), target, request.message)
        .await
    {
        Ok(stored) => Ok((StatusCode::CREATED, Json(HistoryMessageDto::from(stored)))),
        Err(PostMessageError::Access(e)) => {
            tracing::warn!("Post request rejected: {}", e);
            Err(status_for(&e))
        }
        Err(PostMessageError::Rejected(SendMessageError::StoreFailed(_))) => {
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(PostMessageError::Rejected(e)) => {
            tracing::debug!("Post request invalid: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
    }
}
