//! Chat endpoints: summaries, messages, read receipts, notification

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use calmate_core::{ChatMessage, ChatSummary, Notification};

use crate::routes::{AppError, require_session};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chats", get(list_chats))
        .route(
            "/chats/{counterpart}/messages",
            get(list_messages).post(send_message),
        )
        .route("/chats/{counterpart}/read", post(mark_read))
        .route("/notification", get(notification).delete(clear_notification))
}

/// GET /chats - the reconciled chat list, newest first
async fn list_chats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ChatSummary>>, AppError> {
    let session = require_session(&state, &headers).await?;
    Ok(Json(session.chat_list()))
}

/// GET /chats/:counterpart/messages - conversation, oldest first
async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(counterpart): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let session = require_session(&state, &headers).await?;
    Ok(Json(session.messages_with(&counterpart)))
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// POST /chats/:counterpart/messages
async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(counterpart): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ChatMessage>, AppError> {
    let session = require_session(&state, &headers).await?;
    let message = session.send_message(&counterpart, &req.message).await?;
    Ok(Json(message))
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub updated: usize,
}

/// POST /chats/:counterpart/read - flip that counterpart's unread messages
/// and zero the local counter
async fn mark_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(counterpart): Path<String>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let session = require_session(&state, &headers).await?;
    let updated = session.mark_chat_as_read(&counterpart).await?;
    Ok(Json(MarkReadResponse { updated }))
}

/// GET /notification - current new-message signal
///
/// Fetching a resolved notification counts as displaying it.
async fn notification(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Notification>, AppError> {
    let session = require_session(&state, &headers).await?;
    if matches!(session.notification(), Notification::Resolved { .. }) {
        session.mark_notification_displayed();
    }
    Ok(Json(session.notification()))
}

/// DELETE /notification - explicit consumer acknowledgement
async fn clear_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let session = require_session(&state, &headers).await?;
    session.clear_notification();
    Ok(StatusCode::NO_CONTENT)
}
