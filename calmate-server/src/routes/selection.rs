//! Selection endpoints: the open event modal and chat panel

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, put},
};

use calmate_core::{CalendarEvent, Selection, UserProfile};

use crate::routes::{AppError, require_session};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/selection", get(get_selection))
        .route("/selection/event", put(select_event).delete(clear_event))
        .route(
            "/selection/participant",
            put(select_participant).delete(clear_participant),
        )
}

/// GET /selection - both slots at once
async fn get_selection(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Selection>, AppError> {
    let session = require_session(&state, &headers).await?;
    Ok(Json(session.selection()))
}

/// PUT /selection/event
async fn select_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<CalendarEvent>,
) -> Result<StatusCode, AppError> {
    let session = require_session(&state, &headers).await?;
    session.select_event(Some(event));
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /selection/event
async fn clear_event(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let session = require_session(&state, &headers).await?;
    session.select_event(None);
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /selection/participant
async fn select_participant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(participant): Json<UserProfile>,
) -> Result<StatusCode, AppError> {
    let session = require_session(&state, &headers).await?;
    session.select_participant(Some(participant));
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /selection/participant
async fn clear_participant(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let session = require_session(&state, &headers).await?;
    session.select_participant(None);
    Ok(StatusCode::NO_CONTENT)
}
