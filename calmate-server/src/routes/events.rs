//! Event endpoints and the month-grid view helper

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use calmate_core::{CalendarDay, CalendarEvent, CalmateError, EventDraft, view};

use crate::routes::{AppError, require_session};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", put(update_event).delete(delete_event))
        .route("/grid/month", get(month_grid))
}

/// GET /events - the reconciled event list
async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    let session = require_session(&state, &headers).await?;
    Ok(Json(session.events()))
}

/// POST /events - create an event owned by the caller
///
/// Returns null when an identical `(title, start, end)` event already
/// exists; the insert is silently skipped.
async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<EventDraft>,
) -> Result<Json<Option<CalendarEvent>>, AppError> {
    let session = require_session(&state, &headers).await?;
    if !draft.span_is_valid() {
        return Err(CalmateError::InvalidSpan.into());
    }
    let created = session.add_event(draft).await?;
    Ok(Json(created))
}

/// PUT /events/:id - full-document replace, owner only
async fn update_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut event): Json<CalendarEvent>,
) -> Result<Json<CalendarEvent>, AppError> {
    let session = require_session(&state, &headers).await?;
    if !event.span_is_valid() {
        return Err(CalmateError::InvalidSpan.into());
    }
    event.id = id;
    session.update_event(&event).await?;
    Ok(Json(event))
}

/// DELETE /events/:id
async fn delete_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let session = require_session(&state, &headers).await?;
    session.delete_event(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct GridQuery {
    /// Cursor date; defaults to today.
    pub date: Option<NaiveDate>,
}

/// GET /grid/month?date=YYYY-MM-DD - week-aligned month grid with the
/// caller's events placed on their days
async fn month_grid(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<GridQuery>,
) -> Result<Json<Vec<CalendarDay>>, AppError> {
    let session = require_session(&state, &headers).await?;
    let today = Utc::now().date_naive();
    let cursor = query.date.unwrap_or(today);
    let grid = view::month_grid(cursor, today, &session.events());
    Ok(Json(grid))
}
