pub mod chats;
pub mod events;
pub mod selection;
pub mod session;
pub mod users;

use std::sync::Arc;

use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use calmate_core::{CalmateError, Session};

use crate::state::AppState;

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert core errors to HTTP responses
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<CalmateError> for AppError {
    fn from(err: CalmateError) -> Self {
        let status = match &err {
            CalmateError::NotSignedIn(_) => StatusCode::UNAUTHORIZED,
            CalmateError::NotOwner(_) => StatusCode::FORBIDDEN,
            CalmateError::NotFound(_) => StatusCode::NOT_FOUND,
            CalmateError::InvalidSpan => StatusCode::BAD_REQUEST,
            CalmateError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError {
            status,
            message: err.to_string(),
        }
    }
}

/// The session whose principal the `x-user-id` header names.
pub async fn require_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Arc<Session>, AppError> {
    let user_id = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::from(CalmateError::NotSignedIn("missing x-user-id header".into()))
        })?;

    state.session(user_id).await.ok_or_else(|| {
        AppError::from(CalmateError::NotSignedIn(format!(
            "no active session for {user_id}"
        )))
    })
}
