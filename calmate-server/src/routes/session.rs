//! Sign-in and sign-out endpoints

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use serde::Deserialize;

use calmate_core::Principal;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/session", post(sign_in).delete(sign_out))
}

/// Principal fields handed over by the auth popup flow (which itself is
/// out of scope here).
#[derive(Deserialize)]
pub struct SignInRequest {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// POST /session - open a session for the principal
async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<Principal>, AppError> {
    let principal = Principal {
        id: req.id,
        email: req.email,
        display_name: req.display_name,
        photo_url: req.photo_url,
    };
    state.sign_in(principal.clone()).await?;
    tracing::info!(user = %principal.id, "signed in");
    Ok(Json(principal))
}

/// DELETE /session - tear down the caller's session
async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    let Some(user_id) = headers.get("x-user-id").and_then(|v| v.to_str().ok()) else {
        return StatusCode::BAD_REQUEST;
    };
    if state.sign_out(user_id).await {
        tracing::info!(user = %user_id, "signed out");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
