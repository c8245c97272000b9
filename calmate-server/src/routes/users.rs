//! User search endpoint

use axum::{Json, Router, extract::Query, extract::State, routing::get};
use serde::Deserialize;
use tracing::warn;

use calmate_core::{UserProfile, search};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/users/search", get(search_users))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /users/search?q=term - substring match on email or display name
///
/// Search failures are logged and surfaced as an empty result rather than
/// an error; the UI stays interactive.
async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<UserProfile>> {
    match search::search_users(&state.store, &query.q).await {
        Ok(users) => Json(users),
        Err(err) => {
            warn!(%err, "user search failed");
            Json(Vec::new())
        }
    }
}
