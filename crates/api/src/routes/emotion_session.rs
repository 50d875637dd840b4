//! Route definitions for the `/emotion-sessions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::emotion_session;
use crate::state::AppState;

/// Routes mounted at `/emotion-sessions`.
///
/// ```text
/// POST   /                  -> create_session
/// GET    /{id}              -> get_session
/// POST   /{id}/results      -> append_results
/// POST   /{id}/processing   -> mark_processing
/// POST   /{id}/fail         -> fail_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(emotion_session::create_session))
        .route("/{id}", get(emotion_session::get_session))
        .route("/{id}/results", post(emotion_session::append_results))
        .route("/{id}/processing", post(emotion_session::mark_processing))
        .route("/{id}/fail", post(emotion_session::fail_session))
}
