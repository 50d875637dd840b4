pub mod emotion;
pub mod emotion_session;
pub mod health;
pub mod interview;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree. Every route requires a Bearer token.
///
/// ```text
/// /interviews                                   list, upload
/// /interviews/{id}                              get, start, complete, fail
/// /interviews/{id}/emotion-sessions             sessions for an interview
///
/// /emotion-sessions                             create
/// /emotion-sessions/{id}                        get, results, processing, fail
///
/// /emotion/predict                              score one frame
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/interviews", interview::router())
        .nest("/emotion-sessions", emotion_session::router())
        .nest("/emotion", emotion::router())
}
