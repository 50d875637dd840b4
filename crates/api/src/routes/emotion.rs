use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use candor_core::upload::MAX_FRAME_BYTES;

use crate::handlers::emotion;
use crate::state::AppState;

/// Routes mounted at `/emotion`.
///
/// ```text
/// POST   /predict   -> predict_emotion (multipart `frame` or `file`)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/predict",
        post(emotion::predict_emotion).layer(DefaultBodyLimit::max(MAX_FRAME_BYTES + 64 * 1024)),
    )
}
