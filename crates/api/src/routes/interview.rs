//! Route definitions for the `/interviews` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use axum::Router;
use candor_core::upload::MAX_VIDEO_BYTES;

use crate::handlers::interview;
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the payload itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Routes mounted at `/interviews`.
///
/// ```text
/// GET    /                          -> list_interviews
/// POST   /upload                    -> upload_interview (multipart `video`)
/// GET    /{id}                      -> get_interview
/// PATCH  /{id}/start                -> start_interview
/// PATCH  /{id}/complete             -> complete_interview
/// PATCH  /{id}/fail                 -> fail_interview
/// GET    /{id}/emotion-sessions     -> list_interview_sessions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(interview::list_interviews))
        .route(
            "/upload",
            post(interview::upload_interview)
                .layer(DefaultBodyLimit::max(MAX_VIDEO_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .route("/{id}", get(interview::get_interview))
        .route("/{id}/start", patch(interview::start_interview))
        .route("/{id}/complete", patch(interview::complete_interview))
        .route("/{id}/fail", patch(interview::fail_interview))
        .route(
            "/{id}/emotion-sessions",
            get(interview::list_interview_sessions),
        )
}
