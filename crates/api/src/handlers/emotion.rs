//! Frame scoring proxy.

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use candor_inference::scoring::{FrameUpload, ScoringError};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Multipart field names accepted for the frame, in order of preference.
const FRAME_FIELDS: [&str; 2] = ["frame", "file"];

/// POST /api/v1/emotion/predict
///
/// Accepts a multipart form with one image in `frame` (or `file`), forwards
/// it to the emotion scorer, and returns the scorer's status and body as-is.
/// Nothing is recorded in any session.
pub async fn predict_emotion(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut upload: Option<FrameUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let is_frame = field
            .name()
            .is_some_and(|name| FRAME_FIELDS.contains(&name));
        if !is_frame || upload.is_some() {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some(FrameUpload {
            filename,
            content_type,
            data: data.to_vec(),
        });
    }

    let upload = upload.ok_or_else(|| {
        AppError::Scoring(ScoringError::InvalidInput(
            "Missing image in 'frame' field".into(),
        ))
    })?;

    tracing::debug!(user_id = auth.user_id, bytes = upload.data.len(), "Scoring frame");
    let scored = state.frame_scorer.score(upload).await?;

    let status = StatusCode::from_u16(scored.status).unwrap_or(StatusCode::OK);
    let content_type = scored
        .content_type
        .unwrap_or_else(|| "application/json".to_string());
    Ok((status, [(header::CONTENT_TYPE, content_type)], scored.body).into_response())
}
