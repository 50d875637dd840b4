//! Handlers for the `/interviews` resource.
//!
//! Every read and mutation goes through [`find_and_authorize`], so a caller
//! only ever sees or changes their own interviews.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use candor_core::error::CoreError;
use candor_core::interview::{validate_transition, validate_video_url, InterviewStatus};
use candor_core::media::generate_key;
use candor_core::ownership::ensure_owner;
use candor_core::types::DbId;
use candor_core::upload::validate_video_upload;
use candor_db::models::emotion_session::EmotionSession;
use candor_db::models::interview::{CreateInterview, Interview};
use candor_db::repositories::{EmotionSessionRepo, InterviewRepo};

use crate::error::{AppError, AppResult};
use crate::extract::AppPath;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the video.
const VIDEO_FIELD: &str = "video";

/// Key prefix for stored videos.
const VIDEO_KEY_PREFIX: &str = "interview";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load an interview and verify the caller owns it.
///
/// Missing -> 404, someone else's -> 403.
pub(crate) async fn find_and_authorize(
    pool: &sqlx::PgPool,
    interview_id: DbId,
    auth: &AuthUser,
) -> AppResult<Interview> {
    let interview = InterviewRepo::find_by_id(pool, interview_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Interview",
            id: interview_id,
        }))?;

    ensure_owner(interview.user_id, auth.user_id, "interview")?;
    Ok(interview)
}

/// Apply an operator-driven status change.
async fn apply_transition(
    state: &AppState,
    auth: &AuthUser,
    interview_id: DbId,
    target: InterviewStatus,
) -> AppResult<Json<DataResponse<Interview>>> {
    let interview = find_and_authorize(&state.pool, interview_id, auth).await?;
    let current = interview.status()?;
    validate_transition(current, target)?;

    let updated = InterviewRepo::transition(&state.pool, interview_id, current, target)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Interview {interview_id} changed status concurrently; retry"
            )))
        })?;

    tracing::info!(
        interview_id,
        user_id = auth.user_id,
        from = %current,
        to = %target,
        "Interview transitioned"
    );

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// POST /api/v1/interviews/upload
///
/// Accepts a multipart form with a required `video` field. The video is
/// validated (type and size), stored, and a new interview is created in
/// `recorded`. Returns 201 with the interview.
pub async fn upload_interview(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Interview>>)> {
    let mut video: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        video = Some((filename, content_type, data.to_vec()));
    }

    let (filename, content_type, data) =
        video.ok_or_else(|| AppError::BadRequest("Missing required 'video' field".into()))?;

    validate_video_upload(&filename, content_type.as_deref(), data.len())?;

    let key = generate_key(VIDEO_KEY_PREFIX, &filename);
    let video_url = state
        .videos
        .create(&key, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store video: {e}")))?;
    validate_video_url(&video_url)?;

    let input = CreateInterview {
        user_id: auth.user_id,
        video_url,
    };
    let interview = match InterviewRepo::create(&state.pool, &input).await {
        Ok(interview) => interview,
        Err(e) => {
            // The stored video would be unreachable without its row.
            if let Err(remove_err) = state.videos.remove(&key).await {
                tracing::warn!(key = %key, error = %remove_err, "Failed to remove orphaned video");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        interview_id = interview.id,
        user_id = auth.user_id,
        bytes = data.len(),
        "Interview created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: interview })))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/interviews
///
/// The caller's interviews, newest first.
pub async fn list_interviews(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Interview>>>> {
    let interviews = InterviewRepo::list_by_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: interviews }))
}

/// GET /api/v1/interviews/{id}
pub async fn get_interview(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(interview_id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Interview>>> {
    let interview = find_and_authorize(&state.pool, interview_id, &auth).await?;
    Ok(Json(DataResponse { data: interview }))
}

/// GET /api/v1/interviews/{id}/emotion-sessions
///
/// Every analysis attempt recorded against the interview, oldest first.
pub async fn list_interview_sessions(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(interview_id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Vec<EmotionSession>>>> {
    find_and_authorize(&state.pool, interview_id, &auth).await?;
    let sessions = EmotionSessionRepo::list_by_interview(&state.pool, interview_id).await?;
    Ok(Json(DataResponse { data: sessions }))
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// PATCH /api/v1/interviews/{id}/start
///
/// Move to `analyzing`. Re-entering `analyzing` is a no-op.
pub async fn start_interview(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(interview_id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Interview>>> {
    apply_transition(&state, &auth, interview_id, InterviewStatus::Analyzing).await
}

/// PATCH /api/v1/interviews/{id}/complete
///
/// Move to `completed` and stamp `analysed_at`. Repeating it refreshes the
/// timestamp.
pub async fn complete_interview(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(interview_id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Interview>>> {
    apply_transition(&state, &auth, interview_id, InterviewStatus::Completed).await
}

/// PATCH /api/v1/interviews/{id}/fail
pub async fn fail_interview(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(interview_id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Interview>>> {
    apply_transition(&state, &auth, interview_id, InterviewStatus::Failed).await
}
