//! Handlers for the `/emotion-sessions` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use candor_core::emotion_session::{
    ensure_accepts_results, validate_results, validate_transition, EmotionResult, SessionStatus,
};
use candor_core::error::CoreError;
use candor_core::ownership::ensure_owner;
use candor_core::types::DbId;
use candor_db::models::emotion_session::{CascadeOutcome, CreateEmotionSession, EmotionSession};
use candor_db::repositories::{EmotionSessionRepo, InterviewRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::interview;
use crate::middleware::auth::AuthUser;
use crate::response::{AppendResponse, DataResponse, SessionWithInterview};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(alias = "interviewId")]
    pub interview_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct AppendResultsRequest {
    #[serde(default)]
    pub results: Vec<EmotionResult>,
    /// Close the session as `completed` after appending.
    #[serde(default)]
    pub complete: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_and_authorize(
    pool: &sqlx::PgPool,
    session_id: DbId,
    auth: &AuthUser,
) -> AppResult<EmotionSession> {
    let session = EmotionSessionRepo::find_by_id(pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "EmotionSession",
            id: session_id,
        }))?;

    ensure_owner(session.user_id, auth.user_id, "emotion session")?;
    Ok(session)
}

/// A conditional update matched nothing although the session was open when
/// read: another request closed it in between.
fn closed_concurrently(session_id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Emotion session {session_id} was closed by another request"
    )))
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

/// POST /api/v1/emotion-sessions
///
/// Start a new analysis attempt against one of the caller's interviews.
/// The session is created `started` with no results. Returns 201.
pub async fn create_session(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<EmotionSession>>)> {
    let interview = interview::find_and_authorize(&state.pool, body.interview_id, &auth).await?;

    let input = CreateEmotionSession {
        interview_id: interview.id,
        user_id: interview.user_id,
    };
    let session = EmotionSessionRepo::create(&state.pool, &input).await?;

    tracing::info!(
        session_id = session.id,
        interview_id = interview.id,
        user_id = auth.user_id,
        "Emotion session created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// GET /api/v1/emotion-sessions/{id}
///
/// The session with its interview attached (`null` if the interview is gone).
pub async fn get_session(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(session_id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<SessionWithInterview>>> {
    let session = find_and_authorize(&state.pool, session_id, &auth).await?;
    let interview = InterviewRepo::find_by_id(&state.pool, session.interview_id).await?;

    Ok(Json(DataResponse {
        data: SessionWithInterview { session, interview },
    }))
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// POST /api/v1/emotion-sessions/{id}/results
///
/// Append a batch of results in order. With `complete: true` the session is
/// also closed as `completed` and its interview completed in the same
/// transaction; the response carries `"cascade": "applied"` or, if the
/// interview no longer exists, `"cascade": "pending"`.
pub async fn append_results(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(session_id): AppPath<DbId>,
    AppJson(body): AppJson<AppendResultsRequest>,
) -> AppResult<Json<AppendResponse>> {
    let session = find_and_authorize(&state.pool, session_id, &auth).await?;
    ensure_accepts_results(session.status()?)?;
    validate_results(&body.results)?;

    if !body.complete {
        let updated = EmotionSessionRepo::append_results(&state.pool, session_id, &body.results)
            .await?
            .ok_or_else(|| closed_concurrently(session_id))?;

        tracing::debug!(
            session_id,
            appended = body.results.len(),
            total = updated.results.len(),
            "Emotion results appended"
        );
        return Ok(Json(AppendResponse {
            data: updated,
            cascade: None,
        }));
    }

    let (updated, outcome) =
        EmotionSessionRepo::append_and_complete(&state.pool, session_id, &body.results)
            .await?
            .ok_or_else(|| closed_concurrently(session_id))?;

    match outcome {
        CascadeOutcome::Applied => tracing::info!(
            session_id,
            interview_id = updated.interview_id,
            appended = body.results.len(),
            "Emotion session completed; interview completed"
        ),
        CascadeOutcome::Pending => tracing::warn!(
            session_id,
            interview_id = updated.interview_id,
            "Emotion session completed but its interview is missing; cascade pending"
        ),
    }

    Ok(Json(AppendResponse {
        data: updated,
        cascade: Some(outcome),
    }))
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/emotion-sessions/{id}/processing
///
/// Mark the session as being processed. `processing_started_at` keeps its
/// first value if called again.
pub async fn mark_processing(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(session_id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<EmotionSession>>> {
    let session = find_and_authorize(&state.pool, session_id, &auth).await?;
    validate_transition(session.status()?, SessionStatus::Processing)?;

    let updated = EmotionSessionRepo::mark_processing(&state.pool, session_id)
        .await?
        .ok_or_else(|| closed_concurrently(session_id))?;

    tracing::info!(session_id, "Emotion session processing");
    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/emotion-sessions/{id}/fail
///
/// Close the session as `failed`. The interview is left untouched.
pub async fn fail_session(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(session_id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<EmotionSession>>> {
    let session = find_and_authorize(&state.pool, session_id, &auth).await?;
    validate_transition(session.status()?, SessionStatus::Failed)?;

    let updated = EmotionSessionRepo::mark_failed(&state.pool, session_id)
        .await?
        .ok_or_else(|| closed_concurrently(session_id))?;

    tracing::info!(session_id, interview_id = updated.interview_id, "Emotion session failed");
    Ok(Json(DataResponse { data: updated }))
}
