//! Emotion session entity model and DTOs.

use candor_core::emotion_session::{EmotionResult, SessionStatus};
use candor_core::error::CoreError;
use candor_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `emotion_sessions` table.
///
/// `results` is stored as a JSONB array and kept in insertion order.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmotionSession {
    pub id: DbId,
    pub interview_id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub started_at: Option<Timestamp>,
    pub processing_started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub failed_at: Option<Timestamp>,
    pub results: Json<Vec<EmotionResult>>,
    pub cascade_pending: bool,
    /// Last reconciler retry that still found no interview.
    pub cascade_attempted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl EmotionSession {
    /// Typed view of the `status` column.
    pub fn status(&self) -> Result<SessionStatus, CoreError> {
        SessionStatus::parse(&self.status)
    }
}

/// DTO for creating a new session. The owner is copied from the interview.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmotionSession {
    pub interview_id: DbId,
    pub user_id: DbId,
}

/// Whether completing a session also completed its interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadeOutcome {
    /// The interview was marked completed in the same transaction.
    Applied,
    /// The interview could not be updated; `cascade_pending` is set and the
    /// reconciler will retry.
    Pending,
}
