//! Repository for the `interviews` table.

use candor_core::interview::InterviewStatus;
use candor_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::interview::{CreateInterview, Interview};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, video_url, status, created_at, analysed_at, updated_at";

/// Provides create, lookup, and status-transition operations for interviews.
pub struct InterviewRepo;

impl InterviewRepo {
    /// Insert a new interview. Uploaded interviews always start as `recorded`.
    pub async fn create(pool: &PgPool, input: &CreateInterview) -> Result<Interview, sqlx::Error> {
        let query = format!(
            "INSERT INTO interviews (user_id, video_url, status)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Interview>(&query)
            .bind(input.user_id)
            .bind(&input.video_url)
            .bind(InterviewStatus::Recorded.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find an interview by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Interview>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM interviews WHERE id = $1");
        sqlx::query_as::<_, Interview>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every interview owned by `user_id`, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Interview>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM interviews
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Interview>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Move an interview from `from` to `to`.
    ///
    /// The update only applies while the row is still in `from`, so a caller
    /// that validated the transition against a stale read gets `None` instead
    /// of silently overwriting a concurrent change. Moving to `completed`
    /// (re)stamps `analysed_at`.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: InterviewStatus,
        to: InterviewStatus,
    ) -> Result<Option<Interview>, sqlx::Error> {
        let query = format!(
            "UPDATE interviews SET
                status = $3,
                analysed_at = CASE WHEN $3 = 'completed' THEN NOW() ELSE analysed_at END
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Interview>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Force an interview to `completed` regardless of its current status.
    ///
    /// Used by the session-completion cascade, either inside the completing
    /// transaction or from the reconciler. Returns `false` if the interview
    /// does not exist.
    pub async fn force_complete<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE interviews SET status = 'completed', analysed_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
