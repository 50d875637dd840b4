//! Repository for the `emotion_sessions` table.

use candor_core::emotion_session::{EmotionResult, SessionStatus};
use candor_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use crate::models::emotion_session::{CascadeOutcome, CreateEmotionSession, EmotionSession};
use crate::repositories::InterviewRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, interview_id, user_id, status, started_at, processing_started_at, \
    completed_at, failed_at, results, cascade_pending, cascade_attempted_at, created_at, updated_at";

/// SQL predicate matching sessions that still accept results and transitions.
const OPEN: &str = "status IN ('created', 'started', 'processing')";

/// Provides lifecycle operations for emotion sessions.
pub struct EmotionSessionRepo;

impl EmotionSessionRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Insert a new session in `started` with `started_at = NOW()` and no results.
    pub async fn create(
        pool: &PgPool,
        input: &CreateEmotionSession,
    ) -> Result<EmotionSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO emotion_sessions (interview_id, user_id, status, started_at)
             VALUES ($1, $2, $3, NOW())
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmotionSession>(&query)
            .bind(input.interview_id)
            .bind(input.user_id)
            .bind(SessionStatus::Started.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a session by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<EmotionSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM emotion_sessions WHERE id = $1");
        sqlx::query_as::<_, EmotionSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every session recorded against an interview, oldest first.
    pub async fn list_by_interview(
        pool: &PgPool,
        interview_id: DbId,
    ) -> Result<Vec<EmotionSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM emotion_sessions
             WHERE interview_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, EmotionSession>(&query)
            .bind(interview_id)
            .fetch_all(pool)
            .await
    }

    // ── Results ──────────────────────────────────────────────────────

    /// Append a batch of results to an open session.
    ///
    /// The append is a single `results || batch` update, so concurrent
    /// batches are never lost; they land in commit order. Returns `None` if
    /// the session does not exist or is already closed.
    pub async fn append_results(
        pool: &PgPool,
        id: DbId,
        results: &[EmotionResult],
    ) -> Result<Option<EmotionSession>, sqlx::Error> {
        let query = format!(
            "UPDATE emotion_sessions SET results = results || $2
             WHERE id = $1 AND {OPEN}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmotionSession>(&query)
            .bind(id)
            .bind(Json(results))
            .fetch_optional(pool)
            .await
    }

    /// Append a final batch, close the session as `completed`, and complete
    /// its interview, all in one transaction.
    ///
    /// If the interview row no longer exists the session still completes and
    /// is flagged `cascade_pending`; the outcome is reported as
    /// [`CascadeOutcome::Pending`]. Any database error rolls back both writes.
    /// Returns `None` if the session does not exist or is already closed.
    pub async fn append_and_complete(
        pool: &PgPool,
        id: DbId,
        results: &[EmotionResult],
    ) -> Result<Option<(EmotionSession, CascadeOutcome)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE emotion_sessions SET
                results = results || $2,
                status = 'completed',
                completed_at = NOW()
             WHERE id = $1 AND {OPEN}
             RETURNING {COLUMNS}"
        );
        let Some(session) = sqlx::query_as::<_, EmotionSession>(&query)
            .bind(id)
            .bind(Json(results))
            .fetch_optional(&mut *tx)
            .await?
        else {
            // Nothing written; dropping the transaction rolls it back.
            return Ok(None);
        };

        let applied = InterviewRepo::force_complete(&mut *tx, session.interview_id).await?;

        let (session, outcome) = if applied {
            (session, CascadeOutcome::Applied)
        } else {
            let query = format!(
                "UPDATE emotion_sessions SET cascade_pending = true
                 WHERE id = $1
                 RETURNING {COLUMNS}"
            );
            let flagged = sqlx::query_as::<_, EmotionSession>(&query)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            (flagged, CascadeOutcome::Pending)
        };

        tx.commit().await?;
        Ok(Some((session, outcome)))
    }

    // ── Lifecycle transitions ────────────────────────────────────────

    /// Move an open session to `processing`, stamping `processing_started_at`
    /// only the first time. Returns `None` if missing or closed.
    pub async fn mark_processing(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EmotionSession>, sqlx::Error> {
        let query = format!(
            "UPDATE emotion_sessions SET
                status = 'processing',
                processing_started_at = COALESCE(processing_started_at, NOW())
             WHERE id = $1 AND {OPEN}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmotionSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Close an open session as `failed`. The interview is not touched.
    /// Returns `None` if missing or closed.
    pub async fn mark_failed(pool: &PgPool, id: DbId) -> Result<Option<EmotionSession>, sqlx::Error> {
        let query = format!(
            "UPDATE emotion_sessions SET
                status = 'failed',
                failed_at = COALESCE(failed_at, NOW())
             WHERE id = $1 AND {OPEN}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmotionSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    // ── Cascade reconciliation ───────────────────────────────────────

    /// Completed sessions whose interview update has not been applied yet.
    ///
    /// Never-retried sessions come first, then the least recently retried,
    /// so a backlog of permanently orphaned sessions cannot hide newer ones.
    pub async fn list_pending_cascades(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<EmotionSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM emotion_sessions
             WHERE cascade_pending
             ORDER BY cascade_attempted_at ASC NULLS FIRST, id ASC
             LIMIT $1"
        );
        sqlx::query_as::<_, EmotionSession>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Retry the interview completion for one flagged session.
    ///
    /// Returns `true` if the interview was completed and the flag cleared,
    /// `false` if the interview still does not exist. In that case the flag
    /// stays set and the attempt is stamped.
    pub async fn apply_pending_cascade(
        pool: &PgPool,
        session: &EmotionSession,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !InterviewRepo::force_complete(&mut *tx, session.interview_id).await? {
            Self::record_cascade_attempt(&mut *tx, session.id).await?;
            tx.commit().await?;
            return Ok(false);
        }

        sqlx::query("UPDATE emotion_sessions SET cascade_pending = false WHERE id = $1")
            .bind(session.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Stamp a cascade retry so the session moves behind ones not yet tried.
    pub async fn record_cascade_attempt<'e, E>(executor: E, id: DbId) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("UPDATE emotion_sessions SET cascade_attempted_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
