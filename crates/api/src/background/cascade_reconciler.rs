//! Periodic retry of pending session-completion cascades.
//!
//! A session that completed while its interview row was missing is flagged
//! `cascade_pending`. This task sweeps those sessions on a fixed interval and
//! completes the interview once it exists again. Sessions whose interview is
//! still missing stay flagged and are stamped, which sends them to the back of
//! the queue so each sweep reaches sessions not yet tried.

use std::time::Duration;

use candor_db::repositories::EmotionSessionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Maximum sessions examined per sweep.
const SWEEP_BATCH_SIZE: i64 = 100;

/// Counters from one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub applied: usize,
    pub still_pending: usize,
    pub failed: usize,
}

/// Run one sweep over pending cascades.
pub async fn sweep(pool: &PgPool) -> Result<SweepReport, sqlx::Error> {
    let pending = EmotionSessionRepo::list_pending_cascades(pool, SWEEP_BATCH_SIZE).await?;
    let mut report = SweepReport::default();

    for session in &pending {
        match EmotionSessionRepo::apply_pending_cascade(pool, session).await {
            Ok(true) => {
                report.applied += 1;
                tracing::info!(
                    session_id = session.id,
                    interview_id = session.interview_id,
                    "Pending cascade applied"
                );
            }
            Ok(false) => {
                report.still_pending += 1;
                tracing::debug!(
                    session_id = session.id,
                    interview_id = session.interview_id,
                    "Cascade still pending: interview missing"
                );
            }
            Err(e) => {
                report.failed += 1;
                tracing::error!(session_id = session.id, error = %e, "Cascade retry failed");
                if let Err(e) = EmotionSessionRepo::record_cascade_attempt(pool, session.id).await
                {
                    tracing::warn!(
                        session_id = session.id,
                        error = %e,
                        "Failed to stamp cascade attempt"
                    );
                }
            }
        }
    }

    Ok(report)
}

/// Sweep every `period` until `cancel` is triggered.
pub async fn run(pool: PgPool, period: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = period.as_secs(), "Cascade reconciler started");

    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Cascade reconciler stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep(&pool).await {
                    Ok(report) if report == SweepReport::default() => {
                        tracing::debug!("Cascade reconciler: nothing pending");
                    }
                    Ok(report) => {
                        tracing::info!(
                            applied = report.applied,
                            still_pending = report.still_pending,
                            failed = report.failed,
                            "Cascade reconciler sweep finished"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Cascade reconciler: sweep failed");
                    }
                }
            }
        }
    }
}
