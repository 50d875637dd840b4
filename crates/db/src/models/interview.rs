//! Interview entity model and DTOs.

use candor_core::error::CoreError;
use candor_core::interview::InterviewStatus;
use candor_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `interviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Interview {
    pub id: DbId,
    pub user_id: DbId,
    pub video_url: String,
    pub status: String,
    pub created_at: Timestamp,
    pub analysed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl Interview {
    /// Typed view of the `status` column.
    pub fn status(&self) -> Result<InterviewStatus, CoreError> {
        InterviewStatus::parse(&self.status)
    }
}

/// DTO for creating a new interview after a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInterview {
    pub user_id: DbId,
    pub video_url: String,
}
