//! Interview status machine.
//!
//! An interview is the durable record of one uploaded video. Its status only
//! ever moves forward along `pending -> recorded -> analyzing -> completed|failed`.
//! Skipping ahead is allowed (an emotion session can complete a `recorded`
//! interview); moving backward or flipping between the two terminal states is
//! not.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Processing status of an uploaded interview video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    Pending,
    Recorded,
    Analyzing,
    Completed,
    Failed,
}

impl InterviewStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [InterviewStatus; 5] = [
        Self::Pending,
        Self::Recorded,
        Self::Analyzing,
        Self::Completed,
        Self::Failed,
    ];

    /// Database / wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Recorded => "recorded",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse a stored status. An unknown value is an internal inconsistency,
    /// not caller input.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| CoreError::Internal(format!("Unknown interview status '{value}'")))
    }

    /// `completed` and `failed` end the lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Recorded => 1,
            Self::Analyzing => 2,
            Self::Completed | Self::Failed => 3,
        }
    }
}

impl std::fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Validate an operator-driven transition from `current` to `next`.
///
/// Re-applying the current status is accepted so that `start`, `complete` and
/// `fail` are idempotent. Backward moves and `completed <-> failed` are
/// rejected with [`CoreError::Conflict`].
pub fn validate_transition(
    current: InterviewStatus,
    next: InterviewStatus,
) -> Result<(), CoreError> {
    if current == next {
        return Ok(());
    }
    if current.is_terminal() || next.rank() < current.rank() {
        return Err(CoreError::Conflict(format!(
            "Cannot transition interview from '{current}' to '{next}'"
        )));
    }
    Ok(())
}

/// The media location is the only input checked at creation time.
pub fn validate_video_url(video_url: &str) -> Result<(), CoreError> {
    if video_url.trim().is_empty() {
        return Err(CoreError::Validation(
            "Interview media location must not be empty".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
