//! Emotion session status machine and result validation.
//!
//! A session is one analysis attempt against an interview. It accumulates
//! emotion observations in insertion order and closes as either `completed`
//! or `failed`. Closed sessions accept no further results.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of an emotion session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Created,
    Started,
    Processing,
    Completed,
    Failed,
}

impl SessionStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [SessionStatus; 5] = [
        Self::Created,
        Self::Started,
        Self::Processing,
        Self::Completed,
        Self::Failed,
    ];

    /// Database / wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Processing => "processing",
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
            .ok_or_else(|| CoreError::Internal(format!("Unknown session status '{value}'")))
    }

    /// A closed session accepts no results and no further transitions.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Started => 1,
            Self::Processing => 2,
            Self::Completed | Self::Failed => 3,
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a session transition from `current` to `next`.
///
/// Open sessions move forward only; `processing -> processing` is accepted as
/// a no-op so the processing timestamp keeps its first value. Closed sessions
/// reject everything with [`CoreError::Conflict`].
pub fn validate_transition(current: SessionStatus, next: SessionStatus) -> Result<(), CoreError> {
    if current.is_closed() {
        return Err(CoreError::Conflict(format!(
            "Emotion session is already {current}"
        )));
    }
    if next.rank() < current.rank() {
        return Err(CoreError::Conflict(format!(
            "Cannot transition emotion session from '{current}' to '{next}'"
        )));
    }
    Ok(())
}

/// Reject appends to a closed session.
pub fn ensure_accepts_results(status: SessionStatus) -> Result<(), CoreError> {
    if status.is_closed() {
        return Err(CoreError::Conflict(format!(
            "Emotion session is {status} and no longer accepts results"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Maximum number of results accepted in a single append call.
pub const MAX_RESULTS_PER_BATCH: usize = 10_000;

/// Maximum length of an emotion label (characters).
pub const MAX_EMOTION_LABEL_LENGTH: usize = 64;

/// One timestamped emotion observation.
///
/// `timestamp` is caller supplied (typically an offset into the source video,
/// in seconds) and is not required to be monotonic across a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionResult {
    pub timestamp: f64,
    pub emotion: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Validate a single observation.
pub fn validate_result(result: &EmotionResult) -> Result<(), CoreError> {
    if !result.timestamp.is_finite() || result.timestamp < 0.0 {
        return Err(CoreError::Validation(format!(
            "Result timestamp must be a non-negative number (got {})",
            result.timestamp
        )));
    }

    let label = result.emotion.trim();
    if label.is_empty() {
        return Err(CoreError::Validation(
            "Result emotion label must not be empty".into(),
        ));
    }
    if label.chars().count() > MAX_EMOTION_LABEL_LENGTH {
        return Err(CoreError::Validation(format!(
            "Result emotion label exceeds {MAX_EMOTION_LABEL_LENGTH} characters"
        )));
    }

    if let Some(confidence) = result.confidence {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(CoreError::Validation(format!(
                "Result confidence must be within [0, 1] (got {confidence})"
            )));
        }
    }

    Ok(())
}

/// Validate a whole batch. One bad element rejects the batch.
pub fn validate_results(results: &[EmotionResult]) -> Result<(), CoreError> {
    if results.len() > MAX_RESULTS_PER_BATCH {
        return Err(CoreError::Validation(format!(
            "At most {MAX_RESULTS_PER_BATCH} results may be appended per call (got {})",
            results.len()
        )));
    }
    for (index, result) in results.iter().enumerate() {
        validate_result(result).map_err(|e| match e {
            CoreError::Validation(msg) => CoreError::Validation(format!("results[{index}]: {msg}")),
            other => other,
        })?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use SessionStatus::*;

    fn result(timestamp: f64, emotion: &str, confidence: Option<f64>) -> EmotionResult {
        EmotionResult {
            timestamp,
            emotion: emotion.to_string(),
            confidence,
        }
    }

    #[test]
    fn parse_round_trips_every_status() {
        for status in SessionStatus::ALL {
            assert_eq!(SessionStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(matches!(
            SessionStatus::parse("running"),
            Err(CoreError::Internal(_))
        ));
    }

    #[test]
    fn open_sessions_move_forward() {
        assert!(validate_transition(Started, Processing).is_ok());
        assert!(validate_transition(Started, Completed).is_ok());
        assert!(validate_transition(Processing, Completed).is_ok());
        assert!(validate_transition(Processing, Failed).is_ok());
        assert!(validate_transition(Created, Failed).is_ok());
        assert!(validate_transition(Processing, Processing).is_ok());
    }

    #[test]
    fn open_sessions_do_not_move_backward() {
        assert!(matches!(
            validate_transition(Processing, Started),
            Err(CoreError::Conflict(_))
        ));
    }

    #[test]
    fn closed_sessions_reject_every_transition() {
        for next in SessionStatus::ALL {
            assert!(validate_transition(Completed, next).is_err(), "{next}");
            assert!(validate_transition(Failed, next).is_err(), "{next}");
        }
    }

    #[test]
    fn closed_sessions_reject_results() {
        assert!(ensure_accepts_results(Started).is_ok());
        assert!(ensure_accepts_results(Processing).is_ok());
        assert!(matches!(
            ensure_accepts_results(Completed),
            Err(CoreError::Conflict(_))
        ));
        assert!(ensure_accepts_results(Failed).is_err());
    }

    #[test]
    fn valid_results_pass() {
        let batch = vec![
            result(3.0, "happy", Some(0.9)),
            result(1.0, "sad", None),
            result(1.0, "sad", None),
            result(0.0, "neutral", Some(0.0)),
            result(2.5, "angry", Some(1.0)),
        ];
        assert!(validate_results(&batch).is_ok());
        assert!(validate_results(&[]).is_ok());
    }

    #[test]
    fn empty_label_is_rejected() {
        assert!(validate_result(&result(1.0, "", None)).is_err());
        assert!(validate_result(&result(1.0, "  ", None)).is_err());
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        assert!(validate_result(&result(1.0, "happy", Some(1.01))).is_err());
        assert!(validate_result(&result(1.0, "happy", Some(-0.1))).is_err());
        assert!(validate_result(&result(1.0, "happy", Some(f64::NAN))).is_err());
    }

    #[test]
    fn negative_or_non_finite_timestamp_is_rejected() {
        assert!(validate_result(&result(-1.0, "happy", None)).is_err());
        assert!(validate_result(&result(f64::INFINITY, "happy", None)).is_err());
    }

    #[test]
    fn batch_error_names_the_offending_index() {
        let batch = vec![result(0.0, "happy", None), result(1.0, "", None)];
        match validate_results(&batch) {
            Err(CoreError::Validation(msg)) => assert!(msg.starts_with("results[1]"), "{msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn confidence_is_optional_on_the_wire() {
        let parsed: EmotionResult =
            serde_json::from_str(r#"{"timestamp": 1.5, "emotion": "surprise"}"#).unwrap();
        assert_eq!(parsed.confidence, None);
        assert_eq!(parsed.emotion, "surprise");
    }
}
