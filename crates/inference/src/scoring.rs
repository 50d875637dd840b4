//! Frame scoring workflow.
//!
//! Per request: `received -> staged -> forwarded -> scored | failed -> cleaned-up`.
//!
//! The uploaded frame is written to a scratch [`MediaStore`] under a generated
//! key, read back once to build the outbound request, and removed before
//! [`FrameScorer::score`] returns, whatever the scorer did. If the future is
//! dropped mid-flight (client disconnect, outer timeout) the [`StagedFrame`]
//! guard schedules the removal instead.
//!
//! The workflow knows nothing about interviews or sessions. Callers that want
//! to record a score in a session do so through the session API.

use std::sync::Arc;
use std::time::Duration;

use candor_core::error::CoreError;
use candor_core::media::{generate_key, MediaStore, MediaStoreError};
use candor_core::upload::validate_image_upload;

use crate::api::{EmotionApi, EmotionApiError, ScoreResponse};

/// Key prefix for staged frames.
pub const STAGED_FRAME_PREFIX: &str = "frame";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One image payload as received from the client.
#[derive(Debug, Clone)]
pub struct FrameUpload {
    /// Original filename supplied by the client.
    pub filename: String,
    /// Declared content type, if any.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Errors from the frame scoring workflow.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// The payload is missing, empty, too large, or not an image.
    #[error("Invalid frame: {0}")]
    InvalidInput(String),

    /// The frame could not be written to or read from the scratch store.
    #[error("Failed to stage frame: {0}")]
    Staging(#[from] MediaStoreError),

    /// The scorer did not answer within the configured bound.
    #[error("Emotion service did not respond within {}s", .0.as_secs_f64())]
    UpstreamTimeout(Duration),

    /// The scorer could not be reached (connect, DNS, reset).
    #[error("Emotion service unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The scorer answered with a non-2xx status. Forwarded verbatim.
    #[error("Emotion service rejected the frame ({status})")]
    UpstreamRejected { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// Staged frame guard
// ---------------------------------------------------------------------------

/// Scoped ownership of one staged payload.
///
/// Call [`StagedFrame::release`] to remove it. If the guard is dropped
/// without being released, removal is spawned onto the current runtime.
pub struct StagedFrame {
    store: Arc<dyn MediaStore>,
    key: String,
    released: bool,
}

impl StagedFrame {
    /// Write `data` into `store` under a freshly generated key.
    pub async fn stage(
        store: Arc<dyn MediaStore>,
        original_filename: &str,
        data: &[u8],
    ) -> Result<Self, MediaStoreError> {
        let key = generate_key(STAGED_FRAME_PREFIX, original_filename);
        store.create(&key, data).await?;
        Ok(Self {
            store,
            key,
            released: false,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the staged payload back.
    pub async fn read(&self) -> Result<Vec<u8>, MediaStoreError> {
        self.store.read(&self.key).await
    }

    /// Remove the staged payload. Failures are logged, never returned: a
    /// cleanup problem must not mask the scoring result.
    pub async fn release(mut self) {
        self.released = true;
        match self.store.remove(&self.key).await {
            Ok(true) => tracing::debug!(key = %self.key, "Staged frame removed"),
            Ok(false) => tracing::debug!(key = %self.key, "Staged frame already gone"),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to remove staged frame");
            }
        }
    }
}

impl Drop for StagedFrame {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let store = Arc::clone(&self.store);
        let key = std::mem::take(&mut self.key);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = store.remove(&key).await {
                        tracing::warn!(key = %key, error = %e, "Deferred staged frame removal failed");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(key = %key, "No runtime available to remove abandoned staged frame");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Stateless scoring primitive: stage, forward, clean up.
#[derive(Clone)]
pub struct FrameScorer {
    store: Arc<dyn MediaStore>,
    api: EmotionApi,
}

impl FrameScorer {
    pub fn new(store: Arc<dyn MediaStore>, api: EmotionApi) -> Self {
        Self { store, api }
    }

    /// Score one frame.
    ///
    /// Invalid uploads are rejected before anything is staged. Once staged,
    /// the payload is removed before this function returns on every path.
    pub async fn score(&self, upload: FrameUpload) -> Result<ScoreResponse, ScoringError> {
        validate_image_upload(
            &upload.filename,
            upload.content_type.as_deref(),
            upload.data.len(),
        )
        .map_err(|e| match e {
            CoreError::Validation(msg) => ScoringError::InvalidInput(msg),
            other => ScoringError::InvalidInput(other.to_string()),
        })?;

        let staged =
            StagedFrame::stage(Arc::clone(&self.store), &upload.filename, &upload.data).await?;
        tracing::debug!(
            key = staged.key(),
            filename = %upload.filename,
            bytes = upload.data.len(),
            "Frame staged"
        );

        let outcome = self.forward(&staged).await;
        staged.release().await;

        match &outcome {
            Ok(response) => tracing::debug!(status = response.status, "Frame scored"),
            Err(e) => tracing::warn!(error = %e, "Frame scoring failed"),
        }
        outcome
    }

    async fn forward(&self, staged: &StagedFrame) -> Result<ScoreResponse, ScoringError> {
        let frame = staged.read().await?;

        self.api.predict(frame).await.map_err(|e| match e {
            EmotionApiError::ApiError { status, body } => {
                ScoringError::UpstreamRejected { status, body }
            }
            e if e.is_timeout() => ScoringError::UpstreamTimeout(self.api.timeout()),
            EmotionApiError::Request(e) => ScoringError::UpstreamUnreachable(e.to_string()),
        })
    }
}
