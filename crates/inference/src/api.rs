//! REST API client for the emotion-inference service.
//!
//! The scorer exposes a single predict endpoint that accepts a multipart
//! request with one binary part named `file`. Every frame is sent as
//! `frame.jpg` / `image/jpeg` regardless of the uploaded type; the scorer
//! sniffs the actual image format itself.

use std::time::Duration;

/// Default hard timeout for a single predict call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Multipart field name expected by the scorer.
pub const FRAME_FIELD: &str = "file";

/// Filename sent for every frame.
pub const FRAME_FILENAME: &str = "frame.jpg";

/// Content type sent for every frame.
pub const FRAME_CONTENT_TYPE: &str = "image/jpeg";

/// HTTP client for the scorer's predict endpoint.
#[derive(Debug, Clone)]
pub struct EmotionApi {
    client: reqwest::Client,
    predict_url: String,
    timeout: Duration,
}

/// A successful scorer response, kept verbatim for pass-through.
#[derive(Debug, Clone)]
pub struct ScoreResponse {
    /// HTTP status code returned by the scorer (2xx).
    pub status: u16,
    /// `Content-Type` header returned by the scorer, if any.
    pub content_type: Option<String>,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl ScoreResponse {
    /// Parse the body as JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Errors from the inference API layer.
#[derive(Debug, thiserror::Error)]
pub enum EmotionApiError {
    /// The HTTP request itself failed (connect, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The scorer answered with a non-2xx status code.
    #[error("Inference API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body, forwarded to the caller as-is.
        body: String,
    },
}

impl EmotionApiError {
    /// Whether the failure was the request exceeding its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }
}

impl EmotionApi {
    /// Create a new client for a scorer.
    ///
    /// * `predict_url` - Full URL of the predict endpoint, e.g. `http://host:8000/predict`.
    /// * `timeout` - Hard bound on each predict call, connect through body read.
    pub fn new(predict_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            predict_url,
            timeout,
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one frame for scoring.
    ///
    /// Returns the scorer's 2xx response verbatim, or
    /// [`EmotionApiError::ApiError`] carrying the non-2xx status and body.
    pub async fn predict(&self, frame: Vec<u8>) -> Result<ScoreResponse, EmotionApiError> {
        let part = reqwest::multipart::Part::bytes(frame)
            .file_name(FRAME_FILENAME)
            .mime_str(FRAME_CONTENT_TYPE)?;
        let form = reqwest::multipart::Form::new().part(FRAME_FIELD, part);

        let response = self
            .client
            .post(&self.predict_url)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(ScoreResponse {
            status,
            content_type,
            body,
        })
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`EmotionApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, EmotionApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(EmotionApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}
