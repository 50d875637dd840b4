//! Response envelope types shared by handlers.

use candor_db::models::emotion_session::{CascadeOutcome, EmotionSession};
use candor_db::models::interview::Interview;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// A session with its parent interview attached. The interview is `null`
/// if it no longer exists.
#[derive(Debug, Serialize)]
pub struct SessionWithInterview {
    #[serde(flatten)]
    pub session: EmotionSession,
    pub interview: Option<Interview>,
}

/// Response for a result append: the updated session, plus the cascade
/// outcome when the call also completed the session.
#[derive(Debug, Serialize)]
pub struct AppendResponse {
    pub data: EmotionSession,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cascade: Option<CascadeOutcome>,
}
