//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or any `PgExecutor`) as the first argument.

pub mod emotion_session_repo;
pub mod interview_repo;

pub use emotion_session_repo::EmotionSessionRepo;
pub use interview_repo::InterviewRepo;
