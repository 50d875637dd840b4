pub mod emotion;
pub mod emotion_session;
pub mod interview;
