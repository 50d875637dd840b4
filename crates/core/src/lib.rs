//! Domain rules for the Candor media-analysis pipeline.
//!
//! Nothing in this crate talks to the database or the network. The only I/O
//! is the [`media::MediaStore`] capability used to stage uploaded payloads.

pub mod emotion_session;
pub mod error;
pub mod interview;
pub mod media;
pub mod ownership;
pub mod types;
pub mod upload;
