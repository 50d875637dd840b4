//! Client side of the external emotion-inference service.
//!
//! - [`api`] -- HTTP client for the scorer's predict endpoint.
//! - [`scoring`] -- Frame scoring workflow: stage an uploaded frame, forward
//!   it to the scorer, and remove the staged copy on every exit path.

pub mod api;
pub mod scoring;
