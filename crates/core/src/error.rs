//! Domain error shared by the lifecycle modules.
//!
//! Each variant is one failure category a caller can act on; the HTTP layer
//! maps them onto status codes.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No interview or session with this id.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Rejected input: disallowed upload, empty media location, bad result.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation does not apply in the current status (closed session,
    /// backward transition).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No usable caller identity.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is not the owner.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A stored value is inconsistent (e.g. an unknown status string).
    #[error("Internal error: {0}")]
    Internal(String),
}
