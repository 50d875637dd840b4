//! Single ownership check shared by every interview and session operation.

use crate::error::CoreError;
use crate::types::DbId;

/// Ensure `caller_id` owns the resource owned by `owner_id`.
///
/// `entity` names the resource in the error message. There is no role-based
/// bypass: interviews and sessions are visible to their owner only.
pub fn ensure_owner(owner_id: DbId, caller_id: DbId, entity: &str) -> Result<(), CoreError> {
    if owner_id != caller_id {
        return Err(CoreError::Forbidden(format!(
            "Not authorized to access this {entity}"
        )));
    }
    Ok(())
}
