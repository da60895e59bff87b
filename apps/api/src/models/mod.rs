pub mod chat;
pub mod document;

use uuid::Uuid;

use crate::errors::AppError;

/// Enforces the exclusive-ownership invariant: a document or session may only
/// be read or mutated by the user it belongs to. Denial is `Forbidden` with
/// the same generic body for every non-owner, so the existence of other
/// users' resources is never leaked. Unknown ids are reported as `NotFound`
/// before this check runs.
pub fn ensure_owned(resource_owner: Uuid, caller: Uuid) -> Result<(), AppError> {
    if resource_owner == caller {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
