//! Permission gate: decides whether validated claims satisfy a route's
//! required permission.

use crate::services::auth::{claims::Claims, error::AuthError};

/// Check `claims` against `required`.
///
/// - `None` or an empty string means no permission is required.
/// - Absent `permissions` claim is `invalid_claims` (400).
/// - Permission not granted is `forbidden` (403).
pub fn check_permission(required: Option<&str>, claims: &Claims) -> Result<(), AuthError> {
    let Some(required) = required.filter(|p| !p.is_empty()) else {
        return Ok(());
    };

    if claims.permissions.is_none() {
        return Err(AuthError::PermissionsMissing);
    }

    if !claims.has_permission(required) {
        return Err(AuthError::Forbidden(required.to_string()));
    }

    Ok(())
}
