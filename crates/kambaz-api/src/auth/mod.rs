pub mod cookies;
pub mod middleware;

pub use middleware::SessionUser;

use kambaz_db::models::{Role, User};
use uuid::Uuid;

use crate::error::ApiError;

/// Authorization predicate applied by every role-gated handler: the acting
/// user must hold one of the allowed roles.
pub fn require_role(user: &User, allowed: &[Role], message: &str) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(message.to_string()))
    }
}

/// Resolve a `{userId}` path segment, which may be the literal `current` for
/// the session user. Using `current` without a session is a 401.
pub fn resolve_user_id(raw: &str, session: Option<&SessionUser>) -> Result<Uuid, ApiError> {
    if raw == "current" {
        return session.map(|s| s.user.id).ok_or(ApiError::Unauthenticated);
    }
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid user id".to_string()))
}
