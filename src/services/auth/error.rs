/*
 * Responsibility
 * - Authorization failure kinds (header / token / key set / permission)
 * - Each kind knows its logical status, machine code and description
 * - HTTP conversion lives in crate::error (single response translator)
 */
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authorization header is expected")]
    MissingHeader,

    #[error("invalid authorization header: {0}")]
    InvalidHeaderFormat(&'static str),

    #[error("unable to parse authentication token")]
    MalformedToken,

    #[error("unable to find a key that verifies the token signature")]
    InvalidSignature,

    #[error("token expired")]
    TokenExpired,

    #[error("incorrect claims: {0}")]
    InvalidClaims(String),

    #[error("permissions not included in token")]
    PermissionsMissing,

    #[error("permission not found: {0}")]
    Forbidden(String),

    #[error("verification keys unavailable: {0}")]
    KeyFetch(String),
}

impl AuthError {
    /// Logical status of the failure.
    ///
    /// This is what the failure *means*; the response translator still sends
    /// every authorization failure as 401.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::PermissionsMissing => StatusCode::BAD_REQUEST,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::KeyFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "missing_header",
            AuthError::InvalidHeaderFormat(_) => "invalid_header_format",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims(_) | AuthError::PermissionsMissing => "invalid_claims",
            AuthError::Forbidden(_) => "forbidden",
            AuthError::KeyFetch(_) => "key_fetch_error",
        }
    }

    /// Client-facing description. Never includes key material or upstream errors.
    pub fn description(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "Authorization header is expected.",
            AuthError::InvalidHeaderFormat(reason) => *reason,
            AuthError::MalformedToken => "Unable to parse authentication token.",
            AuthError::InvalidSignature => "Unable to find the appropriate key.",
            AuthError::TokenExpired => "Token expired.",
            AuthError::InvalidClaims(_) => {
                "Incorrect claims. Please, check the audience and issuer."
            }
            AuthError::PermissionsMissing => "Permissions not included in JWT.",
            AuthError::Forbidden(_) => "Permission not found.",
            AuthError::KeyFetch(_) => "Unable to fetch verification keys.",
        }
    }
}
