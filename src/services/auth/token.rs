//! `Authorization: Bearer <token>` header parsing.
//!
//! Only the header shape is checked here; the token itself is opaque until the
//! validator decodes it.

use axum::http::HeaderValue;

use crate::services::auth::error::AuthError;

pub const BEARER_SCHEME: &str = "Bearer";

/// Extract the bearer token from a raw `Authorization` header value.
///
/// The header must be exactly `Bearer <token>`: two parts separated by a
/// single space, scheme matched case-sensitively, token non-empty.
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;

    let value = header.to_str().map_err(|_| {
        AuthError::InvalidHeaderFormat("Authorization header must be visible ASCII.")
    })?;

    let parts: Vec<&str> = value.split(' ').collect();

    match parts.as_slice() {
        [scheme, _] if *scheme != BEARER_SCHEME => Err(AuthError::InvalidHeaderFormat(
            "Authorization header must start with \"Bearer\".",
        )),
        [_, token] if token.is_empty() => {
            Err(AuthError::InvalidHeaderFormat("Token not found."))
        }
        [_, token] => Ok(*token),
        [_] => Err(AuthError::InvalidHeaderFormat("Token not found.")),
        _ => Err(AuthError::InvalidHeaderFormat(
            "Authorization header must be bearer token.",
        )),
    }
}
