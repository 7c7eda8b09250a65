use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{
    Algorithm, DecodingKey, Validation,
    errors::{Error as JwtError, ErrorKind},
    jwk::{Jwk, JwkSet},
};

use crate::services::auth::{claims::Claims, error::AuthError, jwks::KeySetCache};

/// Access-token verifier backed by the issuer's published key set.
///
/// Checks, in order:
/// - token header decodes and the token is three base64url segments with a
///   JSON object payload (`malformed_token`)
/// - `alg` is allowed and some key verifies the signature (`invalid_signature`)
/// - `exp` (`token_expired`), then `iss`/`aud`/`nbf` and required claims (`invalid_claims`)
pub struct AuthService {
    keys: KeySetCache,
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    leeway_seconds: u64,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("keys", &self.keys)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("algorithms", &self.algorithms)
            .finish()
    }
}

impl AuthService {
    pub fn new(
        keys: KeySetCache,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        algorithms: Vec<Algorithm>,
        leeway_seconds: u64,
    ) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms,
            leeway_seconds,
        }
    }

    fn validation(&self, alg: Algorithm) -> Validation {
        let mut validation = Validation::new(alg);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.validate_nbf = true;
        validation.leeway = self.leeway_seconds;
        validation
    }

    /// Verify and decode a bearer token.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(|err| {
            tracing::debug!(error = %err, "token header could not be decoded");
            AuthError::MalformedToken
        })?;
        check_shape(token)?;

        if !self.algorithms.contains(&header.alg) {
            tracing::warn!(alg = ?header.alg, "token signed with a disallowed algorithm");
            return Err(AuthError::InvalidSignature);
        }

        let kid = header.kid.as_deref();
        let validation = self.validation(header.alg);

        let mut keys = self.keys.keys().await?;
        if candidate_keys(&keys, kid).is_empty() {
            tracing::info!(kid, "token references an unknown key; refreshing key set");
            if let Some(fresh) = self.keys.refresh_for_unknown_key().await? {
                keys = fresh;
            }
        }

        verify_with(&keys, kid, token, &validation)
    }
}

// Syntax only; nothing here is trusted. Runs before any key lookup so a broken
// token never reaches the key set (or forces a refresh of it).
fn check_shape(token: &str) -> Result<(), AuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, signature] = segments.as_slice() else {
        return Err(AuthError::MalformedToken);
    };

    let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|err| {
        tracing::debug!(error = %err, "token payload is not base64url");
        AuthError::MalformedToken
    })?;
    URL_SAFE_NO_PAD.decode(signature).map_err(|err| {
        tracing::debug!(error = %err, "token signature is not base64url");
        AuthError::MalformedToken
    })?;
    serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&payload).map_err(
        |err| {
            tracing::debug!(error = %err, "token payload is not a json object");
            AuthError::MalformedToken
        },
    )?;

    Ok(())
}

fn candidate_keys<'a>(keys: &'a JwkSet, kid: Option<&str>) -> Vec<&'a Jwk> {
    match kid {
        Some(kid) => keys
            .keys
            .iter()
            .filter(|jwk| jwk.common.key_id.as_deref() == Some(kid))
            .collect(),
        None => keys.keys.iter().collect(),
    }
}

fn verify_with(
    keys: &JwkSet,
    kid: Option<&str>,
    token: &str,
    validation: &Validation,
) -> Result<Claims, AuthError> {
    for jwk in candidate_keys(keys, kid) {
        let key = match DecodingKey::from_jwk(jwk) {
            Ok(key) => key,
            Err(err) => {
                tracing::warn!(kid = ?jwk.common.key_id, error = %err, "unusable jwk skipped");
                continue;
            }
        };

        match jsonwebtoken::decode::<Claims>(token, &key, validation) {
            Ok(data) => return Ok(data.claims),
            // Wrong key for this token; try the next candidate.
            Err(err) if is_key_mismatch(&err) => continue,
            Err(err) => return Err(classify(err)),
        }
    }

    Err(AuthError::InvalidSignature)
}

fn is_key_mismatch(err: &JwtError) -> bool {
    matches!(
        err.kind(),
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::InvalidKeyFormat
    )
}

// jsonwebtoken checks the signature before any claim, so everything that
// reaches here failed after the signature was accepted.
fn classify(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidIssuer => AuthError::InvalidClaims("iss".into()),
        ErrorKind::InvalidAudience => AuthError::InvalidClaims("aud".into()),
        ErrorKind::InvalidSubject => AuthError::InvalidClaims("sub".into()),
        ErrorKind::ImmatureSignature => AuthError::InvalidClaims("nbf".into()),
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::InvalidClaims(format!("missing {claim}"))
        }
        _ => {
            tracing::debug!(error = %err, "token payload could not be decoded");
            AuthError::MalformedToken
        }
    }
}
