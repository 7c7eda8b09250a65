//! Shared fixtures for unit tests: an HS256 key set and token minting.
use std::sync::Arc;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, EncodingKey, Header, jwk::JwkSet};
use serde_json::{Value, json};

use crate::services::auth::{
    AuthService,
    jwks::{KeyProvider, KeySetCache, StaticKeyProvider},
};

pub const ISSUER: &str = "https://drinks.test/";
pub const AUDIENCE: &str = "drinks";
pub const SUBJECT: &str = "auth0|barista";
pub const KID: &str = "test-key";
pub const SECRET: &[u8] = b"drinks-test-signing-secret-0123456789";

pub fn jwks(kid: &str, secret: &[u8]) -> JwkSet {
    serde_json::from_value(json!({
        "keys": [{
            "kty": "oct",
            "kid": kid,
            "alg": "HS256",
            "k": URL_SAFE_NO_PAD.encode(secret),
        }]
    }))
    .unwrap()
}

pub fn static_provider() -> StaticKeyProvider {
    StaticKeyProvider::new(jwks(KID, SECRET))
}

fn verifier(
    provider: Arc<dyn KeyProvider>,
    algorithms: Vec<Algorithm>,
    leeway_seconds: u64,
) -> AuthService {
    let keys = KeySetCache::new(
        provider,
        Some(Duration::from_secs(600)),
        Duration::from_secs(30),
    );
    AuthService::new(keys, ISSUER, AUDIENCE, algorithms, leeway_seconds)
}

pub fn auth_service_with(
    provider: Arc<dyn KeyProvider>,
    algorithms: Vec<Algorithm>,
) -> AuthService {
    verifier(provider, algorithms, 0)
}

pub fn auth_service_with_leeway(leeway_seconds: u64) -> AuthService {
    verifier(
        Arc::new(static_provider()),
        vec![Algorithm::HS256],
        leeway_seconds,
    )
}

pub fn auth_service() -> AuthService {
    auth_service_with(Arc::new(static_provider()), vec![Algorithm::HS256])
}

/// Valid, unexpired claims carrying `permissions`.
pub fn claims(permissions: &[&str]) -> Value {
    let now = jsonwebtoken::get_current_timestamp();
    json!({
        "iss": ISSUER,
        "sub": SUBJECT,
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 600,
        "permissions": permissions,
    })
}

pub fn sign(claims: &Value, kid: Option<&str>, secret: &[u8]) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = kid.map(str::to_owned);
    jsonwebtoken::encode(&header, claims, &EncodingKey::from_secret(secret)).unwrap()
}

pub fn token(permissions: &[&str]) -> String {
    sign(&claims(permissions), Some(KID), SECRET)
}

pub fn bearer(permissions: &[&str]) -> String {
    format!("Bearer {}", token(permissions))
}

/// Well-formed header (HS256, `kid`) followed by a payload that is not base64url.
pub fn undecodable_payload_token(kid: &str) -> String {
    let header = json!({ "alg": "HS256", "typ": "JWT", "kid": kid });
    format!(
        "{}.%%%not-base64%%%.c2ln",
        URL_SAFE_NO_PAD.encode(header.to_string())
    )
}
