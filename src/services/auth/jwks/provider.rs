//! Key providers: where the verification key set comes from.
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum KeyFetchError {
    #[error("jwks request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("jwks endpoint returned status {0}")]
    Status(u16),
    #[error("jwks document is invalid: {0}")]
    InvalidDocument(String),
}

/// Source of the issuer's public verification keys.
///
/// Implementations must not cache; caching and refresh policy belong to
/// `KeySetCache`.
#[async_trait]
pub trait KeyProvider: Send + Sync + 'static {
    // Where the keys come from (for logging).
    fn source(&self) -> &str;

    async fn fetch(&self) -> Result<JwkSet, KeyFetchError>;
}

/// Fetches the JWKS document over HTTPS (e.g. `https://<domain>/.well-known/jwks.json`).
#[derive(Debug, Clone)]
pub struct RemoteKeyProvider {
    client: reqwest::Client,
    url: Url,
}

impl RemoteKeyProvider {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, KeyFetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl KeyProvider for RemoteKeyProvider {
    fn source(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch(&self) -> Result<JwkSet, KeyFetchError> {
        let res = self.client.get(self.url.clone()).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(KeyFetchError::Status(status.as_u16()));
        }

        let body = res.bytes().await?;
        let set: JwkSet = serde_json::from_slice(&body)
            .map_err(|e| KeyFetchError::InvalidDocument(e.to_string()))?;

        tracing::debug!(url = %self.url, keys = set.keys.len(), "fetched jwks");
        Ok(set)
    }
}

/// Serves a fixed key set (configured JWKS document; offline/dev use).
#[derive(Debug, Clone)]
pub struct StaticKeyProvider {
    set: JwkSet,
}

impl StaticKeyProvider {
    pub fn new(set: JwkSet) -> Self {
        Self { set }
    }

    pub fn from_json(document: &str) -> Result<Self, KeyFetchError> {
        let set = serde_json::from_str(document)
            .map_err(|e| KeyFetchError::InvalidDocument(e.to_string()))?;
        Ok(Self::new(set))
    }
}

#[async_trait]
impl KeyProvider for StaticKeyProvider {
    fn source(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> Result<JwkSet, KeyFetchError> {
        Ok(self.set.clone())
    }
}
