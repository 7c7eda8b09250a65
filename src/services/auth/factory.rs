/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::{AuthConfig, KeySource};
use crate::services::auth::AuthService;
use crate::services::auth::jwks::{
    KeyFetchError, KeyProvider, KeySetCache, RemoteKeyProvider, StaticKeyProvider,
};

pub fn build_auth_service(config: &AuthConfig) -> Result<Arc<AuthService>, KeyFetchError> {
    let provider: Arc<dyn KeyProvider> = match &config.key_source {
        KeySource::Remote(url) => Arc::new(RemoteKeyProvider::new(
            url.clone(),
            config.jwks_fetch_timeout,
        )?),
        KeySource::Static(document) => Arc::new(StaticKeyProvider::from_json(document)?),
    };

    tracing::info!(
        issuer = %config.issuer,
        audience = %config.audience,
        keys = provider.source(),
        "token verification configured"
    );

    let keys = KeySetCache::new(
        provider,
        config.jwks_cache_ttl,
        config.jwks_min_refresh_interval,
    );

    Ok(Arc::new(AuthService::new(
        keys,
        config.issuer.clone(),
        config.audience.clone(),
        config.algorithms.clone(),
        config.leeway_seconds,
    )))
}
