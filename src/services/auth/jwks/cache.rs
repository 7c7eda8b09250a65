//! Process-wide cache of the verification key set.
//!
//! Policy:
//! - Reads take the read lock only; the set is shared as `Arc<JwkSet>`.
//! - Refresh is single-flight (refresh mutex). While one caller refreshes,
//!   others that already hold a stale set keep using it.
//! - A failed refresh keeps serving the previous set and is not retried for
//!   `min_refresh_interval`. Only an empty cache turns a fetch failure into
//!   `key_fetch_error`.
//! - Forced refreshes (unknown `kid`) are rate limited by `min_refresh_interval`,
//!   counted from the last attempt.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::jwk::JwkSet;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::services::auth::error::AuthError;
use crate::services::auth::jwks::provider::KeyProvider;

#[derive(Clone)]
struct CachedKeySet {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
    // Last fetch attempt, successful or not. Failed attempts back off from here.
    attempted_at: Instant,
}

pub struct KeySetCache {
    provider: Arc<dyn KeyProvider>,
    // None: keep the first fetched set for the process lifetime
    ttl: Option<Duration>,
    min_refresh_interval: Duration,
    cached: RwLock<Option<CachedKeySet>>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for KeySetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySetCache")
            .field("source", &self.provider.source())
            .field("ttl", &self.ttl)
            .field("min_refresh_interval", &self.min_refresh_interval)
            .finish()
    }
}

impl KeySetCache {
    pub fn new(
        provider: Arc<dyn KeyProvider>,
        ttl: Option<Duration>,
        min_refresh_interval: Duration,
    ) -> Self {
        Self {
            provider,
            ttl,
            min_refresh_interval,
            cached: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    fn is_fresh(&self, entry: &CachedKeySet) -> bool {
        match self.ttl {
            // After a failed refresh the stale set counts as fresh until the backoff ends.
            Some(ttl) => {
                entry.fetched_at.elapsed() < ttl
                    || (entry.attempted_at > entry.fetched_at && self.attempted_recently(entry))
            }
            None => true,
        }
    }

    fn attempted_recently(&self, entry: &CachedKeySet) -> bool {
        entry.attempted_at.elapsed() < self.min_refresh_interval
    }

    async fn snapshot(&self) -> Option<CachedKeySet> {
        self.cached.read().await.clone()
    }

    /// Current key set, fetching or refreshing it when needed.
    pub async fn keys(&self) -> Result<Arc<JwkSet>, AuthError> {
        let stale = match self.snapshot().await {
            Some(entry) if self.is_fresh(&entry) => return Ok(entry.keys),
            other => other,
        };

        match stale {
            // Somebody else is refreshing; the stale set is good enough meanwhile.
            Some(entry) => match self.refresh_lock.try_lock() {
                Ok(_permit) => self.refresh_locked(false).await,
                Err(_) => Ok(entry.keys),
            },
            None => {
                let _permit = self.refresh_lock.lock().await;
                self.refresh_locked(false).await
            }
        }
    }

    /// Refresh after a token referenced a key we do not know.
    ///
    /// Returns `None` when the last fetch attempt is too recent to justify another one.
    pub async fn refresh_for_unknown_key(&self) -> Result<Option<Arc<JwkSet>>, AuthError> {
        let _permit = self.refresh_lock.lock().await;

        if let Some(entry) = self.snapshot().await
            && self.attempted_recently(&entry)
        {
            tracing::debug!("jwks refreshed recently; skipping forced refresh");
            return Ok(None);
        }

        self.refresh_locked(true).await.map(Some)
    }

    // Caller must hold `refresh_lock`.
    async fn refresh_locked(&self, force: bool) -> Result<Arc<JwkSet>, AuthError> {
        let current = self.snapshot().await;

        // A concurrent refresh may have finished while we waited for the lock.
        if !force
            && let Some(entry) = &current
            && self.is_fresh(entry)
        {
            return Ok(entry.keys.clone());
        }

        match self.provider.fetch().await {
            Ok(set) => {
                tracing::info!(
                    source = self.provider.source(),
                    keys = set.keys.len(),
                    "verification key set refreshed"
                );
                let keys = Arc::new(set);
                let now = Instant::now();
                *self.cached.write().await = Some(CachedKeySet {
                    keys: keys.clone(),
                    fetched_at: now,
                    attempted_at: now,
                });
                Ok(keys)
            }
            Err(err) => match current {
                Some(entry) => {
                    tracing::warn!(
                        error = %err,
                        source = self.provider.source(),
                        retry_in = ?self.min_refresh_interval,
                        "jwks refresh failed; serving previously fetched keys"
                    );
                    let keys = entry.keys.clone();
                    *self.cached.write().await = Some(CachedKeySet {
                        attempted_at: Instant::now(),
                        ..entry
                    });
                    Ok(keys)
                }
                None => {
                    tracing::error!(
                        error = %err,
                        source = self.provider.source(),
                        "jwks fetch failed"
                    );
                    Err(AuthError::KeyFetch(err.to_string()))
                }
            },
        }
    }
}
