/*
 * Responsibility
 * - Load settings from environment variables (DATABASE_URL, CORS allow-list, auth issuer/JWKS, limits)
 * - Validate them up front (missing/invalid -> startup fails)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where verification keys come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Remote(Url),
    // Inline JWKS document (offline / local development)
    Static(String),
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub key_source: KeySource,
    pub algorithms: Vec<Algorithm>,
    pub leeway_seconds: u64,
    // None: keep keys for the process lifetime
    pub jwks_cache_ttl: Option<Duration>,
    pub jwks_min_refresh_interval: Duration,
    pub jwks_fetch_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub database_max_connections: u32,
    pub seed_drinks: bool,

    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,

    pub auth: AuthConfig,
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::Invalid(key))
        }
        _ => Ok(default),
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (env in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let database_url =
            non_empty(&lookup, "DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?;
        let seed_drinks = parse_or(&lookup, "SEED_DRINKS", false)?;

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout =
            Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 30)?);
        let request_body_limit_bytes = parse_or(&lookup, "REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;

        let auth = AuthConfig::from_lookup(&lookup)?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            seed_drinks,
            cors_allowed_origins,
            request_timeout,
            request_body_limit_bytes,
            auth,
        })
    }
}

impl AuthConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // AUTH_DOMAIN (e.g. "tenant.auth0.com") derives the issuer and the JWKS URL.
        let domain = non_empty(lookup, "AUTH_DOMAIN")
            .map(|d| d.trim_end_matches('/').to_string());

        let issuer = match (non_empty(lookup, "AUTH_ISSUER"), &domain) {
            (Some(issuer), _) => issuer,
            (None, Some(domain)) => format!("https://{domain}/"),
            (None, None) => return Err(ConfigError::Missing("AUTH_ISSUER")),
        };

        let audience =
            non_empty(lookup, "AUTH_AUDIENCE").ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?;

        let key_source = if let Some(document) = non_empty(lookup, "AUTH_JWKS_JSON") {
            KeySource::Static(document)
        } else {
            let raw = match (non_empty(lookup, "AUTH_JWKS_URL"), &domain) {
                (Some(url), _) => url,
                (None, Some(domain)) => format!("https://{domain}/.well-known/jwks.json"),
                (None, None) => return Err(ConfigError::Missing("AUTH_JWKS_URL")),
            };
            KeySource::Remote(Url::parse(&raw).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?)
        };

        let algorithms = lookup("AUTH_ALGORITHMS")
            .unwrap_or_else(|| "RS256".to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Algorithm::from_str(s).map_err(|_| ConfigError::Invalid("AUTH_ALGORITHMS")))
            .collect::<Result<Vec<_>, _>>()?;
        if algorithms.is_empty() {
            return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
        }

        let leeway_seconds = parse_or(lookup, "ACCESS_TOKEN_LEEWAY_SECONDS", 60)?;

        let jwks_cache_ttl = match parse_or(lookup, "JWKS_CACHE_TTL_SECONDS", 600u64)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let jwks_min_refresh_interval =
            Duration::from_secs(parse_or(lookup, "JWKS_MIN_REFRESH_SECONDS", 30)?);
        let jwks_fetch_timeout =
            Duration::from_secs(parse_or(lookup, "JWKS_FETCH_TIMEOUT_SECONDS", 5)?);

        Ok(Self {
            issuer,
            audience,
            key_source,
            algorithms,
            leeway_seconds,
            jwks_cache_ttl,
            jwks_min_refresh_interval,
            jwks_fetch_timeout,
        })
    }
}
