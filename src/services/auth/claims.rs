use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// Access token claims, as issued by the authority.
///
/// NOTE:
/// - Standard claims are optional at the serde level on purpose. Presence of
///   `exp`/`iss`/`aud` is enforced by `jsonwebtoken::Validation`, so a missing
///   claim surfaces as an `invalid_claims` failure instead of a decode error.
/// - `permissions` stays `None` when the claim is absent; the permission gate
///   distinguishes "absent" from "empty".
/// - Claims not modelled here (`azp`, `gty`, namespaced custom claims) are kept
///   in `extra`, so handlers see the whole payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeSet<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|set| set.contains(permission))
    }

    pub fn subject(&self) -> &str {
        self.sub.as_deref().unwrap_or("unknown")
    }
}
