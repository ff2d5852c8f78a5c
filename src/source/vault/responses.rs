//! Vault HTTP API request/response bodies.
//!
//! Only the fields the sync reads are modelled; everything else in the
//! envelope (lease ids, wrap info, warnings) is ignored on deserialization.
//!
//! API Reference: <https://developer.hashicorp.com/vault/api-docs>

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard response envelope for logical reads and lists
#[derive(Debug, Deserialize)]
pub(super) struct VaultResponse {
    /// `{"keys": [...]}` for a list, the secret (KV v1) or `{"data", "metadata"}` (KV v2) for a read
    #[serde(default)]
    pub data: Option<Value>,
}

/// Error envelope returned with every non-2xx status
#[derive(Debug, Default, Deserialize)]
pub(super) struct VaultErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Body of `POST /v1/auth/{mount}/login` for the AppRole method
#[derive(Serialize)]
pub(super) struct AppRoleLoginRequest<'a> {
    pub role_id: &'a str,
    pub secret_id: &'a str,
}

/// Response to a login call; `auth` is null when the backend issued no token
#[derive(Deserialize)]
pub(super) struct LoginResponse {
    #[serde(default)]
    pub auth: Option<AuthInfo>,
}

#[derive(Deserialize)]
pub(super) struct AuthInfo {
    #[serde(default)]
    pub client_token: String,
    /// Token TTL in seconds
    #[serde(default)]
    pub lease_duration: u64,
    #[serde(default)]
    pub renewable: bool,
}

impl std::fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInfo")
            .field("client_token", &"***")
            .field("lease_duration", &self.lease_duration)
            .field("renewable", &self.renewable)
            .finish()
    }
}

/// Collapse the `errors` array of a failed response into one line
pub(super) async fn error_detail(response: reqwest::Response) -> String {
    let errors = response
        .json::<VaultErrorResponse>()
        .await
        .map(|body| body.errors)
        .unwrap_or_default();
    if errors.is_empty() {
        "no error detail returned".to_string()
    } else {
        errors.join("; ")
    }
}
