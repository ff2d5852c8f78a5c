//! # Vault REST Client
//!
//! Native REST implementation of [`SecretSource`] for HashiCorp Vault.
//! Uses reqwest with rustls for HTTP requests.
//!
//! Paths handed to this client are already shaped for the KV engine version
//! (`secret/app/metadata/`, `secret/app/data/db`, ...); the client only maps
//! them onto `/v1/...` URLs and classifies the response.
//!
//! References:
//! - [KV v1 API](https://developer.hashicorp.com/vault/api-docs/secret/kv/kv-v1)
//! - [KV v2 API](https://developer.hashicorp.com/vault/api-docs/secret/kv/kv-v2)

use crate::constants::{VAULT_NAMESPACE_HEADER, VAULT_TOKEN_HEADER};
use crate::error::{SourceError, SyncError};
use crate::source::{SecretData, SecretListing, SecretSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use zeroize::Zeroizing;

mod auth;
mod responses;

pub use auth::{AppRoleCredentials, VaultAuth};
use responses::{error_detail, VaultResponse};

/// Connection settings for the Vault client
#[derive(Debug, Clone)]
pub struct VaultSettings {
    /// Base address, e.g. `https://vault.example.com:8200`
    pub addr: String,
    /// Vault Enterprise namespace (sent as `X-Vault-Namespace`)
    pub namespace: Option<String>,
    /// Per-request timeout in seconds; no timeout when unset
    pub request_timeout_secs: Option<u64>,
    pub auth: VaultAuth,
}

/// Vault REST client
///
/// Created unauthenticated by [`VaultClient::new`]; [`VaultClient::authenticate`]
/// resolves the token and returns the client the reconciler uses.
pub struct VaultClient {
    http: Client,
    base_url: Url,
    namespace: Option<String>,
    token: Zeroizing<String>,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("base_url", &self.base_url.as_str())
            .field("namespace", &self.namespace)
            .field("authenticated", &!self.token.is_empty())
            .finish_non_exhaustive()
    }
}

impl VaultClient {
    /// Create a client for the configured address
    ///
    /// # Errors
    /// Returns an error if the address is not a usable base URL or the HTTP
    /// client cannot be built
    pub fn new(settings: &VaultSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.addr)
            .with_context(|| format!("Invalid Vault address: {}", settings.addr))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Vault address cannot be used as a base URL: {}", settings.addr);
        }

        let mut builder =
            Client::builder().user_agent(concat!("vault-secret-sync/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url,
            namespace: settings.namespace.clone(),
            token: Zeroizing::new(String::new()),
        })
    }

    /// Resolve a token with the given strategy and attach it to the client
    ///
    /// # Errors
    /// Returns [`SyncError::AuthFailure`] when no usable token is obtained
    pub async fn authenticate(self, auth: &VaultAuth) -> Result<Self, SyncError> {
        let token = auth::resolve_token(&self, auth).await?;
        Ok(Self { token, ..self })
    }

    /// Map a logical Vault path onto its `/v1/...` URL
    ///
    /// Segments are percent-encoded individually; a trailing `/` survives.
    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SourceError::unavailable(path, "Vault address is not a base URL"))?
            .pop_if_empty()
            .push("v1")
            .extend(path.trim_start_matches('/').split('/'));
        Ok(url)
    }

    fn with_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request.header(reqwest::header::ACCEPT, "application/json");
        if !self.token.is_empty() {
            request = request.header(VAULT_TOKEN_HEADER, self.token.as_str());
        }
        if let Some(namespace) = &self.namespace {
            request = request.header(VAULT_NAMESPACE_HEADER, namespace);
        }
        request
    }

    /// GET a logical path and return the `data` field of the envelope
    async fn fetch_data(&self, path: &str, list: bool) -> Result<Value, SourceError> {
        let mut url = self.endpoint(path)?;
        if list {
            url.query_pairs_mut().append_pair("list", "true");
        }
        debug!(vault.path = path, list, "Vault request");

        let response = self
            .with_headers(self.http.get(url))
            .send()
            .await
            .map_err(|e| SourceError::unavailable(path, format!("request failed: {e}")))?;

        let status = response.status();
        match status.as_u16() {
            200 => {
                let body: VaultResponse = response.json().await.map_err(|e| {
                    SourceError::unavailable(path, format!("undecodable response: {e}"))
                })?;
                body.data
                    .ok_or_else(|| SourceError::unavailable(path, "response has no data field"))
            }
            404 => Err(SourceError::not_found(path)),
            _ => {
                let detail = error_detail(response).await;
                Err(SourceError::unavailable(path, format!("HTTP {status}: {detail}")))
            }
        }
    }
}

#[async_trait]
impl SecretSource for VaultClient {
    async fn list(&self, path: &str) -> Result<SecretListing, SourceError> {
        let keys = match self.fetch_data(path, true).await? {
            Value::Object(mut data) => match data.remove("keys") {
                Some(Value::Array(keys)) => keys,
                other => {
                    warn!(
                        vault.path = path,
                        "Listing has no usable keys array ({}), nothing to sync",
                        other.map_or("missing", |v| json_type(&v))
                    );
                    Vec::new()
                }
            },
            other => {
                warn!(
                    vault.path = path,
                    "Listing data is a {} rather than an object, nothing to sync",
                    json_type(&other)
                );
                Vec::new()
            }
        };
        Ok(SecretListing { keys })
    }

    async fn read(&self, path: &str) -> Result<SecretData, SourceError> {
        match self.fetch_data(path, false).await? {
            Value::Object(data) => Ok(data),
            other => Err(SourceError::unavailable(
                path,
                format!("data field is a {} rather than an object", json_type(&other)),
            )),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
