//! # Vault Authentication
//!
//! Resolves a client token before any secret is listed.
//!
//! Two strategies are supported:
//! - **Token**: a pre-issued token (`VAULT_TOKEN`), used as-is
//! - **AppRole**: `role_id` + `secret_id` exchanged for a short-lived token via
//!   `POST /v1/auth/{mount}/login`

use super::responses::{error_detail, AppRoleLoginRequest, LoginResponse};
use super::VaultClient;
use crate::error::SyncError;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// Authentication strategy, chosen once per run
#[derive(Clone)]
pub enum VaultAuth {
    /// Pre-issued client token
    Token(Zeroizing<String>),
    /// AppRole login
    AppRole(AppRoleCredentials),
}

/// Credentials for the AppRole auth method
#[derive(Clone)]
pub struct AppRoleCredentials {
    /// Mount path of the auth method (usually `approle`)
    pub mount: String,
    pub role_id: String,
    pub secret_id: Zeroizing<String>,
}

impl VaultAuth {
    /// Short name used in logs
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            VaultAuth::Token(_) => "token",
            VaultAuth::AppRole(_) => "approle",
        }
    }
}

impl std::fmt::Debug for VaultAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VaultAuth::Token(_) => f.debug_tuple("Token").field(&"***").finish(),
            VaultAuth::AppRole(creds) => f.debug_tuple("AppRole").field(creds).finish(),
        }
    }
}

impl std::fmt::Debug for AppRoleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppRoleCredentials")
            .field("mount", &self.mount)
            .field("role_id", &self.role_id)
            .field("secret_id", &"***")
            .finish()
    }
}

/// Produce the token the client will send with every request
pub(super) async fn resolve_token(
    client: &VaultClient,
    auth: &VaultAuth,
) -> Result<Zeroizing<String>, SyncError> {
    match auth {
        VaultAuth::Token(token) => {
            if token.trim().is_empty() {
                return Err(SyncError::AuthFailure("empty Vault token".to_string()));
            }
            debug!("Using pre-issued Vault token");
            Ok(token.clone())
        }
        VaultAuth::AppRole(creds) => approle_login(client, creds).await,
    }
}

async fn approle_login(
    client: &VaultClient,
    creds: &AppRoleCredentials,
) -> Result<Zeroizing<String>, SyncError> {
    let path = format!("auth/{}/login", creds.mount.trim_matches('/'));
    let url = client
        .endpoint(&path)
        .map_err(|e| SyncError::AuthFailure(e.to_string()))?;

    info!("App role auth ...");
    let body = AppRoleLoginRequest {
        role_id: &creds.role_id,
        secret_id: creds.secret_id.as_str(),
    };
    let response = client
        .with_headers(client.http.post(url))
        .json(&body)
        .send()
        .await
        .map_err(|e| SyncError::AuthFailure(format!("login request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let detail = error_detail(response).await;
        return Err(SyncError::AuthFailure(format!("HTTP {status}: {detail}")));
    }

    let login: LoginResponse = response
        .json()
        .await
        .map_err(|e| SyncError::AuthFailure(format!("undecodable login response: {e}")))?;
    let auth = login
        .auth
        .ok_or_else(|| SyncError::AuthFailure("no auth info returned".to_string()))?;
    if auth.client_token.is_empty() {
        return Err(SyncError::AuthFailure(
            "login response carried an empty client token".to_string(),
        ));
    }

    info!(
        lease_duration_secs = auth.lease_duration,
        renewable = auth.renewable,
        "App role auth succeeded, set token ..."
    );
    Ok(Zeroizing::new(auth.client_token))
}
