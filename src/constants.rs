//! # Constants
//!
//! Shared constants used throughout the sync job.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Default Vault API address (local dev server)
pub const DEFAULT_VAULT_ADDR: &str = "http://127.0.0.1:8200";

/// Default mount path of the AppRole auth method
pub const DEFAULT_APPROLE_MOUNT: &str = "approle";

/// Default KV engine version when `VAULT_KV_VERSION` is not set
pub const DEFAULT_KV_VERSION: &str = "2";

/// Default Kubernetes namespace for the mirrored secrets
pub const DEFAULT_TARGET_NAMESPACE: &str = "default";

/// Default log level when neither `RUST_LOG` nor `LOG_LEVEL` is set
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

/// Default log format (text, json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Header carrying the Vault client token
pub const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

/// Header carrying the Vault Enterprise namespace
pub const VAULT_NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Kubernetes secret type for schema-less key/value data
pub const OPAQUE_SECRET_TYPE: &str = "Opaque";

/// Label stamped on every Secret written by the job
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Value of [`MANAGED_BY_LABEL`]
pub const MANAGED_BY_VALUE: &str = "vault-secret-sync";

// Environment variable names

pub const ENV_VAULT_ADDR: &str = "VAULT_ADDR";
pub const ENV_VAULT_TOKEN: &str = "VAULT_TOKEN";
pub const ENV_VAULT_ROLE_ID: &str = "VAULT_ROLE_ID";
pub const ENV_VAULT_SECRET_ID: &str = "VAULT_SECRET_ID";
pub const ENV_VAULT_APPROLE_MOUNT: &str = "VAULT_APPROLE_MOUNT";
pub const ENV_VAULT_NAMESPACE: &str = "VAULT_NAMESPACE";
pub const ENV_VAULT_REQUEST_TIMEOUT_SECS: &str = "VAULT_REQUEST_TIMEOUT_SECS";
pub const ENV_VAULT_SECRET_PATH: &str = "VAULT_SECRET_PATH";
pub const ENV_VAULT_KV_VERSION: &str = "VAULT_KV_VERSION";
pub const ENV_K8S_NAMESPACE: &str = "K8S_NAMESPACE";
pub const ENV_LOCAL: &str = "LOCAL";
pub const ENV_SYNC_FAILURE_POLICY: &str = "SYNC_FAILURE_POLICY";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
