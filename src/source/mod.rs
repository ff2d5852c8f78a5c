//! # Secret Source
//!
//! Read side of the sync: the backend that secrets are mirrored *from*.
//!
//! The reconciler only needs two calls, `list` and `read`, both keyed by a
//! fully shaped backend path (see [`crate::reconciler::paths`]). Authentication
//! happens before the source is handed to the reconciler.

use crate::error::SourceError;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod vault;

pub use vault::{AppRoleCredentials, VaultAuth, VaultClient, VaultSettings};

/// The `data` object of a read response, exactly as the backend returned it
pub type SecretData = Map<String, Value>;

/// Result of listing a path
///
/// Entries are kept as raw JSON values; the reconciler decides which of them
/// are usable names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecretListing {
    pub keys: Vec<Value>,
}

/// Provider trait for secret backends
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// List the entries directly below `path`
    async fn list(&self, path: &str) -> Result<SecretListing, SourceError>;

    /// Read the `data` object stored at `path`
    async fn read(&self, path: &str) -> Result<SecretData, SourceError>;
}
