//! # Credential Store
//!
//! Write side of the sync: the store that secrets are mirrored *into*.
//!
//! The store exposes exactly the three calls the upsert decision needs. Errors
//! carry a [`StoreErrorKind`] so callers never inspect message text.

use crate::constants::OPAQUE_SECRET_TYPE;
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;

pub mod kubernetes;

pub use kubernetes::{KubeConnection, KubernetesStore};

/// Target representation of one mirrored secret
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialObject {
    pub name: String,
    /// Field name to raw bytes
    pub data: BTreeMap<String, Vec<u8>>,
    /// Type marker; always `Opaque` for objects built by the sync
    pub secret_type: String,
}

impl CredentialObject {
    /// Build an `Opaque` object
    #[must_use]
    pub fn opaque(name: impl Into<String>, data: BTreeMap<String, Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data,
            secret_type: OPAQUE_SECRET_TYPE.to_string(),
        }
    }
}

impl std::fmt::Debug for CredentialObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Field names only, values stay out of logs
        f.debug_struct("CredentialObject")
            .field("name", &self.name)
            .field("keys", &self.data.keys().collect::<Vec<_>>())
            .field("secret_type", &self.secret_type)
            .finish()
    }
}

/// Provider trait for credential stores
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch an object by name; absence is reported as [`crate::error::StoreErrorKind::NotFound`]
    async fn get(&self, namespace: &str, name: &str) -> Result<CredentialObject, StoreError>;

    /// Submit a new object
    async fn create(&self, namespace: &str, object: &CredentialObject) -> Result<(), StoreError>;

    /// Replace an existing object in full
    async fn update(&self, namespace: &str, object: &CredentialObject) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_values() {
        let mut data = BTreeMap::new();
        data.insert("password".to_string(), b"hunter2".to_vec());
        let object = CredentialObject::opaque("db", data);

        let debug = format!("{object:?}");
        assert!(debug.contains("password"));
        assert!(!debug.contains("hunter2"));
        assert_eq!(object.secret_type, "Opaque");
    }
}
