//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use vault_secret_sync::prelude::*;
//! ```

pub use crate::config::SyncConfig;
pub use crate::error::{SourceError, StoreError, StoreErrorKind, SyncError};
pub use crate::reconciler::{
    FailurePolicy, KvMode, Reconciler, SyncPlan, SyncReport, UpsertOutcome,
};
pub use crate::source::{SecretData, SecretListing, SecretSource, VaultAuth, VaultClient};
pub use crate::store::{CredentialObject, CredentialStore, KubeConnection, KubernetesStore};
