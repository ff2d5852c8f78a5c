//! # Errors
//!
//! Error taxonomy for a sync run.
//!
//! Source and store clients return their own typed errors; the reconciler
//! folds them into [`SyncError`]. Every variant except the skipped listing
//! entries (which never become errors) is fatal under the default policy.

use thiserror::Error;

/// Failure talking to the secret backend
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport failure, unexpected status, or an undecodable response
    #[error("secret source unavailable at '{path}': {message}")]
    Unavailable { path: String, message: String },
    /// The backend answered 404 for the path
    #[error("secret source path not found: '{path}'")]
    NotFound { path: String },
}

impl SourceError {
    pub fn unavailable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }
}

/// Classification of a credential store failure
///
/// The upsert decision dispatches on this tag rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The object does not exist
    NotFound,
    /// The store rejected the caller's credentials or permissions
    Denied,
    /// Anything else: network errors, conflicts, server errors
    Transient,
}

impl StoreErrorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorKind::NotFound => "not-found",
            StoreErrorKind::Denied => "denied",
            StoreErrorKind::Transient => "transient",
        }
    }
}

impl std::fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by the credential store
#[derive(Debug, Error)]
#[error("credential store error ({kind}): {message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound, message)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StoreErrorKind::NotFound
    }
}

/// Any error that ends (or, under continue-and-report, marks) a secret sync
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Vault authentication failed: {0}")]
    AuthFailure(String),

    #[error("malformed secret payload at '{path}': {message}")]
    MalformedPayload { path: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    Config(String),
}
