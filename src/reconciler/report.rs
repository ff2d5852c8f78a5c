//! # Run Report
//!
//! Failure policy and the per-run outcome accumulated by the reconciler.

use crate::error::SyncError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{error, info, warn};

/// What the reconciler does when a single secret fails
///
/// Chosen before the loop starts; never changes mid-run. A failed listing
/// aborts the run under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first read, payload or store error (earlier upserts stay)
    #[default]
    AbortOnFirstError,
    /// Record the failure, keep going, report at the end
    ContinueAndReport,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::AbortOnFirstError => f.write_str("abort-on-first-error"),
            FailurePolicy::ContinueAndReport => f.write_str("continue-and-report"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" | "abort-on-first-error" | "fail-fast" => Ok(FailurePolicy::AbortOnFirstError),
            "continue" | "continue-and-report" => Ok(FailurePolicy::ContinueAndReport),
            other => Err(format!(
                "unknown failure policy '{other}', expected 'abort' or 'continue'"
            )),
        }
    }
}

/// Why a listing entry was not processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// null, array or object; cannot be a secret name
    NotScalar,
    /// Name already processed earlier in this run
    Duplicate,
}

/// A listing entry that produced no read
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub entry: Value,
    pub reason: SkipReason,
}

/// A secret that failed under [`FailurePolicy::ContinueAndReport`]
#[derive(Debug)]
pub struct SecretFailure {
    pub name: String,
    pub error: SyncError,
}

/// Outcome of one run
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Number of entries in the listing, usable or not
    pub listed: usize,
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
    pub failed: Vec<SecretFailure>,
}

impl SyncReport {
    #[must_use]
    pub fn synced(&self) -> usize {
        self.created.len() + self.updated.len()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Emit the end-of-run summary
    pub fn log_summary(&self) {
        for failure in &self.failed {
            error!("Secret {} failed: {}", failure.name, failure.error);
        }
        if !self.skipped.is_empty() {
            warn!("Skipped {} listing entries", self.skipped.len());
        }
        info!(
            listed = self.listed,
            created = self.created.len(),
            updated = self.updated.len(),
            skipped = self.skipped.len(),
            failed = self.failed.len(),
            "Create/update k8s secrets done!"
        );
    }
}
