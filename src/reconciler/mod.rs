//! # Reconciler
//!
//! Drives one sync run: list → read → transform → upsert, for every name the
//! source lists under the configured base path.
//!
//! ## Run shape
//!
//! 1. List `{base}/` (KV v1) or `{base}/metadata/` (KV v2). A failure here
//!    aborts the run under every policy.
//! 2. For each listing entry, in listing order: skip non-scalar entries and
//!    names already seen, read the payload, convert it to `field -> bytes`,
//!    upsert it as an `Opaque` object in the target namespace.
//! 3. Under [`FailurePolicy::AbortOnFirstError`] the first failing secret ends
//!    the run; objects upserted for earlier names are left in place.
//!
//! Everything is sequential: one name is read and upserted to completion
//! before the next one starts.

use crate::error::SyncError;
use crate::source::SecretSource;
use crate::store::{CredentialObject, CredentialStore};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};

pub mod paths;
pub mod payload;
pub mod report;
pub mod upsert;

pub use paths::KvMode;
pub use report::{FailurePolicy, SecretFailure, SkipReason, SkippedEntry, SyncReport};
pub use upsert::UpsertOutcome;

/// Fixed inputs of a run
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// Base path under which secrets live, without trailing `/`
    pub base_path: String,
    pub mode: KvMode,
    /// Namespace the credential objects are written to
    pub namespace: String,
    pub policy: FailurePolicy,
}

/// Sync driver holding the two authenticated client handles
pub struct Reconciler {
    source: Arc<dyn SecretSource>,
    store: Arc<dyn CredentialStore>,
    plan: SyncPlan,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(
        source: Arc<dyn SecretSource>,
        store: Arc<dyn CredentialStore>,
        plan: SyncPlan,
    ) -> Self {
        Self {
            source,
            store,
            plan,
        }
    }

    #[must_use]
    pub fn plan(&self) -> &SyncPlan {
        &self.plan
    }

    /// Run the sync once
    ///
    /// # Errors
    /// Returns the listing error, or under [`FailurePolicy::AbortOnFirstError`]
    /// the first per-secret error. Under [`FailurePolicy::ContinueAndReport`]
    /// per-secret errors are collected in [`SyncReport::failed`].
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let span = info_span!(
            "sync.run",
            base_path = %self.plan.base_path,
            kv_mode = %self.plan.mode,
            namespace = %self.plan.namespace,
            policy = %self.plan.policy,
        );
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> Result<SyncReport, SyncError> {
        let start = Instant::now();
        let list_path = paths::list_path(&self.plan.base_path, self.plan.mode);

        info!("Listing all secrets from vault at {} ...", list_path);
        let listing = self.source.list(&list_path).await.map_err(|e| {
            error!("Listing {} failed: {}", list_path, e);
            SyncError::from(e)
        })?;

        let mut report = SyncReport {
            listed: listing.keys.len(),
            ..SyncReport::default()
        };
        let mut seen = HashSet::new();

        info!("Starting to create/update k8s secrets ...");
        for entry in listing.keys {
            let Some(name) = payload::entry_name(&entry) else {
                warn!("Skipping non-scalar listing entry: {}", entry);
                report.skipped.push(SkippedEntry {
                    entry,
                    reason: SkipReason::NotScalar,
                });
                continue;
            };
            if !seen.insert(name.clone()) {
                warn!("Skipping duplicate listing entry: {}", name);
                report.skipped.push(SkippedEntry {
                    entry,
                    reason: SkipReason::Duplicate,
                });
                continue;
            }

            match self.sync_secret(&name).await {
                Ok(UpsertOutcome::Created) => report.created.push(name),
                Ok(UpsertOutcome::Updated) => report.updated.push(name),
                Err(error) => match self.plan.policy {
                    FailurePolicy::AbortOnFirstError => {
                        error!(
                            "Secret {} failed, aborting run after {} synced: {}",
                            name,
                            report.synced(),
                            error
                        );
                        return Err(error);
                    }
                    FailurePolicy::ContinueAndReport => {
                        warn!("Secret {} failed, continuing: {}", name, error);
                        report.failed.push(SecretFailure { name, error });
                    }
                },
            }
        }

        info!(
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Processed {} listing entries",
            report.listed
        );
        Ok(report)
    }

    /// Read, convert and upsert one secret
    async fn sync_secret(&self, name: &str) -> Result<UpsertOutcome, SyncError> {
        let span = info_span!("secret.sync", secret.name = name);

        async move {
            info!("Processing secret {} ...", name);
            let read_path = paths::read_path(&self.plan.base_path, self.plan.mode, name);
            let data = self.source.read(&read_path).await?;

            let fields = payload::extract_payload(self.plan.mode, &data).map_err(|message| {
                SyncError::MalformedPayload {
                    path: read_path.clone(),
                    message,
                }
            })?;

            let object = CredentialObject::opaque(name, fields);
            let outcome = upsert::upsert(self.store.as_ref(), &self.plan.namespace, &object).await?;
            Ok(outcome)
        }
        .instrument(span)
        .await
    }
}
