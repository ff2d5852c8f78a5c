//! # Upsert Decision
//!
//! Create-if-absent, else replace, keyed by name.
//!
//! Per name there is at most one existence probe and one mutating call:
//!
//! ```text
//! Probe ──NotFound──────────────▶ Create ──▶ Created
//!   ├──Found────────────────────▶ Update ──▶ Updated
//!   └──Denied / Transient──────▶ Update ──▶ Updated (or fails loudly)
//! ```
//!
//! A probe failure that is not a clean "not found" is treated as "exists".
//! If the object really is absent the update then fails with the store's own
//! error, which aborts the run under the default policy.

use crate::error::StoreError;
use crate::store::{CredentialObject, CredentialStore};
use tracing::{info, info_span, warn, Instrument, Span};

/// Mutating call chosen after the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Create,
    Update,
}

/// Final state of a successful upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

impl UpsertOutcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::Created => "create",
            UpsertOutcome::Updated => "update",
        }
    }
}

/// Pick the mutating call from the result of the existence probe
#[must_use]
pub fn decide(probe: &Result<CredentialObject, StoreError>) -> UpsertAction {
    match probe {
        Err(e) if e.is_not_found() => UpsertAction::Create,
        Ok(_) | Err(_) => UpsertAction::Update,
    }
}

/// Probe, then create or replace `object` in `namespace`
///
/// # Errors
/// Returns the store error of the create or update call. Probe errors are
/// never returned directly.
pub async fn upsert(
    store: &dyn CredentialStore,
    namespace: &str,
    object: &CredentialObject,
) -> Result<UpsertOutcome, StoreError> {
    let span = info_span!(
        "secret.upsert",
        secret.name = %object.name,
        namespace = namespace,
        operation.type = tracing::field::Empty,
    );

    async move {
        let name = &object.name;
        let probe = store.get(namespace, name).await;
        if let Err(e) = &probe {
            if !e.is_not_found() {
                warn!(
                    error.kind = %e.kind,
                    "Existence check for secret {} failed ({}), treating it as existing",
                    name,
                    e.message
                );
            }
        }

        let outcome = match decide(&probe) {
            UpsertAction::Create => {
                info!("Secret {} doesn't exist, creating ...", name);
                store.create(namespace, object).await?;
                info!("Secret {} created!", name);
                UpsertOutcome::Created
            }
            UpsertAction::Update => {
                info!("Secret {} exist, updating ...", name);
                store.update(namespace, object).await?;
                info!("Secret {} updated!", name);
                UpsertOutcome::Updated
            }
        };
        Span::current().record("operation.type", outcome.as_str());
        Ok(outcome)
    }
    .instrument(span)
    .await
}
