//! # Vault Secret Sync
//!
//! A one-shot job that mirrors HashiCorp Vault KV secrets into Kubernetes.
//!
//! ## Overview
//!
//! 1. **Authenticate** - pre-issued token or AppRole login
//! 2. **List** - enumerate secret names under the configured path
//! 3. **Read** - fetch each secret's key/value payload (KV v1 or v2)
//! 4. **Upsert** - create or replace an `Opaque` Secret with the same name
//!
//! The process exits non-zero on the first fatal error (default policy), or
//! after the run when any secret failed under `--failure-policy continue`.
//!
//! ## Usage
//!
//! See [`vault_secret_sync::cli`] for flags and [`vault_secret_sync::config`]
//! for environment variables.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use vault_secret_sync::cli::Cli;
use vault_secret_sync::config::SyncConfig;
use vault_secret_sync::logging;
use vault_secret_sync::reconciler::Reconciler;
use vault_secret_sync::source::VaultClient;
use vault_secret_sync::store::KubernetesStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Configure rustls crypto provider FIRST, before any other operations
    // Required for rustls 0.23+ when no default provider is set via features
    rustls::crypto::ring::default_provider()
        .install_default()
        .unwrap_or_else(|_| panic!("Failed to install rustls crypto provider"));

    logging::init_from_env()?;

    let cli = Cli::parse();

    info!("Starting Vault Secret Sync v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Build info: datetime={}, git_hash={}",
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    let config = SyncConfig::from_env()
        .and_then(|config| config.with_cli(&cli))
        .context("Failed to load configuration")?;
    info!(
        "Syncing {} ({}) into namespace {}",
        config.secret_path, config.kv_mode, config.target_namespace
    );

    info!("Creating vault client ...");
    let vault = VaultClient::new(&config.vault).context("Failed to create Vault client")?;
    info!("Authenticating to Vault ({}) ...", config.vault.auth.method());
    let vault = vault
        .authenticate(&config.vault.auth)
        .await
        .context("Vault authentication failed")?;

    info!("Creating k8s client ...");
    let store = KubernetesStore::connect(&config.kube)
        .await
        .context("Failed to create Kubernetes client")?;

    let reconciler = Reconciler::new(Arc::new(vault), Arc::new(store), config.plan());
    let report = reconciler.run().await.context("Secret sync aborted")?;
    report.log_summary();

    if report.has_failures() {
        anyhow::bail!(
            "{} of {} secrets failed to sync",
            report.failed.len(),
            report.listed
        );
    }
    Ok(())
}
