//! # Command Line
//!
//! Flags for the `vault-secret-sync` binary.
//!
//! Every flag is optional and overrides the matching environment variable
//! (see [`crate::config`]). Credentials are only read from the environment.
//!
//! ## Usage
//!
//! ```bash
//! # In-cluster, everything from the environment
//! vault-secret-sync
//!
//! # Local run against the current kubeconfig context
//! VAULT_TOKEN=... vault-secret-sync --local --secret-path secret/app --namespace apps
//!
//! # KV v1 mount, keep going when a single secret fails
//! vault-secret-sync --kv-version 1 --failure-policy continue
//! ```

use crate::reconciler::{FailurePolicy, KvMode};
use clap::Parser;
use std::path::PathBuf;

/// Mirror Vault KV secrets into Kubernetes Opaque Secrets
#[derive(Debug, Default, Parser)]
#[command(name = "vault-secret-sync", version, long_about = None)]
pub struct Cli {
    /// Vault address (overrides VAULT_ADDR)
    #[arg(long, value_name = "URL")]
    pub vault_addr: Option<String>,

    /// Base path of the secrets, e.g. `secret/app` (overrides VAULT_SECRET_PATH)
    #[arg(long, value_name = "PATH")]
    pub secret_path: Option<String>,

    /// KV engine version: 1 or 2 (overrides VAULT_KV_VERSION)
    #[arg(long, value_name = "VERSION")]
    pub kv_version: Option<KvMode>,

    /// Target Kubernetes namespace (overrides K8S_NAMESPACE)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Use a kubeconfig instead of the in-cluster service account (same as LOCAL=true)
    #[arg(long)]
    pub local: bool,

    /// Kubeconfig path for --local (overrides KUBECONFIG)
    #[arg(long, value_name = "FILE")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context for --local
    #[arg(long)]
    pub context: Option<String>,

    /// abort (default) or continue when a single secret fails (overrides SYNC_FAILURE_POLICY)
    #[arg(long, value_name = "POLICY")]
    pub failure_policy: Option<FailurePolicy>,
}
