//! # Sync Configuration
//!
//! Job settings loaded from environment variables, then overridden by CLI
//! flags. Environment variables are usually populated from a ConfigMap and a
//! Secret via `envFrom` in the Job manifest.

use crate::cli::Cli;
use crate::constants::*;
use crate::error::SyncError;
use crate::reconciler::paths::normalize_base_path;
use crate::reconciler::{FailurePolicy, KvMode, SyncPlan};
use crate::source::{AppRoleCredentials, VaultAuth, VaultSettings};
use crate::store::KubeConnection;
use zeroize::Zeroizing;

/// Everything a run needs
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub vault: VaultSettings,
    /// Base path of the secrets, without trailing `/`
    pub secret_path: String,
    pub kv_mode: KvMode,
    /// Namespace the Secrets are written to
    pub target_namespace: String,
    pub kube: KubeConnection,
    pub failure_policy: FailurePolicy,
}

impl SyncConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    /// Returns [`SyncError::Config`] for unparsable values or missing credentials
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns [`SyncError::Config`] for unparsable values or missing credentials
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        let kv_mode = env
            .str_or_default(ENV_VAULT_KV_VERSION, DEFAULT_KV_VERSION)
            .parse::<KvMode>()
            .map_err(|e| SyncError::Config(format!("{ENV_VAULT_KV_VERSION}: {e}")))?;
        let failure_policy = match env.non_empty(ENV_SYNC_FAILURE_POLICY) {
            Some(raw) => raw
                .parse::<FailurePolicy>()
                .map_err(|e| SyncError::Config(format!("{ENV_SYNC_FAILURE_POLICY}: {e}")))?,
            None => FailurePolicy::default(),
        };

        Ok(Self {
            vault: VaultSettings {
                addr: env.str_or_default(ENV_VAULT_ADDR, DEFAULT_VAULT_ADDR),
                namespace: env.non_empty(ENV_VAULT_NAMESPACE),
                request_timeout_secs: env.parsed(ENV_VAULT_REQUEST_TIMEOUT_SECS),
                auth: auth_from_env(&env)?,
            },
            secret_path: normalize_base_path(&env.str_or_default(ENV_VAULT_SECRET_PATH, "")),
            kv_mode,
            target_namespace: env.str_or_default(ENV_K8S_NAMESPACE, DEFAULT_TARGET_NAMESPACE),
            kube: KubeConnection {
                local: env.bool_or_default(ENV_LOCAL, false),
                // KUBECONFIG (including `a:b` lists) is resolved by kube itself
                kubeconfig: None,
                context: None,
            },
            failure_policy,
        })
    }

    /// Apply CLI flags on top of the environment, then validate
    ///
    /// # Errors
    /// Returns [`SyncError::Config`] when the merged configuration is invalid
    pub fn with_cli(mut self, cli: &Cli) -> Result<Self, SyncError> {
        if let Some(addr) = &cli.vault_addr {
            self.vault.addr.clone_from(addr);
        }
        if let Some(path) = &cli.secret_path {
            self.secret_path = normalize_base_path(path);
        }
        if let Some(mode) = cli.kv_version {
            self.kv_mode = mode;
        }
        if let Some(namespace) = &cli.namespace {
            self.target_namespace.clone_from(namespace);
        }
        if cli.local {
            self.kube.local = true;
        }
        if let Some(kubeconfig) = &cli.kubeconfig {
            self.kube.kubeconfig = Some(kubeconfig.clone());
        }
        if let Some(context) = &cli.context {
            self.kube.context = Some(context.clone());
        }
        if let Some(policy) = cli.failure_policy {
            self.failure_policy = policy;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check the settings that have no usable default
    ///
    /// # Errors
    /// Returns [`SyncError::Config`] naming the first invalid setting
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.secret_path.is_empty() {
            return Err(SyncError::Config(format!(
                "secret path is required ({ENV_VAULT_SECRET_PATH} or --secret-path)"
            )));
        }
        if self.target_namespace.trim().is_empty() {
            return Err(SyncError::Config(format!(
                "target namespace is empty ({ENV_K8S_NAMESPACE} or --namespace)"
            )));
        }
        if self.vault.addr.trim().is_empty() {
            return Err(SyncError::Config(format!(
                "Vault address is empty ({ENV_VAULT_ADDR} or --vault-addr)"
            )));
        }
        if self.vault.request_timeout_secs == Some(0) {
            return Err(SyncError::Config(format!(
                "{ENV_VAULT_REQUEST_TIMEOUT_SECS} must be greater than zero"
            )));
        }
        Ok(())
    }

    /// Fixed inputs handed to the reconciler
    #[must_use]
    pub fn plan(&self) -> SyncPlan {
        SyncPlan {
            base_path: self.secret_path.clone(),
            mode: self.kv_mode,
            namespace: self.target_namespace.clone(),
            policy: self.failure_policy,
        }
    }
}

/// AppRole when both ids are present, otherwise a pre-issued token
fn auth_from_env<F>(env: &EnvReader<F>) -> Result<VaultAuth, SyncError>
where
    F: Fn(&str) -> Option<String>,
{
    let role_id = env.non_empty(ENV_VAULT_ROLE_ID);
    let secret_id = env.non_empty(ENV_VAULT_SECRET_ID).map(Zeroizing::new);

    match (role_id, secret_id) {
        (Some(role_id), Some(secret_id)) => Ok(VaultAuth::AppRole(AppRoleCredentials {
            mount: env.str_or_default(ENV_VAULT_APPROLE_MOUNT, DEFAULT_APPROLE_MOUNT),
            role_id,
            secret_id,
        })),
        (Some(_), None) | (None, Some(_)) => Err(SyncError::Config(format!(
            "{ENV_VAULT_ROLE_ID} and {ENV_VAULT_SECRET_ID} must be set together"
        ))),
        (None, None) => env
            .non_empty(ENV_VAULT_TOKEN)
            .map(|token| VaultAuth::Token(Zeroizing::new(token)))
            .ok_or_else(|| {
                SyncError::Config(format!(
                    "no Vault credentials: set {ENV_VAULT_TOKEN}, or {ENV_VAULT_ROLE_ID} and {ENV_VAULT_SECRET_ID}"
                ))
            }),
    }
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Read variable, treating blank values as unset
    fn non_empty(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// Read variable as `T`; unset or unparsable values are `None`
    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.non_empty(key).and_then(|v| v.trim().parse().ok())
    }

    /// Read variable as boolean or return default
    fn bool_or_default(&self, key: &str, default: bool) -> bool {
        self.non_empty(key)
            .map(|v| {
                let v_lower = v.trim().to_lowercase();
                v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
            })
            .unwrap_or(default)
    }

    /// Read variable as string or return default
    fn str_or_default(&self, key: &str, default: &str) -> String {
        self.non_empty(key).unwrap_or_else(|| default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn load(vars: &[(&str, &str)]) -> Result<SyncConfig, SyncError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        SyncConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_token() {
        let config = load(&[("VAULT_TOKEN", "hvs.x"), ("VAULT_SECRET_PATH", "secret/app/")]).unwrap();

        assert_eq!(config.vault.addr, DEFAULT_VAULT_ADDR);
        assert_eq!(config.vault.request_timeout_secs, None);
        assert!(config.kube.kubeconfig.is_none());
        assert!(config.vault.namespace.is_none());
        assert_eq!(config.vault.auth.method(), "token");
        assert_eq!(config.secret_path, "secret/app");
        assert_eq!(config.kv_mode, KvMode::V2);
        assert_eq!(config.target_namespace, "default");
        assert!(!config.kube.local);
        assert_eq!(config.failure_policy, FailurePolicy::AbortOnFirstError);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_approle_wins_over_token() {
        let config = load(&[
            ("VAULT_TOKEN", "hvs.x"),
            ("VAULT_ROLE_ID", "role"),
            ("VAULT_SECRET_ID", "secret"),
            ("VAULT_APPROLE_MOUNT", "ci-approle"),
        ])
        .unwrap();

        match &config.vault.auth {
            VaultAuth::AppRole(creds) => {
                assert_eq!(creds.mount, "ci-approle");
                assert_eq!(creds.role_id, "role");
                assert_eq!(creds.secret_id.as_str(), "secret");
            }
            VaultAuth::Token(_) => panic!("expected AppRole auth"),
        }
    }

    #[test]
    fn test_half_approle_is_rejected() {
        let err = load(&[("VAULT_ROLE_ID", "role"), ("VAULT_TOKEN", "hvs.x")]).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn test_missing_credentials() {
        let err = load(&[("VAULT_SECRET_PATH", "secret/app")]).unwrap_err();
        assert!(err.to_string().contains("no Vault credentials"));
    }

    #[test]
    fn test_kv_version_and_local() {
        let config = load(&[
            ("VAULT_TOKEN", "hvs.x"),
            ("VAULT_KV_VERSION", "1"),
            ("LOCAL", "true"),
            ("K8S_NAMESPACE", "apps"),
            ("SYNC_FAILURE_POLICY", "continue"),
            ("VAULT_NAMESPACE", "team-a"),
        ])
        .unwrap();

        assert_eq!(config.kv_mode, KvMode::V1);
        assert!(config.kube.local);
        assert_eq!(config.target_namespace, "apps");
        assert_eq!(config.failure_policy, FailurePolicy::ContinueAndReport);
        assert_eq!(config.vault.namespace.as_deref(), Some("team-a"));
    }

    #[test]
    fn test_invalid_kv_version() {
        let err = load(&[("VAULT_TOKEN", "hvs.x"), ("VAULT_KV_VERSION", "3")]).unwrap_err();
        assert!(err.to_string().contains("VAULT_KV_VERSION"));
    }

    #[test]
    fn test_secret_path_required() {
        let config = load(&[("VAULT_TOKEN", "hvs.x")]).unwrap();
        assert!(config.validate().is_err());
        assert!(config.with_cli(&Cli::default()).is_err());
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = load(&[
            ("VAULT_TOKEN", "hvs.x"),
            ("VAULT_SECRET_PATH", "secret/env"),
            ("K8S_NAMESPACE", "env-ns"),
        ])
        .unwrap();
        let cli = Cli {
            secret_path: Some("kv/cli/".to_string()),
            kv_version: Some(KvMode::V1),
            namespace: Some("cli-ns".to_string()),
            local: true,
            context: Some("kind-dev".to_string()),
            ..Cli::default()
        };

        let config = config.with_cli(&cli).unwrap();
        let plan = config.plan();
        assert_eq!(plan.base_path, "kv/cli");
        assert_eq!(plan.mode, KvMode::V1);
        assert_eq!(plan.namespace, "cli-ns");
        assert!(config.kube.local);
        assert_eq!(config.kube.context.as_deref(), Some("kind-dev"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = load(&[
            ("VAULT_TOKEN", "hvs.x"),
            ("VAULT_ADDR", "  "),
            ("VAULT_REQUEST_TIMEOUT_SECS", "soon"),
        ])
        .unwrap();
        assert_eq!(config.vault.addr, DEFAULT_VAULT_ADDR);
        assert_eq!(config.vault.request_timeout_secs, None);
    }

    #[test]
    fn test_kubeconfig_env_is_left_to_kube() {
        let config = load(&[
            ("VAULT_TOKEN", "hvs.x"),
            ("VAULT_SECRET_PATH", "secret/app"),
            ("LOCAL", "true"),
            ("KUBECONFIG", "/tmp/a.yaml:/tmp/b.yaml"),
        ])
        .unwrap();
        assert!(config.kube.local);
        assert!(config.kube.kubeconfig.is_none());

        let cli = Cli {
            kubeconfig: Some(PathBuf::from("/etc/kube/job.yaml")),
            ..Cli::default()
        };
        let config = config.with_cli(&cli).unwrap();
        assert_eq!(
            config.kube.kubeconfig.as_deref(),
            Some(std::path::Path::new("/etc/kube/job.yaml"))
        );
    }

    #[test]
    fn test_request_timeout_is_opt_in() {
        let config = load(&[
            ("VAULT_TOKEN", "hvs.x"),
            ("VAULT_SECRET_PATH", "secret/app"),
            ("VAULT_REQUEST_TIMEOUT_SECS", "45"),
        ])
        .unwrap();
        assert_eq!(config.vault.request_timeout_secs, Some(45));
        assert!(config.validate().is_ok());

        let config = load(&[
            ("VAULT_TOKEN", "hvs.x"),
            ("VAULT_SECRET_PATH", "secret/app"),
            ("VAULT_REQUEST_TIMEOUT_SECS", "0"),
        ])
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("VAULT_REQUEST_TIMEOUT_SECS"));
    }
}
