//! # Kubernetes Secret Store
//!
//! [`CredentialStore`] backed by core/v1 `Secret` objects.
//!
//! The client is built either from the in-cluster service account (default,
//! the job runs as a pod) or from a kubeconfig for local runs.

use crate::constants::{MANAGED_BY_LABEL, MANAGED_BY_VALUE};
use crate::error::{StoreError, StoreErrorKind};
use crate::store::{CredentialObject, CredentialStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::api::{Api, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// How to reach the Kubernetes API
#[derive(Debug, Clone, Default)]
pub struct KubeConnection {
    /// Use a kubeconfig (local testing) instead of the in-cluster service account
    pub local: bool,
    /// Explicit kubeconfig path; `KUBECONFIG` / `~/.kube/config` otherwise
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context; the current context otherwise
    pub context: Option<String>,
}

/// Kubernetes-backed credential store
#[derive(Clone)]
pub struct KubernetesStore {
    client: Client,
}

impl std::fmt::Debug for KubernetesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubernetesStore").finish_non_exhaustive()
    }
}

impl KubernetesStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client for the requested connection context
    ///
    /// # Errors
    /// Returns an error if no usable cluster configuration is found
    pub async fn connect(connection: &KubeConnection) -> Result<Self> {
        let config = if connection.local {
            let options = KubeConfigOptions {
                context: connection.context.clone(),
                ..KubeConfigOptions::default()
            };
            if let Some(path) = &connection.kubeconfig {
                info!("Using kubeconfig {}", path.display());
                let kubeconfig = Kubeconfig::read_from(path)
                    .with_context(|| format!("Failed to read kubeconfig {}", path.display()))?;
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .context("Failed to load kubeconfig")?
            } else {
                info!("Using default kubeconfig");
                Config::from_kubeconfig(&options)
                    .await
                    .context("Failed to load kubeconfig. Ensure kubeconfig is configured.")?
            }
        } else {
            Config::incluster().context(
                "Failed to load in-cluster configuration. Set LOCAL=true to use a kubeconfig.",
            )?
        };

        let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
        Ok(Self::new(client))
    }

    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl CredentialStore for KubernetesStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<CredentialObject, StoreError> {
        let secret = self
            .secrets(namespace)
            .get(name)
            .await
            .map_err(|e| store_error("get", namespace, name, &e))?;
        Ok(from_secret(name, secret))
    }

    async fn create(&self, namespace: &str, object: &CredentialObject) -> Result<(), StoreError> {
        let secret = to_secret(namespace, object);
        self.secrets(namespace)
            .create(&PostParams::default(), &secret)
            .await
            .map_err(|e| store_error("create", namespace, &object.name, &e))?;
        debug!("Created secret {}/{}", namespace, object.name);
        Ok(())
    }

    async fn update(&self, namespace: &str, object: &CredentialObject) -> Result<(), StoreError> {
        // No resourceVersion: unconditional replace, last write wins
        let secret = to_secret(namespace, object);
        self.secrets(namespace)
            .replace(&object.name, &PostParams::default(), &secret)
            .await
            .map_err(|e| store_error("update", namespace, &object.name, &e))?;
        debug!("Replaced secret {}/{}", namespace, object.name);
        Ok(())
    }
}

/// Classify a kube error by API status code
fn classify(error: &kube::Error) -> StoreErrorKind {
    match error {
        kube::Error::Api(api_err) if api_err.code == 404 => StoreErrorKind::NotFound,
        kube::Error::Api(api_err) if api_err.code == 401 || api_err.code == 403 => {
            StoreErrorKind::Denied
        }
        _ => StoreErrorKind::Transient,
    }
}

fn store_error(operation: &str, namespace: &str, name: &str, error: &kube::Error) -> StoreError {
    StoreError::new(
        classify(error),
        format!("{operation} secret {namespace}/{name}: {error}"),
    )
}

/// Build the core/v1 Secret written for `object`
fn to_secret(namespace: &str, object: &CredentialObject) -> Secret {
    let data = object
        .data
        .iter()
        .map(|(key, value)| (key.clone(), ByteString(value.clone())))
        .collect();

    Secret {
        metadata: ObjectMeta {
            name: Some(object.name.clone()),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([(
                MANAGED_BY_LABEL.to_string(),
                MANAGED_BY_VALUE.to_string(),
            )])),
            ..ObjectMeta::default()
        },
        data: Some(data),
        type_: Some(object.secret_type.clone()),
        ..Secret::default()
    }
}

fn from_secret(name: &str, secret: Secret) -> CredentialObject {
    let data = secret
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.0))
        .collect();

    CredentialObject {
        name: secret.metadata.name.unwrap_or_else(|| name.to_string()),
        data,
        secret_type: secret.type_.unwrap_or_default(),
    }
}
