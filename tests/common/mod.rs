//! Common test utilities
//!
//! In-memory [`SecretSource`] and [`CredentialStore`] fakes that record every
//! call, plus rustls setup for the Pact tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, Once};
use vault_secret_sync::error::{SourceError, StoreError, StoreErrorKind};
use vault_secret_sync::source::{SecretData, SecretListing, SecretSource};
use vault_secret_sync::store::{CredentialObject, CredentialStore};

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        // Another test binary component may already have installed one
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Turn a `json!({...})` literal into a read response
pub fn data(value: Value) -> SecretData {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Secret backend keyed by full path
#[derive(Debug, Default)]
pub struct FakeSource {
    listings: HashMap<String, Vec<Value>>,
    secrets: HashMap<String, SecretData>,
    unavailable: HashSet<String>,
    pub lists: Mutex<Vec<String>>,
    pub reads: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, path: &str, keys: Vec<Value>) -> Self {
        self.listings.insert(path.to_string(), keys);
        self
    }

    pub fn with_secret(mut self, path: &str, data: SecretData) -> Self {
        self.secrets.insert(path.to_string(), data);
        self
    }

    /// Make list or read of `path` fail with `SourceUnavailable`
    pub fn with_unavailable(mut self, path: &str) -> Self {
        self.unavailable.insert(path.to_string());
        self
    }

    pub fn read_paths(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    pub fn list_paths(&self) -> Vec<String> {
        self.lists.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretSource for FakeSource {
    async fn list(&self, path: &str) -> Result<SecretListing, SourceError> {
        self.lists.lock().unwrap().push(path.to_string());
        if self.unavailable.contains(path) {
            return Err(SourceError::unavailable(path, "HTTP 503 Service Unavailable"));
        }
        self.listings
            .get(path)
            .map(|keys| SecretListing { keys: keys.clone() })
            .ok_or_else(|| SourceError::not_found(path))
    }

    async fn read(&self, path: &str) -> Result<SecretData, SourceError> {
        self.reads.lock().unwrap().push(path.to_string());
        if self.unavailable.contains(path) {
            return Err(SourceError::unavailable(path, "HTTP 503 Service Unavailable"));
        }
        self.secrets
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::not_found(path))
    }
}

/// One recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get(String),
    Create(String),
    Update(String),
}

/// Credential store holding objects per `(namespace, name)`
///
/// Mirrors the API server: create of an existing object conflicts, update of
/// a missing object is not found.
#[derive(Debug, Default)]
pub struct FakeStore {
    objects: Mutex<BTreeMap<(String, String), CredentialObject>>,
    calls: Mutex<Vec<StoreCall>>,
    probe_failure: Option<StoreErrorKind>,
    rejected: HashSet<String>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, namespace: &str, object: CredentialObject) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert((namespace.to_string(), object.name.clone()), object);
        self
    }

    /// Make every `get` fail with `kind` instead of answering
    pub fn with_probe_failure(mut self, kind: StoreErrorKind) -> Self {
        self.probe_failure = Some(kind);
        self
    }

    /// Reject create and update for `name`
    pub fn rejecting(mut self, name: &str) -> Self {
        self.rejected.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn object(&self, namespace: &str, name: &str) -> Option<CredentialObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<(String, String), CredentialObject> {
        self.objects.lock().unwrap().clone()
    }

    pub fn count(&self, matcher: fn(&StoreCall) -> bool) -> usize {
        self.calls().iter().filter(|call| matcher(call)).count()
    }

    fn check_rejected(&self, name: &str) -> Result<(), StoreError> {
        if self.rejected.contains(name) {
            return Err(StoreError::new(
                StoreErrorKind::Transient,
                format!("admission webhook denied secret {name}"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FakeStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<CredentialObject, StoreError> {
        self.calls.lock().unwrap().push(StoreCall::Get(name.to_string()));
        if let Some(kind) = self.probe_failure {
            return Err(StoreError::new(kind, "probe failed"));
        }
        self.object(namespace, name)
            .ok_or_else(|| StoreError::not_found(format!("secrets \"{name}\" not found")))
    }

    async fn create(&self, namespace: &str, object: &CredentialObject) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Create(object.name.clone()));
        self.check_rejected(&object.name)?;

        let mut objects = self.objects.lock().unwrap();
        let key = (namespace.to_string(), object.name.clone());
        if objects.contains_key(&key) {
            return Err(StoreError::new(
                StoreErrorKind::Transient,
                format!("secrets \"{}\" already exists", object.name),
            ));
        }
        objects.insert(key, object.clone());
        Ok(())
    }

    async fn update(&self, namespace: &str, object: &CredentialObject) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Update(object.name.clone()));
        self.check_rejected(&object.name)?;

        let mut objects = self.objects.lock().unwrap();
        let key = (namespace.to_string(), object.name.clone());
        if !objects.contains_key(&key) {
            return Err(StoreError::not_found(format!(
                "secrets \"{}\" not found",
                object.name
            )));
        }
        objects.insert(key, object.clone());
        Ok(())
    }
}
