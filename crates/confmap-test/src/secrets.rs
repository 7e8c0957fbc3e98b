//! In-memory secret store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use confmap_core::{Credential, SecretConnection, SecretStore, StoreError};
use parking_lot::{Mutex, RwLock};

type SecretKey = (String, String, Option<String>);

#[derive(Debug, Default)]
struct Vaults {
    secrets: RwLock<HashMap<SecretKey, String>>,
    fail_fetches: AtomicBool,
}

/// A [`SecretStore`] holding secrets in memory, keyed by vault host.
///
/// Every `connect` call is counted per host so tests can check that
/// connections are reused.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    vaults: Arc<Vaults>,
    connections: Mutex<HashMap<String, usize>>,
}

impl MemorySecretStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a secret. A `None` version is returned for unversioned lookups.
    pub fn insert(&self, vault_host: &str, name: &str, version: Option<&str>, value: &str) {
        self.vaults.secrets.write().insert(
            (
                vault_host.to_string(),
                name.to_string(),
                version.map(str::to_string),
            ),
            value.to_string(),
        );
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_secret(
        self,
        vault_host: &str,
        name: &str,
        version: Option<&str>,
        value: &str,
    ) -> Self {
        self.insert(vault_host, name, version, value);
        self
    }

    /// Makes every subsequent fetch fail.
    pub fn fail_fetches(&self) {
        self.vaults.fail_fetches.store(true, Ordering::SeqCst);
    }

    /// Number of connections opened to `vault_host`.
    pub fn connections(&self, vault_host: &str) -> usize {
        self.connections.lock().get(vault_host).copied().unwrap_or(0)
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn connect(
        &self,
        vault_url: &str,
        _credential: &Credential,
    ) -> Result<Arc<dyn SecretConnection>, StoreError> {
        let host = vault_url
            .split_once("://")
            .map_or(vault_url, |(_, host)| host)
            .to_string();

        // Give racing callers a chance to interleave.
        tokio::task::yield_now().await;

        *self.connections.lock().entry(host.clone()).or_insert(0) += 1;
        Ok(Arc::new(MemorySecretConnection {
            host,
            vaults: Arc::clone(&self.vaults),
        }))
    }
}

#[derive(Debug)]
struct MemorySecretConnection {
    host: String,
    vaults: Arc<Vaults>,
}

#[async_trait]
impl SecretConnection for MemorySecretConnection {
    async fn get_secret(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        if self.vaults.fail_fetches.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(format!("vault {} unreachable", self.host)));
        }
        let key = (
            self.host.clone(),
            name.to_string(),
            version.map(str::to_string),
        );
        Ok(self.vaults.secrets.read().get(&key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VAULT: &str = "myvault.vault.azure.net";

    #[tokio::test]
    async fn test_fetch_by_version() {
        let store = MemorySecretStore::new()
            .with_secret(VAULT, "dbpass", Some("abc123"), "pinned")
            .with_secret(VAULT, "dbpass", None, "latest");

        let connection = store
            .connect("https://myvault.vault.azure.net", &Credential::Ambient)
            .await
            .unwrap();

        assert_eq!(
            connection.get_secret("dbpass", Some("abc123")).await.unwrap(),
            Some("pinned".to_string())
        );
        assert_eq!(
            connection.get_secret("dbpass", None).await.unwrap(),
            Some("latest".to_string())
        );
        assert_eq!(connection.get_secret("other", None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_connections_are_counted_per_host() {
        let store = MemorySecretStore::new();
        let _ = store.connect("https://a.vault", &Credential::Ambient).await;
        let _ = store.connect("https://a.vault", &Credential::Ambient).await;
        let _ = store.connect("https://b.vault", &Credential::Ambient).await;

        assert_eq!(store.connections("a.vault"), 2);
        assert_eq!(store.connections("b.vault"), 1);
        assert_eq!(store.connections("c.vault"), 0);
    }

    #[tokio::test]
    async fn test_fail_fetches() {
        let store = MemorySecretStore::new().with_secret(VAULT, "dbpass", None, "x");
        let connection = store
            .connect("https://myvault.vault.azure.net", &Credential::Ambient)
            .await
            .unwrap();
        store.fail_fetches();

        assert!(connection.get_secret("dbpass", None).await.is_err());
    }
}
