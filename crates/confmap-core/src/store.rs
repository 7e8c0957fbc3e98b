//! Collaborator capabilities consumed by the engine.
//!
//! The engine never talks to a network itself. Hosts plug in a
//! [`ConfigStore`] for key/value entries and a [`SecretStore`] for resolving
//! secret references. Retries, timeouts and cancellation belong to these
//! implementations.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::label::Label;
use crate::model::WireEntry;

/// Key/value configuration store.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetches one entry, or `None` if it does not exist.
    async fn get(&self, key: &str, label: &Label) -> Result<Option<WireEntry>, StoreError>;

    /// Lists every entry whose key starts with `prefix` under `label`.
    async fn list_by_key_prefix(
        &self,
        prefix: &str,
        label: &Label,
    ) -> Result<Vec<WireEntry>, StoreError>;

    /// Creates an entry. Fails with [`StoreError::AlreadyExists`] if present.
    async fn create(&self, entry: &WireEntry) -> Result<(), StoreError>;

    /// Creates or unconditionally overwrites an entry.
    async fn upsert(&self, entry: &WireEntry) -> Result<(), StoreError>;

    /// Deletes an entry.
    ///
    /// Returns `Ok(true)` if the store acknowledged the delete (including an
    /// entry that was already absent) and `Ok(false)` if it refused.
    async fn delete(&self, key: &str, label: &Label) -> Result<bool, StoreError>;
}

/// Credential handed to the secret store when opening a connection.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credential {
    /// Whatever identity the hosting environment provides.
    #[default]
    Ambient,
    /// An explicit bearer token.
    Token(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ambient => f.write_str("Ambient"),
            Self::Token(_) => f.write_str("Token(<redacted>)"),
        }
    }
}

/// Secret store that hands out per-vault connections.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Opens a connection to the vault at `vault_url` (`scheme://host`).
    async fn connect(
        &self,
        vault_url: &str,
        credential: &Credential,
    ) -> Result<Arc<dyn SecretConnection>, StoreError>;
}

/// An open connection to one vault.
#[async_trait]
pub trait SecretConnection: Send + Sync {
    /// Fetches a secret value. `None` means the store returned no value.
    async fn get_secret(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<Option<String>, StoreError>;
}
