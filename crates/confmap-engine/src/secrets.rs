//! Secret-reference resolution.

use std::sync::Arc;

use confmap_core::{
    Credential, MappingError, MappingResult, SecretConnection, SecretReference, SecretStore,
    StoreError,
};
use confmap_telemetry::metrics;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

type ConnectionSlot = Arc<OnceCell<Arc<dyn SecretConnection>>>;

/// Resolves secret-reference payloads through a [`SecretStore`].
///
/// Connections are opened lazily, one per vault host, and kept for the life
/// of the resolver. Concurrent first lookups against the same host share a
/// single connect call.
pub struct SecretResolver {
    store: Arc<dyn SecretStore>,
    credential: Credential,
    connections: DashMap<String, ConnectionSlot>,
}

impl SecretResolver {
    /// Creates a resolver that connects with `credential`.
    pub fn new(store: Arc<dyn SecretStore>, credential: Credential) -> Self {
        Self {
            store,
            credential,
            connections: DashMap::new(),
        }
    }

    /// Extracts the secret location from a payload such as
    /// `{"uri":"https://myvault.vault.azure.net/secrets/dbpass/abc123"}`.
    ///
    /// Returns `Ok(None)` when the payload is a JSON object without a string
    /// `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::InvalidSecretReference`] if the payload is not
    /// a JSON object or the URI has no vault host or secret name.
    pub fn parse_payload(payload: &str) -> MappingResult<Option<SecretReference>> {
        let value: Value = serde_json::from_str(payload).map_err(|e| {
            MappingError::invalid_secret_reference(format!("payload is not JSON: {e}"))
        })?;
        let Value::Object(object) = value else {
            return Err(MappingError::invalid_secret_reference(
                "payload is not a JSON object",
            ));
        };
        match object.get("uri").and_then(Value::as_str) {
            Some(uri) => SecretReference::parse(uri).map(Some),
            None => Ok(None),
        }
    }

    /// Resolves a payload to its secret value.
    ///
    /// Returns `Ok(None)` if the payload carries no `uri` or the store holds
    /// no value for the secret.
    ///
    /// # Errors
    ///
    /// - [`MappingError::InvalidSecretReference`] for a malformed payload
    /// - [`MappingError::SecretFetch`] if connecting or fetching fails
    pub async fn resolve(&self, payload: &str) -> MappingResult<Option<String>> {
        let Some(reference) = Self::parse_payload(payload)? else {
            debug!("secret payload has no uri");
            return Ok(None);
        };

        let connection = self.connection(&reference).await?;
        let fetched = connection
            .get_secret(&reference.secret_name, reference.secret_version.as_deref())
            .await;
        metrics::record_secret_fetch(&reference.vault_host, fetched.is_ok());

        fetched.map_err(|source| {
            warn!(
                vault = %reference.vault_host,
                secret = %reference.secret_name,
                error = %source,
                "secret fetch failed"
            );
            MappingError::SecretFetch {
                vault_host: reference.vault_host.clone(),
                secret_name: reference.secret_name.clone(),
                source,
            }
        })
    }

    /// Number of vault hosts with an open connection.
    pub fn open_connections(&self) -> usize {
        self.connections
            .iter()
            .filter(|slot| slot.value().initialized())
            .count()
    }

    async fn connection(
        &self,
        reference: &SecretReference,
    ) -> MappingResult<Arc<dyn SecretConnection>> {
        // Clone the slot out so no map guard is held across the await.
        let slot = Arc::clone(
            self.connections
                .entry(reference.vault_host.clone())
                .or_default()
                .value(),
        );

        let connection = slot
            .get_or_try_init(|| async {
                let url = reference.vault_url();
                let connection = self.store.connect(&url, &self.credential).await?;
                debug!(vault = %reference.vault_host, "opened secret store connection");
                metrics::record_secret_connection(&reference.vault_host);
                Ok::<_, StoreError>(connection)
            })
            .await
            .map_err(|source| MappingError::SecretFetch {
                vault_host: reference.vault_host.clone(),
                secret_name: reference.secret_name.clone(),
                source,
            })?;
        Ok(Arc::clone(connection))
    }
}

impl std::fmt::Debug for SecretResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretResolver")
            .field("credential", &self.credential)
            .field("vaults", &self.connections.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confmap_test::fixtures::{FIXTURE_SECRET_PAYLOAD, FIXTURE_VAULT};
    use confmap_test::MemorySecretStore;
    use pretty_assertions::assert_eq;

    fn resolver(store: &Arc<MemorySecretStore>) -> SecretResolver {
        SecretResolver::new(
            Arc::clone(store) as Arc<dyn SecretStore>,
            Credential::Ambient,
        )
    }

    #[test]
    fn test_parse_payload() {
        let reference = SecretResolver::parse_payload(FIXTURE_SECRET_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(reference.vault_host, "myvault.vault.azure.net");
        assert_eq!(reference.secret_name, "dbpass");
        assert_eq!(reference.secret_version.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_payload_without_uri_is_absent() {
        assert_eq!(SecretResolver::parse_payload(r#"{"other":1}"#).unwrap(), None);
        assert_eq!(SecretResolver::parse_payload(r#"{"uri":42}"#).unwrap(), None);
    }

    #[test]
    fn test_malformed_payload_is_rejected() {
        for payload in ["not json", r#"["uri"]"#, r#"{"uri":"https://vault.example/secrets"}"#] {
            let err = SecretResolver::parse_payload(payload).unwrap_err();
            assert!(
                matches!(err, MappingError::InvalidSecretReference { .. }),
                "payload {payload}"
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_fetches_pinned_version() {
        let store = Arc::new(MemorySecretStore::new().with_secret(
            FIXTURE_VAULT,
            "dbpass",
            Some("abc123"),
            "hunter2",
        ));
        let resolver = resolver(&store);

        let value = resolver.resolve(FIXTURE_SECRET_PAYLOAD).await.unwrap();
        assert_eq!(value.as_deref(), Some("hunter2"));
    }

    #[tokio::test]
    async fn test_one_connection_per_vault_host() {
        let store = Arc::new(
            MemorySecretStore::new()
                .with_secret(FIXTURE_VAULT, "a", None, "1")
                .with_secret(FIXTURE_VAULT, "b", None, "2"),
        );
        let resolver = resolver(&store);

        let a = r#"{"uri":"https://myvault.vault.azure.net/secrets/a"}"#;
        let b = r#"{"uri":"https://myvault.vault.azure.net/secrets/b"}"#;
        let (first, second, third) = tokio::join!(
            resolver.resolve(a),
            resolver.resolve(b),
            resolver.resolve(a)
        );

        assert_eq!(first.unwrap().as_deref(), Some("1"));
        assert_eq!(second.unwrap().as_deref(), Some("2"));
        assert_eq!(third.unwrap().as_deref(), Some("1"));
        assert_eq!(store.connections(FIXTURE_VAULT), 1);
        assert_eq!(resolver.open_connections(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let store = Arc::new(MemorySecretStore::new());
        store.fail_fetches();
        let resolver = resolver(&store);

        let err = resolver.resolve(FIXTURE_SECRET_PAYLOAD).await.unwrap_err();
        match err {
            MappingError::SecretFetch {
                vault_host,
                secret_name,
                source,
            } => {
                assert_eq!(vault_host, FIXTURE_VAULT);
                assert_eq!(secret_name, "dbpass");
                assert!(matches!(source, StoreError::Unavailable(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_secret_is_absent() {
        let store = Arc::new(MemorySecretStore::new());
        let resolver = resolver(&store);
        assert_eq!(resolver.resolve(FIXTURE_SECRET_PAYLOAD).await.unwrap(), None);
    }
}
