//! Section load/save/delete orchestration.

use std::sync::Arc;

use async_trait::async_trait;
use confmap_core::{
    codec, CodecError, ConfigSection, ConfigStore, ContentType, Credential, EntryIdentity, Label,
    MappingError, MappingResult, NotificationPlan, ResolvedMapping, SecretConnection,
    SecretStore, StoreError, WireEntry,
};
use confmap_telemetry::metrics::{self, LoadOutcome};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::catalog::TypeCatalog;
use crate::identity::build_identities;
use crate::options::EngineOptions;
use crate::resolver::MappingResolver;
use crate::scanner::TypeScanner;
use crate::secrets::SecretResolver;

/// Maps section types onto a configuration store.
///
/// One service owns the mapping cache and the vault connection cache, so it
/// should be built once and shared (it is `Send + Sync`).
///
/// Every `label` argument is optional; `None` or `Some("")` address entries
/// without a label.
pub struct SectionService {
    resolver: MappingResolver,
    store: Arc<dyn ConfigStore>,
    secrets: SecretResolver,
}

impl SectionService {
    /// Starts building a service over `store`.
    pub fn builder(store: Arc<dyn ConfigStore>) -> SectionServiceBuilder {
        SectionServiceBuilder::new(store)
    }

    /// The mapping resolver.
    pub fn resolver(&self) -> &MappingResolver {
        &self.resolver
    }

    /// The secret resolver.
    pub fn secrets(&self) -> &SecretResolver {
        &self.secrets
    }

    /// Read-only view of the mapping of `T`.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors.
    pub fn mapping<T: ConfigSection>(&self) -> MappingResult<Arc<ResolvedMapping>> {
        self.resolver.resolve::<T>()
    }

    /// Wire identities of `T` under `label`.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors.
    pub fn identities<T: ConfigSection>(
        &self,
        label: Option<&str>,
        include_secrets: bool,
    ) -> MappingResult<Vec<EntryIdentity>> {
        let mapping = self.resolver.resolve::<T>()?;
        Ok(build_identities(
            &mapping,
            &Label::from_optional(label),
            include_secrets,
        ))
    }

    /// Reads one key and decodes it with the entry's own content type.
    ///
    /// A missing entry or an empty value gives `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Store failures, secret failures and conversion failures.
    #[instrument(skip(self))]
    pub async fn get_value<T: DeserializeOwned>(
        &self,
        key: &str,
        label: Option<&str>,
    ) -> MappingResult<Option<T>> {
        let label = Label::from_optional(label);
        let Some(entry) = self.store.get(key, &label).await? else {
            debug!("entry not found");
            return Ok(None);
        };
        self.decode_value(key, &entry.content, entry.kind()).await
    }

    /// Loads `T` from the entries of its section under `label`.
    ///
    /// Returns `Ok(None)` when no entry under `label` matches one of the
    /// type's keys. Unmarked fields keep their default values. If the store
    /// returns the same key twice, the later entry wins.
    ///
    /// # Errors
    ///
    /// Resolution, store, secret and conversion failures.
    #[instrument(skip(self), fields(section = std::any::type_name::<T>()))]
    pub async fn load_section<T: ConfigSection>(
        &self,
        label: Option<&str>,
    ) -> MappingResult<Option<T>> {
        let mapping = self.resolver.resolve::<T>()?;
        if mapping.is_empty() {
            debug!("section has no mapped keys");
            return Ok(None);
        }

        let label = Label::from_optional(label);
        let result = self.load_mapped::<T>(&mapping, &label).await;

        let outcome = match &result {
            Ok(Some(_)) => LoadOutcome::Found,
            Ok(None) => LoadOutcome::Absent,
            Err(_) => LoadOutcome::Error,
        };
        metrics::record_section_load(&mapping.section.section_name, outcome);
        result
    }

    /// Writes every non-secret key of `value` under `label`.
    ///
    /// Each entry is created, or overwritten if it already exists.
    ///
    /// # Errors
    ///
    /// Resolution, conversion and store failures. A type that provides no
    /// codec for a mapped value fails with [`CodecError::NoCodec`] instead
    /// of writing an empty entry. Writing stops at the first failure.
    #[instrument(skip(self, value), fields(section = std::any::type_name::<T>()))]
    pub async fn save_section<T: ConfigSection>(
        &self,
        value: &T,
        label: Option<&str>,
    ) -> MappingResult<()> {
        let mapping = self.resolver.resolve::<T>()?;
        let identities = build_identities(&mapping, &Label::from_optional(label), false);

        for identity in identities {
            let encoded = match &identity.owner_field {
                None => value.encode_object().and_then(|encoded| {
                    encoded.ok_or_else(|| CodecError::no_codec(mapping.section.owner.short_name()))
                }),
                Some(field) => value
                    .encode_field(field, identity.content_type)
                    .and_then(|encoded| {
                        encoded.ok_or_else(|| CodecError::no_codec(field.as_str()))
                    }),
            }
            .map_err(|e| MappingError::codec(&identity.key, e))?;

            let entry =
                WireEntry::new(identity.key, identity.label, identity.content_type, encoded);
            self.write_entry(&entry).await?;
        }

        metrics::record_section_save(&mapping.section.section_name);
        Ok(())
    }

    /// Deletes every key of `T`, secrets included, under `label`.
    ///
    /// Returns `true` only if the store acknowledged every delete.
    ///
    /// # Errors
    ///
    /// Resolution and store failures.
    #[instrument(skip(self), fields(section = std::any::type_name::<T>()))]
    pub async fn delete_section<T: ConfigSection>(
        &self,
        label: Option<&str>,
    ) -> MappingResult<bool> {
        let mapping = self.resolver.resolve::<T>()?;
        let identities = build_identities(&mapping, &Label::from_optional(label), true);

        let mut all_deleted = true;
        for identity in identities {
            let deleted = self.store.delete(&identity.key, &identity.label).await?;
            metrics::record_entry_delete(deleted);
            if !deleted {
                warn!(key = %identity.key, "store refused delete");
                all_deleted = false;
            }
        }
        Ok(all_deleted)
    }

    /// Watched keys of every discovered section, grouped by section name.
    ///
    /// # Errors
    ///
    /// Discovery and resolution failures.
    #[instrument(skip(self))]
    pub fn notification_plan(&self) -> MappingResult<NotificationPlan> {
        let mut plan = NotificationPlan::new();
        for registered in self.resolver.discover()?.iter() {
            let mapping = self.resolver.resolve_registered(registered)?;
            plan.insert(
                mapping.section.section_name.clone(),
                mapping.notification_keys(),
            );
        }
        debug!(sections = plan.len(), "built notification plan");
        Ok(plan)
    }

    /// Writes one raw value, creating or overwriting the entry.
    ///
    /// # Errors
    ///
    /// Store failures other than an existing entry.
    #[instrument(skip(self, content))]
    pub async fn set_value(
        &self,
        key: &str,
        content: &str,
        content_type: ContentType,
        label: Option<&str>,
    ) -> MappingResult<()> {
        let entry = WireEntry::new(key, Label::from_optional(label), content_type, content);
        self.write_entry(&entry).await
    }

    /// Encodes `value` with `content_type` and writes it.
    ///
    /// # Errors
    ///
    /// Conversion failures (secret references cannot be encoded) and store
    /// failures.
    pub async fn set_typed_value<V: Serialize + ?Sized + Sync>(
        &self,
        key: &str,
        value: &V,
        content_type: ContentType,
        label: Option<&str>,
    ) -> MappingResult<()> {
        let content =
            codec::encode(value, content_type).map_err(|e| MappingError::codec(key, e))?;
        self.set_value(key, &content, content_type, label).await
    }

    /// Deletes one entry. Returns whether the store acknowledged it.
    ///
    /// # Errors
    ///
    /// Store failures.
    #[instrument(skip(self))]
    pub async fn delete_value(&self, key: &str, label: Option<&str>) -> MappingResult<bool> {
        let deleted = self
            .store
            .delete(key, &Label::from_optional(label))
            .await?;
        metrics::record_entry_delete(deleted);
        Ok(deleted)
    }

    async fn load_mapped<T: ConfigSection>(
        &self,
        mapping: &ResolvedMapping,
        label: &Label,
    ) -> MappingResult<Option<T>> {
        let entries = self
            .store
            .list_by_key_prefix(&mapping.section.section_name, label)
            .await?;
        debug!(entries = entries.len(), "listed section entries");

        if let Some(whole) = &mapping.whole_object {
            let Some(entry) = entries.iter().rev().find(|entry| entry.key == whole.key) else {
                return Ok(None);
            };
            if entry.content.is_empty() {
                return Ok(None);
            }
            return T::decode_object(&entry.content)
                .and_then(|decoded| {
                    decoded
                        .ok_or_else(|| CodecError::no_codec(mapping.section.owner.short_name()))
                })
                .map(Some)
                .map_err(|e| MappingError::codec(&entry.key, e));
        }

        let mut value = T::default();
        let mut matched = 0_usize;
        for entry in &entries {
            let Some((field, identity)) = mapping.field_for_key(&entry.key) else {
                continue;
            };
            matched += 1;

            let (raw, content_type) = if identity.content_type.is_secret() {
                if entry.content.is_empty() {
                    continue;
                }
                match self.secrets.resolve(&entry.content).await? {
                    Some(secret) => (secret, ContentType::String),
                    None => {
                        debug!(key = %entry.key, "secret reference resolved to nothing");
                        continue;
                    }
                }
            } else {
                (entry.content.clone(), identity.content_type)
            };

            let assigned = value
                .decode_field(field, &raw, content_type)
                .map_err(|e| MappingError::codec(&entry.key, e))?;
            if !assigned && !raw.is_empty() {
                return Err(MappingError::codec(&entry.key, CodecError::no_codec(field)));
            }
        }

        if matched == 0 {
            debug!("no entries matched a mapped key");
            return Ok(None);
        }
        Ok(Some(value))
    }

    async fn decode_value<T: DeserializeOwned>(
        &self,
        key: &str,
        raw: &str,
        content_type: ContentType,
    ) -> MappingResult<Option<T>> {
        if raw.is_empty() {
            return Ok(None);
        }
        if content_type.is_secret() {
            let Some(secret) = self.secrets.resolve(raw).await? else {
                return Ok(None);
            };
            return codec::decode(&secret, ContentType::String)
                .map_err(|e| MappingError::codec(key, e));
        }
        codec::decode(raw, content_type).map_err(|e| MappingError::codec(key, e))
    }

    async fn write_entry(&self, entry: &WireEntry) -> MappingResult<()> {
        match self.store.create(entry).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_already_exists() => {
                debug!(key = %entry.key, label = %entry.label, "entry exists, overwriting");
                self.store.upsert(entry).await.map_err(MappingError::from)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Builder for [`SectionService`].
pub struct SectionServiceBuilder {
    store: Arc<dyn ConfigStore>,
    secrets: Option<Arc<dyn SecretStore>>,
    catalog: TypeCatalog,
    options: EngineOptions,
}

impl SectionServiceBuilder {
    fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            secrets: None,
            catalog: TypeCatalog::new(),
            options: EngineOptions::default(),
        }
    }

    /// Sets the catalog of section types.
    #[must_use]
    pub fn catalog(mut self, catalog: TypeCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the secret store. Without one, secret references fail to
    /// resolve.
    #[must_use]
    pub fn secrets(mut self, secrets: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    /// Sets the engine options.
    #[must_use]
    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the service.
    pub fn build(self) -> SectionService {
        let EngineOptions {
            module_hint,
            credential,
        } = self.options;
        let secrets = self
            .secrets
            .unwrap_or_else(|| Arc::new(UnconfiguredSecretStore));

        SectionService {
            resolver: MappingResolver::new(TypeScanner::new(self.catalog), module_hint),
            store: self.store,
            secrets: SecretResolver::new(secrets, credential),
        }
    }
}

impl std::fmt::Debug for SectionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionService")
            .field("resolver", &self.resolver)
            .field("secrets", &self.secrets)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for SectionServiceBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionServiceBuilder")
            .field("catalog", &self.catalog)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

struct UnconfiguredSecretStore;

#[async_trait]
impl SecretStore for UnconfiguredSecretStore {
    async fn connect(
        &self,
        vault_url: &str,
        _credential: &Credential,
    ) -> Result<Arc<dyn SecretConnection>, StoreError> {
        Err(StoreError::unavailable(format!(
            "no secret store configured for {vault_url}"
        )))
    }
}
