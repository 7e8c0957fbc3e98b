//! In-memory configuration store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use confmap_core::{ConfigStore, Label, StoreError, WireEntry};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

type EntryKey = (String, Label);

/// A [`ConfigStore`] backed by an ordered in-memory map.
///
/// Entries are listed in insertion order. Two knobs model store behavior that
/// the engine must cope with:
///
/// - [`lock`](Self::lock) marks an entry read-only, so writes are rejected
///   and deletes are refused.
/// - [`fail_next`](Self::fail_next) makes the next call of any kind fail
///   with the given error.
///
/// # Example
///
/// ```
/// use confmap_core::{ConfigStore, ContentType, Label, WireEntry};
/// use confmap_test::MemoryConfigStore;
///
/// # tokio_test::block_on(async {
/// let store = MemoryConfigStore::new();
/// store.insert(WireEntry::new("A:B", Label::none(), ContentType::String, "x"));
///
/// let entry = store.get("A:B", &Label::none()).await.unwrap();
/// assert_eq!(entry.unwrap().content, "x");
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    entries: RwLock<IndexMap<EntryKey, WireEntry>>,
    locked: RwLock<HashSet<EntryKey>>,
    failure: Mutex<Option<StoreError>>,
    creates: AtomicUsize,
    upserts: AtomicUsize,
}

impl MemoryConfigStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an entry directly, bypassing locks and failures.
    pub fn insert(&self, entry: WireEntry) {
        let key = (entry.key.clone(), entry.label.clone());
        self.entries.write().insert(key, entry);
    }

    /// Returns a stored entry without going through the store interface.
    pub fn entry(&self, key: &str, label: &Label) -> Option<WireEntry> {
        self.entries
            .read()
            .get(&(key.to_string(), label.clone()))
            .cloned()
    }

    /// Number of stored entries across all labels.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Marks an entry read-only.
    pub fn lock(&self, key: &str, label: &Label) {
        self.locked.write().insert((key.to_string(), label.clone()));
    }

    /// Makes the next store call fail with `error`.
    pub fn fail_next(&self, error: StoreError) {
        *self.failure.lock() = Some(error);
    }

    /// Number of `create` calls received.
    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Number of `upsert` calls received.
    pub fn upsert_calls(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> Result<(), StoreError> {
        match self.failure.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn is_locked(&self, key: &EntryKey) -> bool {
        self.locked.read().contains(key)
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get(&self, key: &str, label: &Label) -> Result<Option<WireEntry>, StoreError> {
        self.take_failure()?;
        Ok(self.entry(key, label))
    }

    async fn list_by_key_prefix(
        &self,
        prefix: &str,
        label: &Label,
    ) -> Result<Vec<WireEntry>, StoreError> {
        self.take_failure()?;
        Ok(self
            .entries
            .read()
            .values()
            .filter(|entry| entry.key.starts_with(prefix) && entry.label == *label)
            .cloned()
            .collect())
    }

    async fn create(&self, entry: &WireEntry) -> Result<(), StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let key = (entry.key.clone(), entry.label.clone());
        let mut entries = self.entries.write();
        if entries.contains_key(&key) {
            return Err(StoreError::already_exists(&entry.key, entry.label.as_str()));
        }
        entries.insert(key, entry.clone());
        Ok(())
    }

    async fn upsert(&self, entry: &WireEntry) -> Result<(), StoreError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let key = (entry.key.clone(), entry.label.clone());
        if self.is_locked(&key) {
            return Err(StoreError::rejected(format!("{} is read-only", entry.key)));
        }
        self.entries.write().insert(key, entry.clone());
        Ok(())
    }

    async fn delete(&self, key: &str, label: &Label) -> Result<bool, StoreError> {
        self.take_failure()?;
        let key = (key.to_string(), label.clone());
        if self.is_locked(&key) {
            return Ok(false);
        }
        self.entries.write().shift_remove(&key);
        Ok(true)
    }
}
