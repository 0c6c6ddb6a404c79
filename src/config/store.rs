//! Persisted client settings.
//!
//! A [`SettingsStore`] keeps the current value in memory and mirrors the
//! durable part of it into a [`KeyValueStorage`] under a fixed key. Reads are
//! synchronous snapshots; writes merge a patch, persist the whole record and
//! only then publish it, so a reader never observes a half-applied update.

use super::defaults::*;
use super::types::*;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Errors raised while writing settings to storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to persist settings: {0}")]
    Persist(String),
}

// ============================================================================
// Storage backends
// ============================================================================

/// String key/value storage, shaped like browser or device storage.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

/// One JSON file per key inside a state directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let dir = self.dir.clone();
        let target = self.path_for(key);
        let value = value.to_string();

        // Write to a sibling temp file and rename over the target.
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(value.as_bytes())?;
            tmp.flush()?;
            tmp.persist(&target)
                .map_err(|e| StoreError::Persist(e.error.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Persist(e.to_string()))?
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).map(|v| v.value().clone()))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Storage for contexts with no durable storage at all.
///
/// Reads find nothing and writes are dropped, so every load yields defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStorage;

#[async_trait]
impl KeyValueStorage for UnavailableStorage {
    async fn get_item(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    async fn set_item(&self, key: &str, _value: &str) -> Result<(), StoreError> {
        debug!(key, "storage unavailable, dropping write");
        Ok(())
    }

    async fn remove_item(&self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// Persisted records
// ============================================================================

/// A settings record that can be stored under a fixed key.
pub trait Persisted: Clone + Default + Send + Sync + 'static {
    /// Storage key of the single durable record.
    const STORAGE_KEY: &'static str;
    /// The subset written to storage.
    type Snapshot: Serialize + DeserializeOwned + PartialEq + Send;
    /// Partial update accepted by [`SettingsStore::set`].
    type Patch: Send;

    fn partialize(&self) -> Self::Snapshot;
    fn rehydrate(snapshot: Self::Snapshot) -> Self;
    fn merge(&mut self, patch: Self::Patch);
}

impl Persisted for ClientSettings {
    const STORAGE_KEY: &'static str = WEB_SETTINGS_STORAGE_KEY;
    type Snapshot = ClientSettings;
    type Patch = ClientSettingsPatch;

    fn partialize(&self) -> Self::Snapshot {
        self.clone()
    }

    fn rehydrate(snapshot: Self::Snapshot) -> Self {
        snapshot
    }

    fn merge(&mut self, patch: Self::Patch) {
        if let Some(api_key) = patch.api_key {
            self.api_key = api_key;
        }
        if let Some(url) = patch.api_base_url {
            self.api_base_url = url;
        }
        if let Some(tz) = patch.timezone {
            self.timezone = tz;
        }
        if let Some(token) = patch.admin_token {
            self.admin_token = token;
        }
    }
}

impl Persisted for AppState {
    const STORAGE_KEY: &'static str = MOBILE_STATE_STORAGE_KEY;
    type Snapshot = AppStateSnapshot;
    type Patch = AppStatePatch;

    fn partialize(&self) -> Self::Snapshot {
        AppStateSnapshot {
            api_base_url: self.api_base_url.clone(),
            api_key: self.api_key.clone(),
            push_token: self.push_token.clone(),
        }
    }

    fn rehydrate(snapshot: Self::Snapshot) -> Self {
        Self {
            api_base_url: snapshot.api_base_url,
            api_key: snapshot.api_key,
            push_token: snapshot.push_token,
            push_registration: PushRegistrationStatus::default(),
        }
    }

    fn merge(&mut self, patch: Self::Patch) {
        if let Some(url) = patch.api_base_url {
            self.api_base_url = url;
        }
        if let Some(key) = patch.api_key {
            self.api_key = key;
        }
        if let Some(token) = patch.push_token {
            self.push_token = token;
        }
        if let Some(status) = patch.push_registration {
            self.push_registration = status;
        }
    }
}

/// Holds one persisted settings record.
pub struct SettingsStore<T: Persisted> {
    current: parking_lot::RwLock<T>,
    storage: Arc<dyn KeyValueStorage>,
    writer: tokio::sync::Mutex<()>,
}

impl<T: Persisted> SettingsStore<T> {
    /// Hydrate the store from storage.
    ///
    /// A missing record, a storage failure, or a record that does not parse
    /// all yield defaults; none of them is an error.
    pub async fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let value = match storage.get_item(T::STORAGE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<T::Snapshot>(&raw) {
                Ok(snapshot) => T::rehydrate(snapshot),
                Err(e) => {
                    warn!(key = T::STORAGE_KEY, "Stored settings are corrupt, using defaults: {e}");
                    T::default()
                }
            },
            Ok(None) => {
                debug!(key = T::STORAGE_KEY, "No stored settings, using defaults");
                T::default()
            }
            Err(e) => {
                warn!(key = T::STORAGE_KEY, "Failed to read settings, using defaults: {e}");
                T::default()
            }
        };

        Self::with_value(value, storage)
    }

    /// Build a store around an explicit value without touching storage.
    pub fn with_value(value: T, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            current: parking_lot::RwLock::new(value),
            storage,
            writer: tokio::sync::Mutex::new(()),
        }
    }

    /// Snapshot of the current settings.
    pub fn get(&self) -> T {
        self.current.read().clone()
    }

    /// Merge `patch`, persist the result, then publish it.
    ///
    /// Concurrent writers are serialized; the last one wins. On a storage
    /// failure the previous value stays current.
    pub async fn set(&self, patch: T::Patch) -> Result<T, StoreError> {
        let _guard = self.writer.lock().await;

        let previous = self.get();
        let mut next = previous.clone();
        next.merge(patch);

        let snapshot = next.partialize();
        if snapshot != previous.partialize() {
            let json = serde_json::to_string(&snapshot)?;
            self.storage.set_item(T::STORAGE_KEY, &json).await?;
        }

        *self.current.write() = next.clone();
        Ok(next)
    }

    /// Forget the stored record and return to defaults.
    pub async fn reset(&self) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;
        self.storage.remove_item(T::STORAGE_KEY).await?;
        *self.current.write() = T::default();
        Ok(())
    }
}

// ============================================================================
// Settings sources
// ============================================================================

/// Credentials and endpoint a request is built from.
pub trait SettingsSource: Send + Sync {
    /// Base URL, never empty.
    fn api_base_url(&self) -> String;
    fn api_key(&self) -> Option<String>;
    fn admin_token(&self) -> Option<String>;
}

/// Read access to the connection fields of a settings record.
pub trait Credentials {
    fn base_url(&self) -> String;
    fn key(&self) -> Option<String>;
    fn admin(&self) -> Option<String>;
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Credentials for ClientSettings {
    fn base_url(&self) -> String {
        resolve_base_url(Some(&self.api_base_url))
    }

    fn key(&self) -> Option<String> {
        non_empty(&self.api_key)
    }

    fn admin(&self) -> Option<String> {
        non_empty(&self.admin_token)
    }
}

impl Credentials for AppState {
    fn base_url(&self) -> String {
        resolve_base_url(self.api_base_url.as_deref())
    }

    fn key(&self) -> Option<String> {
        self.api_key.as_deref().and_then(non_empty)
    }

    fn admin(&self) -> Option<String> {
        None
    }
}

impl<T: Persisted + Credentials> SettingsSource for SettingsStore<T> {
    fn api_base_url(&self) -> String {
        self.current.read().base_url()
    }

    fn api_key(&self) -> Option<String> {
        self.current.read().key()
    }

    fn admin_token(&self) -> Option<String> {
        self.current.read().admin()
    }
}

/// Process-only overrides layered over a persisted source.
#[derive(Debug, Clone, Default)]
pub struct SessionOverrides {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub admin_token: Option<String>,
}

impl SessionOverrides {
    /// Read overrides from `REMINDCTL_*` environment variables.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().as_deref().and_then(non_empty);
        Self {
            api_key: var("REMINDCTL_API_KEY"),
            api_base_url: var("REMINDCTL_API_BASE_URL"),
            admin_token: var("REMINDCTL_ADMIN_TOKEN"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.api_base_url.is_none() && self.admin_token.is_none()
    }
}

/// A [`SettingsSource`] with [`SessionOverrides`] applied on top.
pub struct OverlaySource {
    inner: Arc<dyn SettingsSource>,
    overrides: SessionOverrides,
}

impl OverlaySource {
    pub fn new(inner: Arc<dyn SettingsSource>, overrides: SessionOverrides) -> Self {
        Self { inner, overrides }
    }
}

impl SettingsSource for OverlaySource {
    fn api_base_url(&self) -> String {
        match &self.overrides.api_base_url {
            Some(url) => resolve_base_url(Some(url)),
            None => self.inner.api_base_url(),
        }
    }

    fn api_key(&self) -> Option<String> {
        self.overrides.api_key.clone().or_else(|| self.inner.api_key())
    }

    fn admin_token(&self) -> Option<String> {
        self.overrides
            .admin_token
            .clone()
            .or_else(|| self.inner.admin_token())
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// In-process preference toggles.
#[derive(Debug, Default)]
pub struct PreferencesStore {
    inner: parking_lot::RwLock<Preferences>,
}

impl PreferencesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Preferences {
        *self.inner.read()
    }

    /// Flip one toggle and return its new value.
    pub fn toggle(&self, key: PreferenceKey) -> bool {
        let mut prefs = self.inner.write();
        let slot = match key {
            PreferenceKey::Notifications => &mut prefs.notifications_enabled,
            PreferenceKey::VoiceResponses => &mut prefs.voice_responses,
        };
        *slot = !*slot;
        *slot
    }
}
