//! Persistent settings store
//!
//! The host keeps settings in a synchronized key/value area and notifies
//! listeners whenever any writer (including another device) changes a key.

use std::sync::RwLock;

use async_trait::async_trait;
use enki_core::settings::{changed_keys, Settings, SettingsKey};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::error::StoreError;

/// Storage area a change happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Sync,
    Local,
    Managed,
    Session,
}

impl StorageArea {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sync" => Some(Self::Sync),
            "local" => Some(Self::Local),
            "managed" => Some(Self::Managed),
            "session" => Some(Self::Session),
            _ => None,
        }
    }
}

/// Change notification emitted after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsChange {
    pub area: StorageArea,
    pub keys: Vec<SettingsKey>,
}

impl SettingsChange {
    pub fn touches(&self, key: SettingsKey) -> bool {
        self.keys.contains(&key)
    }
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Current settings; absent keys read as defaults.
    async fn load(&self) -> Result<Settings, StoreError>;

    /// Write only `keys`, taking their values from `settings`. Keys not
    /// listed keep whatever is stored, even if another writer changed them
    /// after `settings` was loaded.
    async fn save_keys(&self, settings: &Settings, keys: &[SettingsKey]) -> Result<(), StoreError>;

    /// Write every settings key.
    async fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        self.save_keys(settings, &SettingsKey::ALL).await
    }

    /// Whether the key has ever been written.
    async fn contains_key(&self, key: SettingsKey) -> Result<bool, StoreError>;
}

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// In-memory store with host-like change notifications.
pub struct MemorySettingsStore {
    items: RwLock<Map<String, Value>>,
    changes: broadcast::Sender<SettingsChange>,
}

impl MemorySettingsStore {
    /// Empty store, as on a fresh install.
    pub fn new() -> Self {
        Self::from_items(Map::new())
    }

    pub fn with_settings(settings: &Settings) -> Result<Self, StoreError> {
        Ok(Self::from_items(settings.to_items()?))
    }

    fn from_items(items: Map<String, Value>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            items: RwLock::new(items),
            changes,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SettingsChange> {
        self.changes.subscribe()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("settings lock poisoned".to_string())
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Settings, StoreError> {
        let items = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(Settings::from_items(&items)?)
    }

    async fn save_keys(&self, settings: &Settings, keys: &[SettingsKey]) -> Result<(), StoreError> {
        let written = settings.items_for(keys)?;
        let keys = {
            let mut items = self.items.write().map_err(|_| Self::poisoned())?;
            let mut next = items.clone();
            next.extend(written);
            let keys = changed_keys(&items, &next);
            *items = next;
            keys
        };

        if !keys.is_empty() {
            // No receivers is fine: nobody is listening yet.
            let _ = self.changes.send(SettingsChange {
                area: StorageArea::Sync,
                keys,
            });
        }
        Ok(())
    }

    async fn contains_key(&self, key: SettingsKey) -> Result<bool, StoreError> {
        let items = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(items.contains_key(key.as_str()))
    }
}
