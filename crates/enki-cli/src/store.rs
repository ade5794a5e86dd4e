//! JSON files standing in for the host's sync store and rule table.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use enki_core::settings::{Settings, SettingsKey};
use enki_core::types::{DynamicRule, RuleUpdate};
use enki_sync::table::apply_update;
use enki_sync::{RuleEntry, RuleTable, RuleTableError, SettingsStore, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Settings kept as a flat JSON object, one member per key.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_items(&self) -> Result<Map<String, Value>, StoreError> {
        let text = match read_optional(&self.path).await {
            Ok(Some(text)) => text,
            Ok(None) => return Ok(Map::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };
        match serde_json::from_str(&text)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::Serialization(format!(
                "'{}' does not hold a JSON object",
                self.path.display()
            ))),
        }
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn load(&self) -> Result<Settings, StoreError> {
        let items = self.read_items().await?;
        Ok(Settings::from_items(&items)?)
    }

    async fn save_keys(&self, settings: &Settings, keys: &[SettingsKey]) -> Result<(), StoreError> {
        let mut items = self.read_items().await?;
        items.extend(settings.items_for(keys)?);
        let text = serde_json::to_string_pretty(&Value::Object(items))?;
        write_replace(&self.path, &text).await.map_err(StoreError::Io)
    }

    async fn contains_key(&self, key: SettingsKey) -> Result<bool, StoreError> {
        Ok(self.read_items().await?.contains_key(key.as_str()))
    }
}

/// Dynamic rules kept as a JSON array. Rules written by other tools are
/// kept verbatim, whatever their shape.
pub struct JsonFileRuleTable {
    path: PathBuf,
}

/// A stored rule: its id plus every other member, untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRule {
    id: i32,
    #[serde(flatten)]
    body: Map<String, Value>,
}

impl RuleEntry for StoredRule {
    fn rule_id(&self) -> i32 {
        self.id
    }
}

impl JsonFileRuleTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_stored(&self) -> Result<Vec<StoredRule>, RuleTableError> {
        match read_optional(&self.path).await.map_err(RuleTableError::Io)? {
            Some(text) => serde_json::from_str(&text).map_err(|e| self.parse_error(e)),
            None => Ok(Vec::new()),
        }
    }

    fn parse_error(&self, e: serde_json::Error) -> RuleTableError {
        RuleTableError::Io(format!("'{}': {}", self.path.display(), e))
    }
}

#[async_trait]
impl RuleTable for JsonFileRuleTable {
    async fn get_rules(&self) -> Result<Vec<DynamicRule>, RuleTableError> {
        match read_optional(&self.path).await.map_err(RuleTableError::Io)? {
            Some(text) => serde_json::from_str(&text).map_err(|e| self.parse_error(e)),
            None => Ok(Vec::new()),
        }
    }

    async fn get_rule_ids(&self) -> Result<Vec<i32>, RuleTableError> {
        Ok(self.read_stored().await?.iter().map(|rule| rule.id).collect())
    }

    async fn update_rules(&self, update: RuleUpdate) -> Result<(), RuleTableError> {
        let current = self.read_stored().await?;
        let add_rules = update
            .add_rules
            .iter()
            .map(|rule| serde_json::to_value(rule).and_then(serde_json::from_value))
            .collect::<Result<Vec<StoredRule>, _>>()
            .map_err(|e| RuleTableError::Io(e.to_string()))?;

        let next = apply_update(current, &update.remove_rule_ids, add_rules)?;
        let text = serde_json::to_string_pretty(&next)
            .map_err(|e| RuleTableError::Io(e.to_string()))?;
        write_replace(&self.path, &text).await.map_err(RuleTableError::Io)
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>, String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(format!("Failed to read '{}': {}", path.display(), e)),
    }
}

/// Write through a sibling temp file so readers never see a partial file.
async fn write_replace(path: &Path, text: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, text)
        .await
        .map_err(|e| format!("Failed to write '{}': {}", tmp.display(), e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| format!("Failed to replace '{}': {}", path.display(), e))
}
