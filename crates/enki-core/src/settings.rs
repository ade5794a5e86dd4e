//! Persisted extension settings
//!
//! The host stores settings as a flat key/value map. Missing keys read back
//! as their defaults, matching `storage.get(defaults)` on the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

/// Pattern seeded into the blocklist on first install.
pub const DEFAULT_INSTALL_PATTERN: &str = "*instagram.com/reels/*";

/// Keys of the persisted settings map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsKey {
    Patterns,
    Filters,
    HideYouTubeShorts,
    HideYouTubeRecommendations,
    IgHideHome,
    IgHideExplore,
    IgHideReels,
}

impl SettingsKey {
    pub const ALL: [SettingsKey; 7] = [
        SettingsKey::Patterns,
        SettingsKey::Filters,
        SettingsKey::HideYouTubeShorts,
        SettingsKey::HideYouTubeRecommendations,
        SettingsKey::IgHideHome,
        SettingsKey::IgHideExplore,
        SettingsKey::IgHideReels,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patterns => "patterns",
            Self::Filters => "filters",
            Self::HideYouTubeShorts => "hideYouTubeShorts",
            Self::HideYouTubeRecommendations => "hideYouTubeRecommendations",
            Self::IgHideHome => "igHideHome",
            Self::IgHideExplore => "igHideExplore",
            Self::IgHideReels => "igHideReels",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.as_str() == s)
    }
}

/// Extension settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct Settings {
    /// User-visible blocklist
    pub patterns: Vec<String>,
    /// Internal blocklist with no UI
    pub filters: Vec<String>,
    #[serde(rename = "hideYouTubeShorts")]
    pub hide_youtube_shorts: bool,
    #[serde(rename = "hideYouTubeRecommendations")]
    pub hide_youtube_recommendations: bool,
    pub ig_hide_home: bool,
    pub ig_hide_explore: bool,
    pub ig_hide_reels: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            filters: Vec::new(),
            hide_youtube_shorts: true,
            hide_youtube_recommendations: true,
            ig_hide_home: true,
            ig_hide_explore: true,
            ig_hide_reels: true,
        }
    }
}

/// Outcome of adding a pattern from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternEdit {
    Added(String),
    /// Already in the list; nothing changed
    Duplicate(String),
    /// Input was blank after trimming
    Ignored,
}

impl Settings {
    /// Read settings out of a host key/value map.
    pub fn from_items(items: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(items.clone()))
    }

    /// Flatten settings into a host key/value map.
    pub fn to_items(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "settings serialized to non-object: {other}"
            ))),
        }
    }

    /// Host key/value entries for `keys` only.
    pub fn items_for(&self, keys: &[SettingsKey]) -> Result<Map<String, Value>, serde_json::Error> {
        let mut items = self.to_items()?;
        items.retain(|name, _| keys.iter().any(|key| key.as_str() == name));
        Ok(items)
    }

    /// Add a pattern typed by the user. Input is trimmed; blanks and values
    /// already present are not added.
    pub fn add_pattern(&mut self, input: &str) -> PatternEdit {
        let value = input.trim();
        if value.is_empty() {
            return PatternEdit::Ignored;
        }
        if self.patterns.iter().any(|p| p == value) {
            return PatternEdit::Duplicate(value.to_string());
        }
        self.patterns.push(value.to_string());
        PatternEdit::Added(value.to_string())
    }

    pub fn remove_pattern_at(&mut self, index: usize) -> Option<String> {
        if index < self.patterns.len() {
            Some(self.patterns.remove(index))
        } else {
            None
        }
    }

    /// Everything the content-side check matches against: `patterns`
    /// followed by `filters`.
    pub fn blocklist_patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns
            .iter()
            .chain(self.filters.iter())
            .map(String::as_str)
    }
}

/// Keys whose stored value differs between two item maps.
pub fn changed_keys(old: &Map<String, Value>, new: &Map<String, Value>) -> Vec<SettingsKey> {
    SettingsKey::ALL
        .iter()
        .copied()
        .filter(|key| old.get(key.as_str()) != new.get(key.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_for_selected_keys() {
        let settings = Settings {
            patterns: vec!["*a.com*".into()],
            ig_hide_home: false,
            ..Settings::default()
        };
        let items = settings.items_for(&[SettingsKey::Patterns]).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items["patterns"], serde_json::json!(["*a.com*"]));
        assert_eq!(settings.items_for(&SettingsKey::ALL).unwrap(), settings.to_items().unwrap());
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "patterns": ["*a.com*"] }"#).unwrap();
        assert_eq!(settings.patterns, vec!["*a.com*"]);
        assert!(settings.filters.is_empty());
        assert!(settings.hide_youtube_shorts);
        assert!(settings.ig_hide_reels);
    }

    #[test]
    fn test_host_key_names() {
        let items = Settings::default().to_items().unwrap();
        for key in SettingsKey::ALL {
            assert!(items.contains_key(key.as_str()), "missing {}", key.as_str());
        }
        assert_eq!(items.len(), SettingsKey::ALL.len());
        assert_eq!(SettingsKey::from_str("igHideExplore"), Some(SettingsKey::IgHideExplore));
        assert_eq!(SettingsKey::from_str("nope"), None);
    }

    #[test]
    fn test_from_items_ignores_unknown_keys() {
        let mut items = Map::new();
        items.insert("patterns".into(), serde_json::json!(["x"]));
        items.insert("somethingElse".into(), serde_json::json!(42));
        let settings = Settings::from_items(&items).unwrap();
        assert_eq!(settings.patterns, vec!["x"]);
    }

    #[test]
    fn test_add_pattern_trims_and_dedupes() {
        let mut settings = Settings::default();
        assert_eq!(
            settings.add_pattern("  *youtube.com/shorts/*  "),
            PatternEdit::Added("*youtube.com/shorts/*".into())
        );
        assert_eq!(
            settings.add_pattern("*youtube.com/shorts/*"),
            PatternEdit::Duplicate("*youtube.com/shorts/*".into())
        );
        assert_eq!(settings.add_pattern("   "), PatternEdit::Ignored);
        assert_eq!(settings.patterns, vec!["*youtube.com/shorts/*"]);
    }

    #[test]
    fn test_remove_pattern_at() {
        let mut settings = Settings {
            patterns: vec!["a".into(), "b".into(), "c".into()],
            ..Settings::default()
        };
        assert_eq!(settings.remove_pattern_at(1), Some("b".into()));
        assert_eq!(settings.patterns, vec!["a", "c"]);
        assert_eq!(settings.remove_pattern_at(5), None);
    }

    #[test]
    fn test_blocklist_is_patterns_then_filters() {
        let settings = Settings {
            patterns: vec!["p1".into()],
            filters: vec!["f1".into(), "f2".into()],
            ..Settings::default()
        };
        let all: Vec<&str> = settings.blocklist_patterns().collect();
        assert_eq!(all, vec!["p1", "f1", "f2"]);
    }

    #[test]
    fn test_changed_keys() {
        let old = Settings::default().to_items().unwrap();
        let mut updated = Settings::default();
        updated.patterns.push("x".into());
        updated.ig_hide_home = false;
        let new = updated.to_items().unwrap();
        assert_eq!(
            changed_keys(&old, &new),
            vec![SettingsKey::Patterns, SettingsKey::IgHideHome]
        );
        assert!(changed_keys(&new, &new).is_empty());
    }
}
