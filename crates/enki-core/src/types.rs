//! Core type definitions for Enki
//!
//! These types mirror the JSON shapes of the host's declarative network
//! request API, so a `DynamicRule` serializes to exactly what the rule table
//! accepts.

use serde::de::{Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Extension page that matching navigations are redirected to.
pub const REDIRECT_EXTENSION_PATH: &str = "/redirect.html";

/// Priority given to every generated pattern rule.
pub const DEFAULT_RULE_PRIORITY: u32 = 1;

// =============================================================================
// Resource Types (bit mask for rule scope)
// =============================================================================

bitflags::bitflags! {
    /// Resource type bit mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResourceType: u32 {
        const OTHER = 1 << 0;
        const SCRIPT = 1 << 1;
        const IMAGE = 1 << 2;
        const STYLESHEET = 1 << 3;
        const OBJECT = 1 << 4;
        const SUB_FRAME = 1 << 5;   // iframe/frame
        const MAIN_FRAME = 1 << 6;  // main document
        const XMLHTTPREQUEST = 1 << 7;
        const WEBSOCKET = 1 << 8;
        const FONT = 1 << 9;
        const MEDIA = 1 << 10;
        const PING = 1 << 11;
        const CSP_REPORT = 1 << 12;
        const WEBTRANSPORT = 1 << 13;
        const WEBBUNDLE = 1 << 14;

        /// Document types (main_frame + sub_frame)
        const DOCUMENT = Self::MAIN_FRAME.bits() | Self::SUB_FRAME.bits();
    }
}

const RESOURCE_TYPE_NAMES: &[(ResourceType, &str)] = &[
    (ResourceType::MAIN_FRAME, "main_frame"),
    (ResourceType::SUB_FRAME, "sub_frame"),
    (ResourceType::STYLESHEET, "stylesheet"),
    (ResourceType::SCRIPT, "script"),
    (ResourceType::IMAGE, "image"),
    (ResourceType::FONT, "font"),
    (ResourceType::OBJECT, "object"),
    (ResourceType::XMLHTTPREQUEST, "xmlhttprequest"),
    (ResourceType::PING, "ping"),
    (ResourceType::CSP_REPORT, "csp_report"),
    (ResourceType::MEDIA, "media"),
    (ResourceType::WEBSOCKET, "websocket"),
    (ResourceType::WEBTRANSPORT, "webtransport"),
    (ResourceType::WEBBUNDLE, "webbundle"),
    (ResourceType::OTHER, "other"),
];

impl ResourceType {
    /// Parse a single host resource type name.
    pub fn from_host_name(s: &str) -> Option<Self> {
        RESOURCE_TYPE_NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(flag, _)| *flag)
    }

    /// Host names for every bit set, in the host's canonical order.
    pub fn names(&self) -> Vec<&'static str> {
        RESOURCE_TYPE_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl Serialize for ResourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.names();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ResourceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NamesVisitor;

        impl<'de> Visitor<'de> for NamesVisitor {
            type Value = ResourceType;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a list of resource type names")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut mask = ResourceType::empty();
                while let Some(name) = seq.next_element::<String>()? {
                    let flag = ResourceType::from_host_name(&name).ok_or_else(|| {
                        serde::de::Error::custom(format!("unknown resource type: {name}"))
                    })?;
                    mask |= flag;
                }
                Ok(mask)
            }
        }

        deserializer.deserialize_seq(NamesVisitor)
    }
}

// =============================================================================
// Rule Actions
// =============================================================================

/// Where a redirect rule sends the navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RedirectTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RedirectTarget {
    pub fn extension_path(path: impl Into<String>) -> Self {
        Self {
            extension_path: Some(path.into()),
            url: None,
        }
    }
}

/// Action to take for a matched rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "camelCase")]
#[ts(export)]
pub enum RuleAction {
    /// Cancels the request
    Block,
    /// Exempts the request from lower-priority rules
    Allow,
    /// Sends the navigation elsewhere
    Redirect { redirect: RedirectTarget },
}

impl RuleAction {
    /// The redirect every pattern rule uses.
    pub fn redirect_to_extension_page() -> Self {
        Self::Redirect {
            redirect: RedirectTarget::extension_path(REDIRECT_EXTENSION_PATH),
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Which requests a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RuleCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_filter: Option<String>,
    /// Empty when the host rule leaves it out
    #[serde(default, skip_serializing_if = "ResourceType::is_empty")]
    #[ts(as = "Vec<String>")]
    pub resource_types: ResourceType,
}

/// One entry in the host's dynamic rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DynamicRule {
    pub id: i32,
    pub priority: u32,
    pub action: RuleAction,
    pub condition: RuleCondition,
}

/// Atomic replacement applied to the rule table: every id in
/// `remove_rule_ids` goes away and every rule in `add_rules` is installed,
/// or nothing changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RuleUpdate {
    pub remove_rule_ids: Vec<i32>,
    pub add_rules: Vec<DynamicRule>,
}

impl RuleUpdate {
    pub fn is_empty(&self) -> bool {
        self.remove_rule_ids.is_empty() && self.add_rules.is_empty()
    }
}
