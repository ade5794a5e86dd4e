//! Enki Core Library
//!
//! This crate provides the pattern compiler and URL matcher for the Enki
//! URL blocker, plus the rule and settings types shared with the host.
//!
//! # Architecture
//!
//! Users block pages with wildcard patterns such as `*instagram.com/reels/*`.
//! Each pattern compiles to an anchored regex and a stable rule id; the
//! compiler crate turns a pattern list into dynamic redirect rules and the
//! sync crate keeps the host's rule table equal to that list.
//!
//! # Modules
//!
//! - `hash`: FNV-1a rule id derivation
//! - `pattern`: Wildcard to anchored regex compilation
//! - `matcher`: In-process URL matching over compiled patterns
//! - `settings`: Persisted settings and pattern list editing
//! - `url`: URL slicing without allocations
//! - `types`: Host rule shapes

pub mod hash;
pub mod matcher;
pub mod pattern;
pub mod settings;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use hash::{rule_id_for_pattern, RULE_ID_BASE, RULE_ID_MAX};
pub use matcher::{is_context_invalidated, Matcher};
pub use pattern::{wildcard_to_regex, CompileError, CompiledPattern};
pub use settings::{PatternEdit, Settings, SettingsKey, DEFAULT_INSTALL_PATTERN};
pub use types::{DynamicRule, ResourceType, RuleAction, RuleCondition, RuleUpdate};
