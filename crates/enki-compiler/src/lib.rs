//! Enki Rule Compiler
//!
//! This crate compiles wildcard pattern lists into dynamic redirect rules
//! for the host's rule table.

pub mod parser;
pub mod optimizer;
pub mod builder;

pub use builder::{build_rule, build_rule_set, build_rules, RuleSetBuild};
pub use optimizer::{optimize_patterns, OptimizeStats};
pub use parser::parse_pattern_list;
