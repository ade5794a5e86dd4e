use enki_core::pattern::CompiledPattern;
use enki_core::types::{
    DynamicRule, ResourceType, RuleAction, RuleCondition, DEFAULT_RULE_PRIORITY,
};
use log::debug;

use crate::optimizer::{optimize_patterns, OptimizeStats};

/// Redirect rule for a single pattern, scoped to main-frame navigations.
pub fn build_rule(pattern: &str) -> DynamicRule {
    let compiled = CompiledPattern::compile(pattern);
    debug!(
        "Compiled '{}' -> id {} regex {}",
        compiled.pattern, compiled.rule_id, compiled.regex_source
    );

    DynamicRule {
        id: compiled.rule_id,
        priority: DEFAULT_RULE_PRIORITY,
        action: RuleAction::redirect_to_extension_page(),
        condition: RuleCondition {
            regex_filter: Some(compiled.regex_source),
            resource_types: ResourceType::MAIN_FRAME,
        },
    }
}

/// One rule per pattern, in input order.
pub fn build_rules<S: AsRef<str>>(patterns: &[S]) -> Vec<DynamicRule> {
    patterns.iter().map(|p| build_rule(p.as_ref())).collect()
}

/// Desired rule set plus what the optimizer dropped on the way.
#[derive(Debug, Clone)]
pub struct RuleSetBuild {
    pub rules: Vec<DynamicRule>,
    pub stats: OptimizeStats,
}

impl RuleSetBuild {
    pub fn rule_ids(&self) -> Vec<i32> {
        self.rules.iter().map(|r| r.id).collect()
    }
}

/// Full desired rule set for a stored pattern list. Repeated and colliding
/// patterns are removed first so the result never holds two rules with the
/// same id.
pub fn build_rule_set<S: AsRef<str>>(patterns: &[S]) -> RuleSetBuild {
    let mut patterns: Vec<String> = patterns.iter().map(|p| p.as_ref().to_string()).collect();
    let stats = optimize_patterns(&mut patterns);
    let rules = build_rules(&patterns);

    RuleSetBuild { rules, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enki_core::hash::{rule_id_for_pattern, RULE_ID_BASE};
    use enki_core::types::REDIRECT_EXTENSION_PATH;

    #[test]
    fn test_build_rule_fields() {
        let rule = build_rule("*a.com/x*");
        assert_eq!(rule.id, rule_id_for_pattern("*a.com/x*"));
        assert!(rule.id >= RULE_ID_BASE);
        assert_eq!(rule.priority, 1);
        assert_eq!(rule.condition.regex_filter.as_deref(), Some("^.*a\\.com/x.*$"));
        assert_eq!(rule.condition.resource_types, ResourceType::MAIN_FRAME);
        match &rule.action {
            RuleAction::Redirect { redirect } => {
                assert_eq!(redirect.extension_path.as_deref(), Some(REDIRECT_EXTENSION_PATH));
                assert_eq!(redirect.url, None);
            }
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_build_rule_idempotent() {
        assert_eq!(build_rule("*youtube.com/shorts/*"), build_rule("*youtube.com/shorts/*"));
    }

    #[test]
    fn test_build_rules_preserves_order() {
        let rules = build_rules(&["*b.com*", "*a.com*"]);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, rule_id_for_pattern("*b.com*"));
        assert_eq!(rules[1].id, rule_id_for_pattern("*a.com*"));
    }

    #[test]
    fn test_build_rule_set_drops_duplicates() {
        let build = build_rule_set(&["*a.com*", "*a.com*", "*b.com*"]);
        assert_eq!(build.rules.len(), 2);
        assert_eq!(build.stats.deduped, 1);
        assert_eq!(
            build.rule_ids(),
            vec![rule_id_for_pattern("*a.com*"), rule_id_for_pattern("*b.com*")]
        );
    }

    #[test]
    fn test_build_rule_set_empty() {
        let build = build_rule_set::<String>(&[]);
        assert!(build.rules.is_empty());
        assert_eq!(build.stats.before, 0);
    }
}
