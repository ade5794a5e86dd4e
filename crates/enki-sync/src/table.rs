//! Host rule table
//!
//! The host holds the live dynamic rules. Its update call removes and adds
//! rules as one atomic unit: either the whole update lands or nothing
//! changes.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use enki_core::types::{DynamicRule, RuleUpdate};

use crate::error::RuleTableError;

#[async_trait]
pub trait RuleTable: Send + Sync {
    async fn get_rules(&self) -> Result<Vec<DynamicRule>, RuleTableError>;

    /// Ids of every installed rule, including rules in shapes
    /// `DynamicRule` does not model.
    async fn get_rule_ids(&self) -> Result<Vec<i32>, RuleTableError> {
        Ok(self.get_rules().await?.iter().map(|rule| rule.id).collect())
    }

    /// Apply an update atomically.
    async fn update_rules(&self, update: RuleUpdate) -> Result<(), RuleTableError>;
}

/// Anything stored in a rule table under a rule id.
pub trait RuleEntry {
    fn rule_id(&self) -> i32;
}

impl RuleEntry for DynamicRule {
    fn rule_id(&self) -> i32 {
        self.id
    }
}

/// Compute the table that results from removing `remove_rule_ids` from
/// `current` and then appending `add_rules`.
///
/// Rejects the update if it would leave two rules with the same id or a
/// rule with a non-positive id, mirroring the host's validation.
pub fn apply_update<R: RuleEntry>(
    current: Vec<R>,
    remove_rule_ids: &[i32],
    add_rules: Vec<R>,
) -> Result<Vec<R>, RuleTableError> {
    let removed: HashSet<i32> = remove_rule_ids.iter().copied().collect();
    let mut next: Vec<R> = current
        .into_iter()
        .filter(|rule| !removed.contains(&rule.rule_id()))
        .collect();

    let mut ids: HashSet<i32> = next.iter().map(RuleEntry::rule_id).collect();
    for rule in add_rules {
        let id = rule.rule_id();
        if id < 1 {
            return Err(RuleTableError::Rejected(format!(
                "rule id must be positive, got {}",
                id
            )));
        }
        if !ids.insert(id) {
            return Err(RuleTableError::DuplicateId(id));
        }
        next.push(rule);
    }

    Ok(next)
}

/// In-memory rule table.
#[derive(Default)]
pub struct MemoryRuleTable {
    rules: Mutex<Vec<DynamicRule>>,
}

impl MemoryRuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<DynamicRule>) -> Self {
        Self {
            rules: Mutex::new(rules),
        }
    }

    fn poisoned() -> RuleTableError {
        RuleTableError::Unavailable("rule table lock poisoned".to_string())
    }
}

#[async_trait]
impl RuleTable for MemoryRuleTable {
    async fn get_rules(&self) -> Result<Vec<DynamicRule>, RuleTableError> {
        let rules = self.rules.lock().map_err(|_| Self::poisoned())?;
        Ok(rules.clone())
    }

    async fn update_rules(&self, update: RuleUpdate) -> Result<(), RuleTableError> {
        let mut rules = self.rules.lock().map_err(|_| Self::poisoned())?;
        let next = apply_update(rules.clone(), &update.remove_rule_ids, update.add_rules)?;
        *rules = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enki_compiler::build_rule;

    #[tokio::test]
    async fn test_update_adds_and_removes() {
        let table = MemoryRuleTable::new();
        let a = build_rule("*a.com*");
        let b = build_rule("*b.com*");

        table
            .update_rules(RuleUpdate {
                remove_rule_ids: Vec::new(),
                add_rules: vec![a.clone(), b.clone()],
            })
            .await
            .unwrap();
        assert_eq!(table.get_rules().await.unwrap(), vec![a.clone(), b.clone()]);

        table
            .update_rules(RuleUpdate {
                remove_rule_ids: vec![a.id],
                add_rules: Vec::new(),
            })
            .await
            .unwrap();
        assert_eq!(table.get_rules().await.unwrap(), vec![b.clone()]);
        assert_eq!(table.get_rule_ids().await.unwrap(), vec![b.id]);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected_atomically() {
        let a = build_rule("*a.com*");
        let table = MemoryRuleTable::with_rules(vec![a.clone()]);

        let err = table
            .update_rules(RuleUpdate {
                remove_rule_ids: Vec::new(),
                add_rules: vec![build_rule("*b.com*"), a.clone()],
            })
            .await
            .unwrap_err();
        assert_eq!(err, RuleTableError::DuplicateId(a.id));
        assert_eq!(table.get_rules().await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn test_replace_same_id_in_one_update() {
        let a = build_rule("*a.com*");
        let table = MemoryRuleTable::with_rules(vec![a.clone()]);
        table
            .update_rules(RuleUpdate {
                remove_rule_ids: vec![a.id],
                add_rules: vec![a.clone()],
            })
            .await
            .unwrap();
        assert_eq!(table.get_rules().await.unwrap(), vec![a]);
    }

    #[test]
    fn test_non_positive_id_rejected() {
        let mut rule = build_rule("*a.com*");
        rule.id = 0;
        assert!(matches!(
            apply_update(Vec::new(), &[], vec![rule]),
            Err(RuleTableError::Rejected(_))
        ));
    }

    #[test]
    fn test_removing_unknown_id_is_harmless() {
        let next: Vec<DynamicRule> = apply_update(Vec::new(), &[42], Vec::new()).unwrap();
        assert!(next.is_empty());
    }
}
