use std::collections::HashMap;

use enki_core::hash::rule_id_for_pattern;
use log::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizeStats {
    pub before: usize,
    pub after: usize,
    pub deduped: usize,
    pub collisions: usize,
}

/// Drop repeated patterns and patterns whose rule id collides with an
/// earlier, different pattern. The host rejects an update carrying two rules
/// with the same id, so only the first pattern for each id survives.
pub fn optimize_patterns(patterns: &mut Vec<String>) -> OptimizeStats {
    let before = patterns.len();
    let mut seen: HashMap<i32, String> = HashMap::new();
    let mut deduped = 0usize;
    let mut collisions = 0usize;

    patterns.retain(|pattern| {
        let id = rule_id_for_pattern(pattern);
        match seen.get(&id) {
            Some(existing) if existing == pattern => {
                deduped += 1;
                false
            }
            Some(existing) => {
                warn!(
                    "Rule id {} of pattern '{}' collides with '{}'; dropping it",
                    id, pattern, existing
                );
                collisions += 1;
                false
            }
            None => {
                seen.insert(id, pattern.clone());
                true
            }
        }
    });

    OptimizeStats {
        before,
        after: patterns.len(),
        deduped,
        collisions,
    }
}
