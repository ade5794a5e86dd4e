//! Rule synchronizer
//!
//! One cycle reads the stored patterns, snapshots the installed rule ids,
//! compiles the desired rules and replaces the installed set in a single
//! atomic update. Every installed rule is removed and every desired rule is
//! added; ids are a pure function of the pattern, so re-adding is harmless.

use std::sync::Arc;

use enki_compiler::build_rule_set;
use enki_core::types::RuleUpdate;
use log::info;

use crate::error::SyncError;
use crate::queue::SyncQueue;
use crate::store::SettingsStore;
use crate::table::RuleTable;

/// What a completed cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub patterns: Vec<String>,
    pub removed_rule_ids: Vec<i32>,
    pub added_rule_ids: Vec<i32>,
    /// Patterns dropped as repeats or id collisions
    pub skipped_patterns: usize,
}

pub struct Synchronizer {
    store: Arc<dyn SettingsStore>,
    table: Arc<dyn RuleTable>,
    queue: SyncQueue,
}

impl Synchronizer {
    pub fn new(store: Arc<dyn SettingsStore>, table: Arc<dyn RuleTable>) -> Self {
        Self {
            store,
            table,
            queue: SyncQueue::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    pub fn table(&self) -> &Arc<dyn RuleTable> {
        &self.table
    }

    /// Enqueue a cycle and wait for it. Cycles never overlap; each one sees
    /// the settled result of every cycle requested before it.
    pub async fn synchronize(&self) -> Result<SyncReport, SyncError> {
        self.queue.run(self.run_cycle()).await
    }

    async fn run_cycle(&self) -> Result<SyncReport, SyncError> {
        let settings = self.store.load().await.map_err(SyncError::Read)?;

        let remove_rule_ids = self.table.get_rule_ids().await.map_err(SyncError::Snapshot)?;

        let build = build_rule_set(&settings.patterns);
        let added_rule_ids = build.rule_ids();
        let skipped_patterns = build.stats.before - build.stats.after;

        info!(
            "Refreshing dynamic rules: patterns={:?} add={:?} remove={:?}",
            settings.patterns, added_rule_ids, remove_rule_ids
        );

        self.table
            .update_rules(RuleUpdate {
                remove_rule_ids: remove_rule_ids.clone(),
                add_rules: build.rules,
            })
            .await
            .map_err(SyncError::Apply)?;

        Ok(SyncReport {
            patterns: settings.patterns,
            removed_rule_ids: remove_rule_ids,
            added_rule_ids,
            skipped_patterns,
        })
    }
}
