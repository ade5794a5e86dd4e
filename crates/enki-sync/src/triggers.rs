//! Host events that request a synchronization
//!
//! Install, browser startup and a change to the stored `patterns` each run
//! one cycle. A failed cycle is logged here and not retried.

use std::fmt;
use std::sync::Arc;

use enki_core::settings::{Settings, SettingsKey, DEFAULT_INSTALL_PATTERN};
use log::{error, warn};
use tokio::sync::broadcast;

use crate::error::SyncError;
use crate::store::{SettingsChange, StorageArea};
use crate::synchronizer::{SyncReport, Synchronizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Installed,
    Startup,
    SettingsChanged,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Installed => "onInstalled",
            Self::Startup => "onStartup",
            Self::SettingsChanged => "onChanged",
        };
        f.write_str(name)
    }
}

/// Entry points wired to host events. Every trigger shares one
/// synchronizer, and therefore one queue.
#[derive(Clone)]
pub struct Triggers {
    synchronizer: Arc<Synchronizer>,
}

impl Triggers {
    pub fn new(synchronizer: Arc<Synchronizer>) -> Self {
        Self { synchronizer }
    }

    /// Extension installed or updated: make sure `patterns` is stored
    /// (seeding the default on a fresh install), then synchronize.
    pub async fn on_installed(&self) -> Result<SyncReport, SyncError> {
        let result = self.seed_and_sync().await;
        log_outcome(Trigger::Installed, result)
    }

    async fn seed_and_sync(&self) -> Result<SyncReport, SyncError> {
        let store = self.synchronizer.store();
        if !store
            .contains_key(SettingsKey::Patterns)
            .await
            .map_err(SyncError::Seed)?
        {
            let seeded = Settings {
                patterns: vec![DEFAULT_INSTALL_PATTERN.to_string()],
                ..Settings::default()
            };
            store
                .save_keys(&seeded, &[SettingsKey::Patterns])
                .await
                .map_err(SyncError::Seed)?;
        }

        self.synchronizer.synchronize().await
    }

    pub async fn on_startup(&self) -> Result<SyncReport, SyncError> {
        let result = self.synchronizer.synchronize().await;
        log_outcome(Trigger::Startup, result)
    }

    /// Settings changed. Only a change to `patterns` in the sync area
    /// requests a cycle; anything else returns `None`.
    pub async fn on_settings_changed(
        &self,
        change: &SettingsChange,
    ) -> Option<Result<SyncReport, SyncError>> {
        if change.area != StorageArea::Sync || !change.touches(SettingsKey::Patterns) {
            return None;
        }
        let result = self.synchronizer.synchronize().await;
        Some(log_outcome(Trigger::SettingsChanged, result))
    }

    /// Drive `on_settings_changed` from a change feed until it closes.
    pub async fn watch(&self, mut changes: broadcast::Receiver<SettingsChange>) {
        loop {
            match changes.recv().await {
                Ok(change) => {
                    let _ = self.on_settings_changed(&change).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Missed notifications still mean the patterns may have moved.
                    warn!("Missed {} settings notifications; resynchronizing", skipped);
                    let result = self.synchronizer.synchronize().await;
                    let _ = log_outcome(Trigger::SettingsChanged, result);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

fn log_outcome(
    trigger: Trigger,
    result: Result<SyncReport, SyncError>,
) -> Result<SyncReport, SyncError> {
    if let Err(e) = &result {
        error!("refreshDynamicRules({}) failed: {}", trigger, e);
    }
    result
}
