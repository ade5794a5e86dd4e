/// Failure talking to the persistent settings store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Settings store unavailable: {0}")]
    Unavailable(String),
    #[error("Settings I/O failed: {0}")]
    Io(String),
    #[error("Settings could not be (de)serialized: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Failure talking to the host's rule table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleTableError {
    #[error("Rule table unavailable: {0}")]
    Unavailable(String),
    #[error("Rule update rejected: {0}")]
    Rejected(String),
    #[error("Duplicate rule id: {0}")]
    DuplicateId(i32),
    #[error("Rule table I/O failed: {0}")]
    Io(String),
}

/// A synchronization cycle that did not complete, tagged with the step that
/// failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("Reading patterns failed: {0}")]
    Read(#[source] StoreError),
    #[error("Seeding default patterns failed: {0}")]
    Seed(#[source] StoreError),
    #[error("Reading installed rules failed: {0}")]
    Snapshot(#[source] RuleTableError),
    #[error("Applying rule update failed: {0}")]
    Apply(#[source] RuleTableError),
}
