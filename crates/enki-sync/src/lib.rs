//! Enki Rule Synchronizer
//!
//! Keeps the host's dynamic rule table equal to the rules compiled from the
//! stored pattern list. Install, startup and settings-change triggers all
//! funnel into one `Synchronizer`, whose single-lane queue guarantees that
//! no two cycles overlap.
//!
//! # Modules
//!
//! - `store`: Settings store trait, change notifications, in-memory store
//! - `table`: Rule table trait and in-memory table
//! - `queue`: Single-lane task queue
//! - `synchronizer`: The read/snapshot/compile/apply cycle
//! - `triggers`: Host event entry points
//! - `error`: Error types

pub mod error;
pub mod queue;
pub mod store;
pub mod synchronizer;
pub mod table;
pub mod triggers;

pub use error::{RuleTableError, StoreError, SyncError};
pub use queue::SyncQueue;
pub use store::{MemorySettingsStore, SettingsChange, SettingsStore, StorageArea};
pub use synchronizer::{SyncReport, Synchronizer};
pub use table::{MemoryRuleTable, RuleEntry, RuleTable};
pub use triggers::{Trigger, Triggers};
