//! Store-synchronized in-memory mirror of persisted records.
//! This crate keeps a local ordered collection consistent with a store
//! context on every mutation.

pub mod db;
pub mod logging;
pub mod mirror;
pub mod model;
pub mod store;

pub use logging::{default_log_level, init_logging, init_logging_with, logging_status, LoggingOptions};
pub use mirror::{
    BatchOutcome, ChangeListener, MirrorChange, MirrorConfig, MirrorError, MirroredCollection,
    MutationOutcome, ReplaceOutcome, SkipReason, SubscriptionId,
};
pub use model::item::{Item, ItemId, ItemKind};
pub use model::record::Record;
pub use store::memory::{MemoryStore, StoreOp, StoreOpKind};
pub use store::query::{FetchDescriptor, Predicate, SortKey, SortOrder};
pub use store::sqlite::SqliteStore;
pub use store::{StoreContext, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
