//! Mirrored collection controller.
//!
//! # Responsibility
//! - Keep an ordered in-memory mirror of store records in step with the
//!   bound store context on every mutation.
//! - Publish change notifications to registered listeners.
//!
//! # Invariants
//! - After any successful operation the mirror's identity set is what the
//!   controller believes the store holds for the bound context.
//! - Store writes happen exactly once and before the visible mirror update.
//! - Guard failures (unbound context, duplicate identity) never return `Err`.
//!
//! # Threading
//! The controller performs no locking. All calls must come from one logical
//! thread (an event loop or a caller-held mutex).

pub mod change;
pub mod collection;
pub mod config;
pub mod error;
pub mod outcome;

pub use change::{ChangeListener, MirrorChange, SubscriptionId};
pub use collection::MirroredCollection;
pub use config::MirrorConfig;
pub use error::MirrorError;
pub use outcome::{BatchOutcome, MutationOutcome, ReplaceOutcome, SkipReason};
