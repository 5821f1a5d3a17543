//! Record contracts and the bundled sample record.
//!
//! # Responsibility
//! - Define what the mirror needs from a persisted record type.
//! - Provide `Item`, a concrete record used by the SQLite store and CLI.
//!
//! # Invariants
//! - Every record exposes a stable identity independent of its other fields.
//! - Whole-value equality is used for diffing, identity for de-duplication.

pub mod item;
pub mod record;
