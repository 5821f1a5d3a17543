//! Item sample record.
//!
//! # Responsibility
//! - Provide a concrete, serializable record for the SQLite store and CLI.
//! - Model subtypes through `ItemKind` so subtype-scoped deletes are testable.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another item.
//! - `entity()` is `item` for plain items and `item.<kind>` otherwise.

use crate::model::record::Record;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one item.
pub type ItemId = Uuid;

/// Item subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Base entity without subtype fields.
    Plain,
    /// Checklist entry; `done` is meaningful.
    Task,
    /// Scheduled entry; `due_at` is meaningful.
    Event,
}

/// Sample record mirrored by the bundled stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub uuid: ItemId,
    pub kind: ItemKind,
    pub title: String,
    pub done: bool,
    /// Unix epoch milliseconds.
    pub due_at: Option<i64>,
}

impl Item {
    /// Creates a plain item with a generated stable ID.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), ItemKind::Plain, title)
    }

    /// Creates an item with a caller-provided stable ID.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(uuid: ItemId, kind: ItemKind, title: impl Into<String>) -> Self {
        Self {
            uuid,
            kind,
            title: title.into(),
            done: false,
            due_at: None,
        }
    }

    /// Creates a task item with a generated stable ID.
    pub fn task(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), ItemKind::Task, title)
    }

    /// Creates an event item due at `due_at` (epoch ms).
    pub fn event(title: impl Into<String>, due_at: i64) -> Self {
        let mut item = Self::with_id(Uuid::new_v4(), ItemKind::Event, title);
        item.due_at = Some(due_at);
        item
    }
}

impl Record for Item {
    type Id = ItemId;

    const ENTITY: &'static str = "item";

    fn id(&self) -> ItemId {
        self.uuid
    }

    fn entity(&self) -> &str {
        match self.kind {
            ItemKind::Plain => Self::ENTITY,
            ItemKind::Task => "item.task",
            ItemKind::Event => "item.event",
        }
    }
}
