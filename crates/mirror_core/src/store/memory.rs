//! In-process store context.
//!
//! # Responsibility
//! - Hold records in insertion order without any persistence.
//! - Journal every context call so callers can audit store traffic.
//! - Allow one-shot failure injection per operation kind.
//!
//! # Invariants
//! - At most one stored record per identity.
//! - Injected failures leave stored records untouched.

use crate::model::record::{entity_in_scope, Record};
use crate::store::query::{FetchDescriptor, Predicate};
use crate::store::{StoreContext, StoreError, StoreResult};
use std::cell::RefCell;

/// Kind of store call, used by the journal and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOpKind {
    Fetch,
    Insert,
    Delete,
    DeleteAll,
}

impl StoreOpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::DeleteAll => "delete_all",
        }
    }
}

/// One journaled store call. Failed calls are journaled too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp<R> {
    Fetch { returned: usize },
    Insert(R),
    Delete(R),
    DeleteAll {
        predicate: Option<String>,
        include_subtypes: bool,
    },
}

impl<R> StoreOp<R> {
    pub fn kind(&self) -> StoreOpKind {
        match self {
            Self::Fetch { .. } => StoreOpKind::Fetch,
            Self::Insert(_) => StoreOpKind::Insert,
            Self::Delete(_) => StoreOpKind::Delete,
            Self::DeleteAll { .. } => StoreOpKind::DeleteAll,
        }
    }
}

/// Store context backed by a `Vec` behind a `RefCell`.
///
/// Not `Sync`; share it through `&MemoryStore` or `Rc<MemoryStore>` on the
/// thread that drives the mirror.
pub struct MemoryStore<R> {
    records: RefCell<Vec<R>>,
    journal: RefCell<Vec<StoreOp<R>>>,
    pending_failures: RefCell<Vec<StoreOpKind>>,
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        Self {
            records: RefCell::new(Vec::new()),
            journal: RefCell::new(Vec::new()),
            pending_failures: RefCell::new(Vec::new()),
        }
    }
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with `records` without journaling them.
    pub fn seeded(records: impl IntoIterator<Item = R>) -> Self {
        let store = Self::new();
        for record in records {
            store.upsert(record);
        }
        store
    }

    /// Returns stored records in insertion order.
    pub fn snapshot(&self) -> Vec<R> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn contains_id(&self, id: &R::Id) -> bool {
        self.records.borrow().iter().any(|record| record.id() == *id)
    }

    /// Returns every journaled call, oldest first.
    pub fn journal(&self) -> Vec<StoreOp<R>> {
        self.journal.borrow().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.borrow_mut().clear();
    }

    /// Counts journaled calls of `kind`.
    pub fn count(&self, kind: StoreOpKind) -> usize {
        self.journal
            .borrow()
            .iter()
            .filter(|op| op.kind() == kind)
            .count()
    }

    /// Makes the next call of `kind` fail with `StoreError::Unavailable`.
    pub fn fail_next(&self, kind: StoreOpKind) {
        self.pending_failures.borrow_mut().push(kind);
    }

    fn take_failure(&self, kind: StoreOpKind) -> StoreResult<()> {
        let mut pending = self.pending_failures.borrow_mut();
        match pending.iter().position(|pending_kind| *pending_kind == kind) {
            Some(index) => {
                pending.remove(index);
                Err(StoreError::Unavailable(format!(
                    "injected {} failure",
                    kind.as_str()
                )))
            }
            None => Ok(()),
        }
    }

    fn record_op(&self, op: StoreOp<R>) {
        self.journal.borrow_mut().push(op);
    }

    fn upsert(&self, record: R) {
        let mut records = self.records.borrow_mut();
        let id = record.id();
        match records.iter_mut().find(|existing| existing.id() == id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }
}

impl<R: Record> StoreContext<R> for MemoryStore<R> {
    fn fetch(&self, descriptor: &FetchDescriptor<R>) -> StoreResult<Vec<R>> {
        if let Err(err) = self.take_failure(StoreOpKind::Fetch) {
            self.record_op(StoreOp::Fetch { returned: 0 });
            return Err(err);
        }

        let family: Vec<R> = self
            .records
            .borrow()
            .iter()
            .filter(|record| entity_in_scope(record.entity(), R::ENTITY, true))
            .cloned()
            .collect();
        let fetched = descriptor.apply(family);
        self.record_op(StoreOp::Fetch {
            returned: fetched.len(),
        });
        Ok(fetched)
    }

    fn insert(&self, record: &R) -> StoreResult<()> {
        self.record_op(StoreOp::Insert(record.clone()));
        self.take_failure(StoreOpKind::Insert)?;
        self.upsert(record.clone());
        Ok(())
    }

    fn delete(&self, record: &R) -> StoreResult<()> {
        self.record_op(StoreOp::Delete(record.clone()));
        self.take_failure(StoreOpKind::Delete)?;
        let id = record.id();
        self.records.borrow_mut().retain(|stored| stored.id() != id);
        Ok(())
    }

    fn delete_all(
        &self,
        predicate: Option<&Predicate<R>>,
        include_subtypes: bool,
    ) -> StoreResult<()> {
        self.record_op(StoreOp::DeleteAll {
            predicate: predicate.map(|predicate| predicate.label().to_string()),
            include_subtypes,
        });
        self.take_failure(StoreOpKind::DeleteAll)?;
        self.records.borrow_mut().retain(|stored| {
            let in_scope = entity_in_scope(stored.entity(), R::ENTITY, include_subtypes);
            let matched = predicate.map_or(true, |predicate| predicate.matches(stored));
            !(in_scope && matched)
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryStore, StoreOp, StoreOpKind};
    use crate::model::item::Item;
    use crate::store::query::{FetchDescriptor, Predicate};
    use crate::store::{StoreContext, StoreError};

    #[test]
    fn insert_is_upsert_by_identity() {
        let store = MemoryStore::new();
        let mut item = Item::new("draft");
        store.insert(&item).unwrap();
        item.title = "final".to_string();
        store.insert(&item).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot()[0].title, "final");
        assert_eq!(store.count(StoreOpKind::Insert), 2);
    }

    #[test]
    fn delete_matches_identity_not_value() {
        let item = Item::new("draft");
        let store = MemoryStore::seeded([item.clone()]);
        let mut edited = item.clone();
        edited.done = true;

        store.delete(&edited).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.journal(), vec![StoreOp::Delete(edited)]);
    }

    #[test]
    fn delete_all_respects_subtype_scope() {
        let plain = Item::new("plain");
        let task = Item::task("task");
        let store = MemoryStore::seeded([plain.clone(), task.clone()]);

        store.delete_all(None, false).unwrap();
        assert_eq!(store.snapshot(), vec![task]);

        store.delete_all(None, true).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn delete_all_with_predicate_keeps_non_matching() {
        let keep = Item::new("keep");
        let drop = Item::new("drop");
        let store = MemoryStore::seeded([keep.clone(), drop]);

        let predicate = Predicate::new("title_drop", |item: &Item| item.title == "drop");
        store.delete_all(Some(&predicate), true).unwrap();

        assert_eq!(store.snapshot(), vec![keep]);
        assert_eq!(
            store.journal(),
            vec![StoreOp::DeleteAll {
                predicate: Some("title_drop".to_string()),
                include_subtypes: true,
            }]
        );
    }

    #[test]
    fn injected_failure_is_one_shot_and_leaves_records() {
        let item = Item::new("kept");
        let store = MemoryStore::seeded([item.clone()]);
        store.fail_next(StoreOpKind::Fetch);

        let err = store.fetch(&FetchDescriptor::default()).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        let fetched = store.fetch(&FetchDescriptor::default()).unwrap();
        assert_eq!(fetched, vec![item]);
        assert_eq!(store.count(StoreOpKind::Fetch), 2);
    }
}
