//! Change notifications published by the mirror.

use crate::model::record::Record;
use std::collections::BTreeMap;

/// One observable change of mirror contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorChange<R: Record> {
    /// Mirror was reloaded from the store.
    Fetched { count: usize },
    /// Record was pushed to the end of the mirror.
    Appended(R),
    /// Entries sharing `id` were dropped.
    Removed { id: R::Id, removed: usize },
    /// Mirror was emptied by a bulk delete.
    Cleared { removed: usize },
}

/// Listener callback. Runs synchronously on the mutating thread.
pub type ChangeListener<R> = Box<dyn FnMut(&MirrorChange<R>)>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Ordered listener list; notification follows subscription order.
pub(crate) struct Listeners<R: Record> {
    next_id: u64,
    entries: BTreeMap<SubscriptionId, ChangeListener<R>>,
}

impl<R: Record> Default for Listeners<R> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: BTreeMap::new(),
        }
    }
}

impl<R: Record> Listeners<R> {
    pub(crate) fn subscribe(&mut self, listener: ChangeListener<R>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, listener);
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn notify(&mut self, change: &MirrorChange<R>) {
        for listener in self.entries.values_mut() {
            listener(change);
        }
    }
}
