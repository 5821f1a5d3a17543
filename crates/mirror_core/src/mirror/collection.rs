//! Mirrored collection controller.
//!
//! # Responsibility
//! - Bind a store context and seed the mirror from it.
//! - Route append/remove/remove_all through the store, then the mirror.
//! - Converge the mirror to a desired collection by diffing.
//!
//! # Invariants
//! - At most one mirrored record per identity.
//! - A failed store call leaves the mirror untouched.
//! - Listeners fire only after the mirror has been updated.

use crate::mirror::change::{Listeners, MirrorChange, SubscriptionId};
use crate::mirror::config::MirrorConfig;
use crate::mirror::error::MirrorError;
use crate::mirror::outcome::{BatchOutcome, MutationOutcome, ReplaceOutcome, SkipReason};
use crate::model::record::Record;
use crate::store::query::{FetchDescriptor, Predicate};
use crate::store::StoreContext;
use log::{debug, error, info, log};
use std::collections::HashSet;
use std::fmt::{Debug, Formatter};

/// Ordered in-memory mirror of the records a store context holds.
///
/// `C` is the context handle: usually `&S`, `Rc<S>` or `Arc<S>` for some
/// store `S`. The controller never creates or closes it.
pub struct MirroredCollection<R: Record, C> {
    context: Option<C>,
    descriptor: FetchDescriptor<R>,
    items: Vec<R>,
    config: MirrorConfig,
    listeners: Listeners<R>,
    revision: u64,
}

impl<R: Record, C: StoreContext<R>> Default for MirroredCollection<R, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record, C: StoreContext<R>> MirroredCollection<R, C> {
    /// Creates an unbound, empty controller with default configuration.
    pub fn new() -> Self {
        Self::with_config(MirrorConfig::default())
    }

    pub fn with_config(config: MirrorConfig) -> Self {
        Self {
            context: None,
            descriptor: FetchDescriptor::default(),
            items: Vec::new(),
            config,
            listeners: Listeners::default(),
            revision: 0,
        }
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    pub fn is_bound(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    /// Descriptor of the last `fetch`, reused by `refresh`.
    pub fn descriptor(&self) -> &FetchDescriptor<R> {
        &self.descriptor
    }

    /// Returns the mirror in its current order.
    pub fn current_items(&self) -> &[R] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.items.iter()
    }

    pub fn contains_id(&self, id: &R::Id) -> bool {
        self.items.iter().any(|item| item.id() == *id)
    }

    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.items.iter().find(|item| item.id() == *id)
    }

    /// Number of change notifications published so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Registers `listener` for every subsequent mirror change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&MirrorChange<R>) + 'static,
    ) -> SubscriptionId {
        self.listeners.subscribe(Box::new(listener))
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Binds `context` and reloads the mirror from `descriptor`.
    ///
    /// The binding (and descriptor) are replaced before the query runs, so a
    /// failed fetch still leaves the new context bound.
    ///
    /// # Errors
    /// - Returns `MirrorError::Fetch` when the store query fails; the mirror
    ///   keeps its previous contents.
    pub fn fetch(&mut self, context: C, descriptor: FetchDescriptor<R>) -> Result<(), MirrorError> {
        let rebinding = self.context.is_some();
        self.descriptor = descriptor;
        let context = self.context.insert(context);
        debug!(
            "event=mirror_bind module=mirror status=ok collection={} rebind={}",
            self.config.label, rebinding
        );

        match context.fetch(&self.descriptor) {
            Ok(records) => {
                self.load(records);
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=mirror_fetch module=mirror status=error collection={} {} error={}",
                    self.config.label,
                    self.descriptor.summary(),
                    err
                );
                Err(MirrorError::Fetch(err))
            }
        }
    }

    /// `fetch` with the unfiltered default descriptor.
    pub fn fetch_all(&mut self, context: C) -> Result<(), MirrorError> {
        self.fetch(context, FetchDescriptor::default())
    }

    /// Reloads the mirror through the bound context and last descriptor.
    ///
    /// Unbound controllers report and skip.
    pub fn refresh(&mut self) -> Result<MutationOutcome, MirrorError> {
        let Some(context) = self.context.as_ref() else {
            return Ok(self.skip("refresh", SkipReason::Unbound, None));
        };

        match context.fetch(&self.descriptor) {
            Ok(records) => {
                self.load(records);
                Ok(MutationOutcome::Applied)
            }
            Err(err) => {
                error!(
                    "event=mirror_refresh module=mirror status=error collection={} error={}",
                    self.config.label, err
                );
                Err(MirrorError::Fetch(err))
            }
        }
    }

    /// Inserts `record` into the store, then pushes it to the mirror.
    ///
    /// Skips (with a diagnostic) when unbound or when the identity is
    /// already mirrored; neither case touches the store.
    pub fn append(&mut self, record: R) -> MutationOutcome {
        let id = record.id();
        let Some(context) = self.context.as_ref() else {
            return self.skip("append", SkipReason::Unbound, Some(&id));
        };
        if self.contains_id(&id) {
            return self.skip("append", SkipReason::Duplicate, Some(&id));
        }

        if let Err(err) = context.insert(&record) {
            error!(
                "event=mirror_append module=mirror status=error collection={} id={:?} error={}",
                self.config.label, id, err
            );
            return MutationOutcome::Skipped(SkipReason::StoreRejected);
        }

        self.items.push(record.clone());
        debug!(
            "event=mirror_append module=mirror status=ok collection={} id={:?} len={}",
            self.config.label,
            id,
            self.items.len()
        );
        self.notify(MirrorChange::Appended(record));
        MutationOutcome::Applied
    }

    /// Appends each record in order; duplicates are skipped one by one.
    pub fn append_all(&mut self, records: impl IntoIterator<Item = R>) -> BatchOutcome {
        records
            .into_iter()
            .map(|record| self.append(record))
            .collect()
    }

    /// Deletes `record` from the store, then drops mirrored entries sharing
    /// its identity.
    ///
    /// Matching is by identity, so a record edited after it was appended is
    /// still removed. Deleting an unknown identity is left to the store.
    pub fn remove(&mut self, record: &R) -> MutationOutcome {
        let id = record.id();
        let Some(context) = self.context.as_ref() else {
            return self.skip("remove", SkipReason::Unbound, Some(&id));
        };

        if let Err(err) = context.delete(record) {
            error!(
                "event=mirror_remove module=mirror status=error collection={} id={:?} error={}",
                self.config.label, id, err
            );
            return MutationOutcome::Skipped(SkipReason::StoreRejected);
        }

        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        let removed = before - self.items.len();
        debug!(
            "event=mirror_remove module=mirror status=ok collection={} id={:?} removed={}",
            self.config.label, id, removed
        );
        if removed > 0 {
            self.notify(MirrorChange::Removed { id, removed });
        }
        MutationOutcome::Applied
    }

    /// Removes each record independently.
    pub fn remove_all_of(&mut self, records: &[R]) -> BatchOutcome {
        records.iter().map(|record| self.remove(record)).collect()
    }

    /// Issues one bulk store delete, then empties the mirror.
    ///
    /// The mirror is cleared entirely even when `predicate` narrows the
    /// store delete; the controller does not re-derive the matched subset.
    /// Call `refresh` afterwards to re-sync with a narrowing predicate.
    ///
    /// # Errors
    /// - Returns `MirrorError::RemoveAll` when the bulk delete fails; the
    ///   mirror keeps its contents.
    pub fn remove_all(
        &mut self,
        predicate: Option<&Predicate<R>>,
        include_subtypes: bool,
    ) -> Result<MutationOutcome, MirrorError> {
        let Some(context) = self.context.as_ref() else {
            return Ok(self.skip("remove_all", SkipReason::Unbound, None));
        };
        let scope = predicate.map_or("all", |predicate| predicate.label());

        if let Err(err) = context.delete_all(predicate, include_subtypes) {
            error!(
                "event=mirror_remove_all module=mirror status=error collection={} predicate={} include_subtypes={} error={}",
                self.config.label, scope, include_subtypes, err
            );
            return Err(MirrorError::RemoveAll(err));
        }

        let removed = self.items.len();
        info!(
            "event=mirror_remove_all module=mirror status=ok collection={} predicate={} include_subtypes={} removed={}",
            self.config.label, scope, include_subtypes, removed
        );
        self.items.clear();
        self.notify(MirrorChange::Cleared { removed });
        Ok(MutationOutcome::Applied)
    }

    /// `remove_all` with no predicate, subtypes included.
    pub fn remove_everything(&mut self) -> Result<MutationOutcome, MirrorError> {
        self.remove_all(None, true)
    }

    /// Converges the mirror to `desired` with minimal removes and appends.
    ///
    /// Membership is whole-value equality over unordered contents. Records
    /// only in the mirror are removed first, then records only in `desired`
    /// are appended (in `desired` order) at the end. An edited record thus
    /// becomes delete(old) followed by insert(new), never an in-place update.
    pub fn replace(&mut self, desired: impl IntoIterator<Item = R>) -> ReplaceOutcome {
        let desired: Vec<R> = desired.into_iter().collect();
        let (to_remove, to_append) = {
            let desired_set: HashSet<&R> = desired.iter().collect();
            let current_set: HashSet<&R> = self.items.iter().collect();
            let to_remove: Vec<R> = self
                .items
                .iter()
                .filter(|item| !desired_set.contains(item))
                .cloned()
                .collect();
            let to_append: Vec<R> = desired
                .iter()
                .filter(|record| !current_set.contains(record))
                .cloned()
                .collect();
            (to_remove, to_append)
        };

        debug!(
            "event=mirror_replace module=mirror status=start collection={} to_remove={} to_append={}",
            self.config.label,
            to_remove.len(),
            to_append.len()
        );
        let outcome = ReplaceOutcome {
            removed: self.remove_all_of(&to_remove),
            appended: self.append_all(to_append),
        };
        debug!(
            "event=mirror_replace module=mirror status=ok collection={} removed={} appended={} skipped={}",
            self.config.label,
            outcome.removed.applied,
            outcome.appended.applied,
            outcome.removed.skipped + outcome.appended.skipped
        );
        outcome
    }

    fn load(&mut self, records: Vec<R>) {
        self.items = records;
        info!(
            "event=mirror_fetch module=mirror status=ok collection={} {} count={}",
            self.config.label,
            self.descriptor.summary(),
            self.items.len()
        );
        self.notify(MirrorChange::Fetched {
            count: self.items.len(),
        });
    }

    fn skip(&self, op: &'static str, reason: SkipReason, id: Option<&R::Id>) -> MutationOutcome {
        let message = match reason {
            SkipReason::Unbound => format!("{op} requires a bound context"),
            SkipReason::Duplicate => format!("duplicate {op} ignored"),
            SkipReason::StoreRejected => format!("store rejected {op}"),
        };
        match id {
            Some(id) => log!(
                self.config.guard_level,
                "event=mirror_{} module=mirror status=skipped reason={} collection={} id={:?} message=\"{}\"",
                op,
                reason.as_str(),
                self.config.label,
                id,
                message
            ),
            None => log!(
                self.config.guard_level,
                "event=mirror_{} module=mirror status=skipped reason={} collection={} message=\"{}\"",
                op,
                reason.as_str(),
                self.config.label,
                message
            ),
        }
        MutationOutcome::Skipped(reason)
    }

    fn notify(&mut self, change: MirrorChange<R>) {
        self.revision += 1;
        self.listeners.notify(&change);
    }
}

impl<R: Record + Debug, C> Debug for MirroredCollection<R, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirroredCollection")
            .field("label", &self.config.label)
            .field("bound", &self.context.is_some())
            .field("items", &self.items)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
