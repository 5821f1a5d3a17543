use mirror_core::{
    FetchDescriptor, Item, ItemKind, MemoryStore, MirrorError, MirroredCollection, MutationOutcome,
    Predicate, SkipReason, SortKey, StoreError, StoreOp, StoreOpKind,
};

fn bound_mirror(store: &MemoryStore<Item>) -> MirroredCollection<Item, &MemoryStore<Item>> {
    let mut mirror: MirroredCollection<Item, _> = MirroredCollection::new();
    mirror.fetch_all(store).unwrap();
    store.clear_journal();
    mirror
}

#[test]
fn fetch_with_fresh_context_yields_empty_mirror() {
    let store: MemoryStore<Item> = MemoryStore::new();
    let mut mirror: MirroredCollection<Item, _> = MirroredCollection::new();

    mirror.fetch_all(&store).unwrap();

    assert!(mirror.is_bound());
    assert!(mirror.is_empty());
    assert_eq!(store.count(StoreOpKind::Fetch), 1);
}

#[test]
fn fetch_preserves_store_order_and_applies_descriptor() {
    let zeta = Item::new("zeta");
    let alpha = Item::new("alpha");
    let task = Item::task("middle");
    let store = MemoryStore::seeded([zeta.clone(), alpha.clone(), task.clone()]);

    let mut mirror: MirroredCollection<Item, _> = MirroredCollection::new();
    mirror.fetch_all(&store).unwrap();
    assert_eq!(
        mirror.current_items(),
        &[zeta.clone(), alpha.clone(), task.clone()][..]
    );

    let tasks_only = FetchDescriptor::filtered(Predicate::new("tasks", |item: &Item| {
        item.kind == ItemKind::Task
    }));
    mirror.fetch(&store, tasks_only).unwrap();
    assert_eq!(mirror.current_items(), &[task.clone()][..]);

    let by_title = FetchDescriptor::default()
        .sorted_by(SortKey::ascending("title", |item: &Item| item.title.clone()))
        .with_limit(2);
    mirror.fetch(&store, by_title).unwrap();
    assert_eq!(mirror.current_items(), &[alpha, task][..]);
}

#[test]
fn failed_fetch_rebinds_but_keeps_items() {
    let first_store = MemoryStore::seeded([Item::new("kept")]);
    let second_store: MemoryStore<Item> = MemoryStore::new();
    let mut mirror: MirroredCollection<Item, _> = MirroredCollection::new();
    mirror.fetch_all(&first_store).unwrap();
    let before = mirror.current_items().to_vec();

    second_store.fail_next(StoreOpKind::Fetch);
    let err = mirror.fetch_all(&second_store).unwrap_err();
    assert!(matches!(err, MirrorError::Fetch(StoreError::Unavailable(_))));
    assert_eq!(mirror.current_items(), &before[..]);

    // The new context is bound even though the query failed.
    let appended = Item::new("goes to second");
    assert!(mirror.append(appended.clone()).is_applied());
    assert!(second_store.contains_id(&appended.uuid));
    assert!(!first_store.contains_id(&appended.uuid));
}

#[test]
fn append_fresh_identity_grows_mirror_and_inserts_once() {
    let store = MemoryStore::new();
    let mut mirror = bound_mirror(&store);
    let item = Item::new("fresh");

    assert_eq!(mirror.append(item.clone()), MutationOutcome::Applied);

    assert_eq!(mirror.len(), 1);
    assert_eq!(store.journal(), vec![StoreOp::Insert(item)]);
}

#[test]
fn append_duplicate_identity_is_noop_without_store_insert() {
    let store = MemoryStore::new();
    let mut mirror = bound_mirror(&store);
    let item = Item::new("original");
    mirror.append(item.clone());

    let mut same_id = item.clone();
    same_id.title = "different value, same id".to_string();
    assert_eq!(
        mirror.append(same_id),
        MutationOutcome::Skipped(SkipReason::Duplicate)
    );

    assert_eq!(mirror.current_items(), &[item][..]);
    assert_eq!(store.count(StoreOpKind::Insert), 1);
}

#[test]
fn batch_append_preserves_input_order_and_skips_duplicates_individually() {
    let store = MemoryStore::new();
    let mut mirror = bound_mirror(&store);
    let first = Item::new("first");
    let second = Item::task("second");
    let third = Item::event("third", 1_700_000_000_000);

    let batch = mirror.append_all([
        first.clone(),
        second.clone(),
        first.clone(),
        third.clone(),
    ]);

    assert_eq!(batch.applied, 3);
    assert_eq!(batch.skipped, 1);
    assert_eq!(mirror.current_items(), &[first, second, third][..]);
    assert_eq!(store.count(StoreOpKind::Insert), 3);
}

#[test]
fn remove_present_record_shrinks_mirror_and_deletes_once() {
    let store = MemoryStore::new();
    let mut mirror = bound_mirror(&store);
    let keep = Item::new("keep");
    let drop = Item::new("drop");
    mirror.append_all([keep.clone(), drop.clone()]);

    assert!(mirror.remove(&drop).is_applied());

    assert_eq!(mirror.current_items(), &[keep][..]);
    assert_eq!(store.count(StoreOpKind::Delete), 1);
    assert!(!store.contains_id(&drop.uuid));
}

#[test]
fn remove_matches_by_identity_after_in_place_edit() {
    let store = MemoryStore::new();
    let mut mirror = bound_mirror(&store);
    let item = Item::new("before edit");
    mirror.append(item.clone());

    let mut edited = item;
    edited.title = "after edit".to_string();
    edited.done = true;
    mirror.remove(&edited);

    assert!(mirror.is_empty());
    assert!(store.is_empty());
}

#[test]
fn remove_absent_record_leaves_mirror_and_still_reaches_store() {
    let store = MemoryStore::new();
    let mut mirror = bound_mirror(&store);
    let present = Item::new("present");
    mirror.append(present.clone());
    let revision = mirror.revision();

    mirror.remove(&Item::new("absent"));

    assert_eq!(mirror.current_items(), &[present][..]);
    assert_eq!(store.count(StoreOpKind::Delete), 1);
    assert_eq!(mirror.revision(), revision);
}

#[test]
fn batch_remove_is_independent_per_record() {
    let store = MemoryStore::new();
    let mut mirror = bound_mirror(&store);
    let a = Item::new("a");
    let b = Item::new("b");
    let c = Item::new("c");
    mirror.append_all([a.clone(), b.clone(), c.clone()]);

    store.fail_next(StoreOpKind::Delete);
    let batch = mirror.remove_all_of(&[a, b, c.clone()]);

    assert_eq!(batch.applied, 2);
    assert_eq!(batch.skipped, 1);
    assert_eq!(mirror.len(), 1);
    assert_ne!(mirror.current_items()[0], c);
}

#[test]
fn remove_all_without_predicate_empties_mirror_with_one_bulk_delete() {
    let store = MemoryStore::new();
    let mut mirror = bound_mirror(&store);
    mirror.append_all([Item::new("a"), Item::task("b"), Item::event("c", 5)]);
    store.clear_journal();

    assert_eq!(mirror.remove_everything().unwrap(), MutationOutcome::Applied);

    assert!(mirror.is_empty());
    assert!(store.is_empty());
    assert_eq!(
        store.journal(),
        vec![StoreOp::DeleteAll {
            predicate: None,
            include_subtypes: true,
        }]
    );
}

#[test]
fn remove_all_with_narrow_predicate_still_clears_whole_mirror() {
    let store = MemoryStore::new();
    let mut mirror = bound_mirror(&store);
    let done = {
        let mut item = Item::task("done");
        item.done = true;
        item
    };
    let open = Item::task("open");
    mirror.append_all([done, open.clone()]);

    let only_done = Predicate::new("done", |item: &Item| item.done);
    mirror.remove_all(Some(&only_done), true).unwrap();

    assert!(mirror.is_empty());
    assert_eq!(store.snapshot(), vec![open.clone()]);

    assert!(mirror.refresh().unwrap().is_applied());
    assert_eq!(mirror.current_items(), &[open][..]);
}

#[test]
fn remove_all_without_subtypes_keeps_subtype_rows_in_store() {
    let store = MemoryStore::new();
    let mut mirror = bound_mirror(&store);
    let task = Item::task("subtype");
    mirror.append_all([Item::new("plain"), task.clone()]);

    mirror.remove_all(None, false).unwrap();

    assert!(mirror.is_empty());
    assert_eq!(store.snapshot(), vec![task]);
}

#[test]
fn failed_remove_all_returns_error_and_keeps_items() {
    let store = MemoryStore::new();
    let mut mirror = bound_mirror(&store);
    mirror.append_all([Item::new("a"), Item::new("b")]);

    store.fail_next(StoreOpKind::DeleteAll);
    let err = mirror.remove_everything().unwrap_err();

    assert!(matches!(err, MirrorError::RemoveAll(_)));
    assert!(err.to_string().contains("remove_all"));
    assert_eq!(mirror.len(), 2);
    assert_eq!(store.len(), 2);
}

#[test]
fn unbound_append_reports_and_touches_nothing() {
    let mut mirror: MirroredCollection<Item, &MemoryStore<Item>> = MirroredCollection::new();

    let outcome = mirror.append(Item::new("lost"));

    assert_eq!(outcome.skip_reason(), Some(SkipReason::Unbound));
    assert!(mirror.is_empty());
    assert!(!mirror.is_bound());
}
