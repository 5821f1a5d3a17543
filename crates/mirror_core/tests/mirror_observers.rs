use mirror_core::{Item, MemoryStore, MirrorChange, MirrorConfig, MirroredCollection, StoreOpKind};
use std::cell::RefCell;
use std::rc::Rc;

type Seen = Rc<RefCell<Vec<MirrorChange<Item>>>>;

fn observed(store: &MemoryStore<Item>) -> (MirroredCollection<Item, &MemoryStore<Item>>, Seen) {
    let seen: Seen = Rc::new(RefCell::new(Vec::new()));
    let mut mirror: MirroredCollection<Item, &MemoryStore<Item>> =
        MirroredCollection::with_config(MirrorConfig::default().with_label("observed"));
    let sink = Rc::clone(&seen);
    mirror.subscribe(move |change| sink.borrow_mut().push(change.clone()));
    mirror.fetch_all(store).unwrap();
    seen.borrow_mut().clear();
    (mirror, seen)
}

#[test]
fn fetch_publishes_loaded_count() {
    let store = MemoryStore::seeded([Item::new("a"), Item::new("b")]);
    let (mut mirror, seen) = observed(&store);

    mirror.refresh().unwrap();

    assert_eq!(*seen.borrow(), vec![MirrorChange::Fetched { count: 2 }]);
}

#[test]
fn every_successful_mutation_publishes_one_change() {
    let store = MemoryStore::new();
    let (mut mirror, seen) = observed(&store);
    let first = Item::new("first");
    let second = Item::task("second");
    let revision = mirror.revision();

    mirror.append(first.clone());
    mirror.remove(&first);
    mirror.append(second.clone());
    mirror.remove_everything().unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![
            MirrorChange::Appended(first.clone()),
            MirrorChange::Removed {
                id: first.uuid,
                removed: 1,
            },
            MirrorChange::Appended(second),
            MirrorChange::Cleared { removed: 1 },
        ]
    );
    assert_eq!(mirror.revision(), revision + 4);
}

#[test]
fn skipped_and_failed_mutations_publish_nothing() {
    let store = MemoryStore::new();
    let (mut mirror, seen) = observed(&store);
    let item = Item::new("only once");
    mirror.append(item.clone());
    seen.borrow_mut().clear();

    mirror.append(item.clone());
    mirror.remove(&Item::new("never appended"));
    store.fail_next(StoreOpKind::Insert);
    mirror.append(Item::new("rejected"));
    store.fail_next(StoreOpKind::DeleteAll);
    assert!(mirror.remove_everything().is_err());
    store.fail_next(StoreOpKind::Fetch);
    assert!(mirror.refresh().is_err());

    assert!(seen.borrow().is_empty());
    assert_eq!(mirror.current_items(), &[item][..]);
}

#[test]
fn listeners_see_the_updated_mirror_state() {
    let store = MemoryStore::new();
    let (mut mirror, seen) = observed(&store);
    let a = Item::new("a");
    let b = Item::new("b");
    mirror.append_all([a.clone(), b.clone()]);

    mirror.replace([b.clone()]);

    let changes = seen.borrow();
    assert_eq!(changes.len(), 3);
    assert_eq!(
        changes[2],
        MirrorChange::Removed {
            id: a.uuid,
            removed: 1,
        }
    );
    assert_eq!(mirror.current_items(), &[b][..]);
}

#[test]
fn unsubscribed_listener_stops_receiving() {
    let store = MemoryStore::new();
    let mut mirror: MirroredCollection<Item, _> = MirroredCollection::new();
    mirror.fetch_all(&store).unwrap();
    let count = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&count);
    let subscription = mirror.subscribe(move |_| *sink.borrow_mut() += 1);

    mirror.append(Item::new("counted"));
    assert!(mirror.unsubscribe(subscription));
    mirror.append(Item::new("not counted"));

    assert_eq!(*count.borrow(), 1);
    assert_eq!(mirror.listener_count(), 0);
}
