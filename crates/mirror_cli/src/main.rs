//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `mirror_core` linkage and exercise one fetch/append/replace cycle
//!   against an in-memory SQLite store.
//! - Keep output deterministic for quick local sanity checks.

use mirror_core::db::open_db_in_memory;
use mirror_core::{FetchDescriptor, Item, MirroredCollection, SortKey, SqliteStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("mirror_core version={}", mirror_core::core_version());
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mirror smoke failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let store: SqliteStore<'_, Item> = SqliteStore::try_new(&conn)?;
    let mut mirror = MirroredCollection::new();

    let by_title = FetchDescriptor::default().sorted_by(SortKey::ascending("title", |item: &Item| {
        item.title.clone()
    }));
    mirror.fetch(&store, by_title)?;
    println!("fetched={}", mirror.len());

    let first = Item::new("first");
    let appended = mirror.append_all([first.clone(), Item::task("second"), first.clone()]);
    println!("appended={} skipped={}", appended.applied, appended.skipped);

    let mut edited = first;
    edited.title = "first (edited)".to_string();
    let mut desired = mirror.current_items().to_vec();
    desired[0] = edited;
    let replaced = mirror.replace(desired);
    println!(
        "replace removed={} appended={} mirror={} stored={}",
        replaced.removed.applied,
        replaced.appended.applied,
        mirror.len(),
        store.count()?
    );
    Ok(())
}
