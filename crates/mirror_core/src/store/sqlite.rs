//! SQLite-backed store context.
//!
//! # Responsibility
//! - Persist records of one entity family as JSON bodies in `records`.
//! - Keep SQL details inside the store boundary.
//!
//! # Invariants
//! - Rows are keyed by `(root, record_id)`; `record_id` is the JSON-encoded
//!   identity, so it is stable across reads and writes.
//! - Fetch returns rows in first-insert order before descriptor sorting.
//! - Read paths reject undecodable rows instead of skipping them.

use crate::db::migrations::ensure_schema_ready;
use crate::model::record::{entity_in_scope, Record};
use crate::store::query::{FetchDescriptor, Predicate};
use crate::store::{StoreContext, StoreError, StoreResult};
use log::debug;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Store context over a borrowed, migrated SQLite connection.
pub struct SqliteStore<'conn, R> {
    conn: &'conn Connection,
    _record: PhantomData<fn() -> R>,
}

impl<'conn, R> SqliteStore<'conn, R>
where
    R: Record + Serialize + DeserializeOwned,
    R::Id: Serialize,
{
    /// Wraps `conn` after checking that migrations are fully applied.
    ///
    /// # Errors
    /// - Returns `StoreError::Db` when the schema version does not match.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self {
            conn,
            _record: PhantomData,
        })
    }

    /// Counts stored rows of the entity family, subtypes included.
    pub fn count(&self) -> StoreResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE root = ?1;",
            [R::ENTITY],
            |row| row.get(0),
        )?;
        usize::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative row count `{count}`")))
    }

    fn load_family(&self) -> StoreResult<Vec<R>> {
        let mut stmt = self.conn.prepare(
            "SELECT entity, body
             FROM records
             WHERE root = ?1
             ORDER BY seq ASC;",
        )?;
        let mut rows = stmt.query([R::ENTITY])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            let entity: String = row.get("entity")?;
            let body: String = row.get("body")?;
            let record = decode_body::<R>(&body)?;
            if record.entity() != entity {
                return Err(StoreError::InvalidData(format!(
                    "row entity `{entity}` does not match decoded entity `{}`",
                    record.entity()
                )));
            }
            records.push(record);
        }

        Ok(records)
    }
}

impl<R> StoreContext<R> for SqliteStore<'_, R>
where
    R: Record + Serialize + DeserializeOwned,
    R::Id: Serialize,
{
    fn fetch(&self, descriptor: &FetchDescriptor<R>) -> StoreResult<Vec<R>> {
        let family = self.load_family()?;
        Ok(descriptor.apply(family))
    }

    fn insert(&self, record: &R) -> StoreResult<()> {
        let record_id = encode_id::<R>(&record.id())?;
        let body = serde_json::to_string(record)
            .map_err(|err| StoreError::Serialization(err.to_string()))?;

        self.conn.execute(
            "INSERT INTO records (root, entity, record_id, body)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (root, record_id) DO UPDATE SET
                entity = excluded.entity,
                body = excluded.body,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![R::ENTITY, record.entity(), record_id, body],
        )?;
        Ok(())
    }

    fn delete(&self, record: &R) -> StoreResult<()> {
        let record_id = encode_id::<R>(&record.id())?;
        let changed = self.conn.execute(
            "DELETE FROM records WHERE root = ?1 AND record_id = ?2;",
            params![R::ENTITY, record_id],
        )?;
        if changed == 0 {
            debug!(
                "event=store_delete module=store status=not_found entity={}",
                R::ENTITY
            );
        }
        Ok(())
    }

    fn delete_all(
        &self,
        predicate: Option<&Predicate<R>>,
        include_subtypes: bool,
    ) -> StoreResult<()> {
        let Some(predicate) = predicate else {
            self.conn.execute(
                "DELETE FROM records
                 WHERE root = ?1
                   AND (?2 = 1 OR entity = ?1);",
                params![R::ENTITY, include_subtypes],
            )?;
            return Ok(());
        };

        let doomed = self
            .load_family()?
            .into_iter()
            .filter(|record| entity_in_scope(record.entity(), R::ENTITY, include_subtypes))
            .filter(|record| predicate.matches(record))
            .map(|record| encode_id::<R>(&record.id()))
            .collect::<StoreResult<Vec<String>>>()?;

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt =
                tx.prepare("DELETE FROM records WHERE root = ?1 AND record_id = ?2;")?;
            for record_id in &doomed {
                stmt.execute(params![R::ENTITY, record_id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn encode_id<R>(id: &R::Id) -> StoreResult<String>
where
    R: Record,
    R::Id: Serialize,
{
    serde_json::to_string(id).map_err(|err| StoreError::Serialization(err.to_string()))
}

fn decode_body<R: DeserializeOwned>(body: &str) -> StoreResult<R> {
    serde_json::from_str(body)
        .map_err(|err| StoreError::InvalidData(format!("undecodable record body: {err}")))
}
