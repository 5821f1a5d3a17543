//! Store context contracts and bundled implementations.
//!
//! # Responsibility
//! - Define the handle through which the mirror reads and writes records.
//! - Provide an in-memory store and a SQLite-backed store.
//!
//! # Invariants
//! - Stores never mutate the mirror; they only answer context calls.
//! - `insert` is an upsert by identity.
//! - `delete` of an unknown identity is not an error.

pub mod memory;
pub mod query;
pub mod sqlite;

use crate::db::DbError;
use crate::model::record::Record;
use query::{FetchDescriptor, Predicate};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by a store context operation.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialization(String),
    InvalidData(String),
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(message) => write!(f, "record serialization failed: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(_) | Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Live session with a persistence store.
///
/// The mirror borrows a context for as long as it stays bound. Methods take
/// `&self`; implementations with interior state are expected to be used from
/// a single thread, the same one driving the mirror.
pub trait StoreContext<R: Record> {
    /// Returns records matching `descriptor`, in store order.
    fn fetch(&self, descriptor: &FetchDescriptor<R>) -> StoreResult<Vec<R>>;

    /// Persists `record`, replacing any stored record with the same identity.
    fn insert(&self, record: &R) -> StoreResult<()>;

    /// Deletes the stored record sharing `record`'s identity.
    fn delete(&self, record: &R) -> StoreResult<()>;

    /// Deletes every record of `R::ENTITY` matching `predicate`.
    ///
    /// `None` matches all. Subtype entities are included only when
    /// `include_subtypes` is set.
    fn delete_all(&self, predicate: Option<&Predicate<R>>, include_subtypes: bool)
        -> StoreResult<()>;
}

impl<R: Record, S: StoreContext<R> + ?Sized> StoreContext<R> for &S {
    fn fetch(&self, descriptor: &FetchDescriptor<R>) -> StoreResult<Vec<R>> {
        (**self).fetch(descriptor)
    }

    fn insert(&self, record: &R) -> StoreResult<()> {
        (**self).insert(record)
    }

    fn delete(&self, record: &R) -> StoreResult<()> {
        (**self).delete(record)
    }

    fn delete_all(
        &self,
        predicate: Option<&Predicate<R>>,
        include_subtypes: bool,
    ) -> StoreResult<()> {
        (**self).delete_all(predicate, include_subtypes)
    }
}

impl<R: Record, S: StoreContext<R> + ?Sized> StoreContext<R> for Rc<S> {
    fn fetch(&self, descriptor: &FetchDescriptor<R>) -> StoreResult<Vec<R>> {
        (**self).fetch(descriptor)
    }

    fn insert(&self, record: &R) -> StoreResult<()> {
        (**self).insert(record)
    }

    fn delete(&self, record: &R) -> StoreResult<()> {
        (**self).delete(record)
    }

    fn delete_all(
        &self,
        predicate: Option<&Predicate<R>>,
        include_subtypes: bool,
    ) -> StoreResult<()> {
        (**self).delete_all(predicate, include_subtypes)
    }
}

impl<R: Record, S: StoreContext<R> + ?Sized> StoreContext<R> for Arc<S> {
    fn fetch(&self, descriptor: &FetchDescriptor<R>) -> StoreResult<Vec<R>> {
        (**self).fetch(descriptor)
    }

    fn insert(&self, record: &R) -> StoreResult<()> {
        (**self).insert(record)
    }

    fn delete(&self, record: &R) -> StoreResult<()> {
        (**self).delete(record)
    }

    fn delete_all(
        &self,
        predicate: Option<&Predicate<R>>,
        include_subtypes: bool,
    ) -> StoreResult<()> {
        (**self).delete_all(predicate, include_subtypes)
    }
}
