//! Course store contract.
//!
//! # Responsibility
//! - Declare the atomic conditional operations the service relies on.
//! - Define store-level outcomes separately from storage faults.
//!
//! # Invariants
//! - Of N concurrent `insert_if_absent` calls for one explicit id, exactly
//!   one succeeds; the rest return `Conflict` and write nothing.
//! - `replace_if_exists` either observes the record and replaces it whole,
//!   or reports `NotFound` and writes nothing.

use crate::db::DbError;
use crate::model::course::{Course, CourseId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store outcome and fault taxonomy.
#[derive(Debug)]
pub enum StoreError {
    /// A record with this id already exists.
    Conflict(CourseId),
    /// No record with this id exists.
    NotFound(CourseId),
    /// The backing database failed or is unreachable.
    Db(DbError),
    /// A persisted row could not be decoded into a course.
    InvalidData(String),
}

impl StoreError {
    /// Returns whether this is an expected control-flow outcome.
    pub fn is_outcome(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::NotFound(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict(id) => write!(f, "course already exists: {id}"),
            Self::NotFound(id) => write!(f, "course not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted course data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
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

/// Keyed course collection with atomic conditional writes.
pub trait CourseStore {
    /// Inserts `course` under `id`, or under a freshly generated id when
    /// `id` is `None` or empty. Fails with `Conflict` if an explicit id is
    /// taken.
    fn insert_if_absent(&self, id: Option<&str>, course: &Course) -> StoreResult<Course>;
    /// Replaces the record at `id` if present, otherwise `NotFound`.
    fn replace_if_exists(&self, id: &str, course: &Course) -> StoreResult<Course>;
    /// Point lookup.
    fn get(&self, id: &str) -> StoreResult<Option<Course>>;
    /// Snapshot of all records; not a consistency barrier.
    fn list(&self) -> StoreResult<Vec<Course>>;
    /// Removes the record if present and reports whether it existed.
    fn delete_if_exists(&self, id: &str) -> StoreResult<bool>;
    /// Number of stored records.
    fn count(&self) -> StoreResult<u64>;
}

impl<S: CourseStore + ?Sized> CourseStore for &S {
    fn insert_if_absent(&self, id: Option<&str>, course: &Course) -> StoreResult<Course> {
        (**self).insert_if_absent(id, course)
    }

    fn replace_if_exists(&self, id: &str, course: &Course) -> StoreResult<Course> {
        (**self).replace_if_exists(id, course)
    }

    fn get(&self, id: &str) -> StoreResult<Option<Course>> {
        (**self).get(id)
    }

    fn list(&self) -> StoreResult<Vec<Course>> {
        (**self).list()
    }

    fn delete_if_exists(&self, id: &str) -> StoreResult<bool> {
        (**self).delete_if_exists(id)
    }

    fn count(&self) -> StoreResult<u64> {
        (**self).count()
    }
}
