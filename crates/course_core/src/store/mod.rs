//! Course storage contracts and adapters.
//!
//! # Responsibility
//! - Define the conditional-write contract (`CourseStore`) the service
//!   builds on.
//! - Provide an in-memory sharded adapter and a SQLite adapter.
//!
//! # Invariants
//! - `insert_if_absent`, `replace_if_exists` and `delete_if_exists` check
//!   and write in one indivisible step per id.
//! - `Conflict` and `NotFound` are expected outcomes, not faults; only
//!   `Db`/`InvalidData` signal an unusable store.
//! - A replacement never moves `created_date` and never lowers
//!   `last_modified_date`.

pub mod course_store;
pub mod memory;
pub mod sqlite;

pub use course_store::{CourseStore, StoreError, StoreResult};
pub use memory::MemoryCourseStore;
pub use sqlite::SqliteCourseStore;

use crate::model::course::Course;
use uuid::Uuid;

/// Upper bound on regenerating a colliding generated id.
pub(crate) const GENERATED_ID_ATTEMPTS: usize = 8;

pub(crate) fn generate_course_id() -> String {
    Uuid::new_v4().to_string()
}

/// Applies the audit guard of a replacement against the stored record.
///
/// The stored `created_date` always wins. When the replacement carries a
/// `last_modified_date`, the effective value is clamped to be no earlier
/// than the stored one or `created_date`; otherwise the stored value stays.
pub(crate) fn guard_replacement(existing: &Course, mut replacement: Course) -> Course {
    replacement.id = existing.id.clone();
    replacement.created_date = existing.created_date;
    replacement.last_modified_date = [
        replacement.last_modified_date,
        existing.last_modified_date,
        existing.created_date.filter(|_| replacement.last_modified_date.is_some()),
    ]
    .into_iter()
    .flatten()
    .max();
    replacement
}
