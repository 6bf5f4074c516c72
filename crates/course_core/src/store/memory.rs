//! In-memory course store.
//!
//! # Responsibility
//! - Provide a process-local `CourseStore` for tests and ephemeral runs.
//!
//! # Invariants
//! - Conditional writes hold the shard lock of their key across the check
//!   and the write, so operations on one id are indivisible.
//! - Distinct ids only contend when they hash to the same shard; there is
//!   no collection-wide lock.
//! - `list` returns records in insertion order.

use super::course_store::{CourseStore, StoreError, StoreResult};
use super::{generate_course_id, guard_replacement, GENERATED_ID_ATTEMPTS};
use crate::model::course::{Course, CourseId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
struct StoredCourse {
    seq: u64,
    course: Course,
}

/// Sharded in-memory course collection.
#[derive(Debug, Default)]
pub struct MemoryCourseStore {
    courses: DashMap<CourseId, StoredCourse>,
    next_seq: AtomicU64,
}

impl MemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn try_insert(&self, id: &str, course: &Course) -> Option<Course> {
        match self.courses.entry(id.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let mut stored = course.clone();
                stored.id = id.to_string();
                slot.insert(StoredCourse {
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                    course: stored.clone(),
                });
                Some(stored)
            }
        }
    }
}

impl CourseStore for MemoryCourseStore {
    fn insert_if_absent(&self, id: Option<&str>, course: &Course) -> StoreResult<Course> {
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            return self
                .try_insert(id, course)
                .ok_or_else(|| StoreError::Conflict(id.to_string()));
        }

        for _ in 0..GENERATED_ID_ATTEMPTS {
            let generated = generate_course_id();
            if let Some(stored) = self.try_insert(&generated, course) {
                return Ok(stored);
            }
        }
        Err(StoreError::InvalidData(
            "could not allocate a unique course id".to_string(),
        ))
    }

    fn replace_if_exists(&self, id: &str, course: &Course) -> StoreResult<Course> {
        let Some(mut entry) = self.courses.get_mut(id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        let replacement = guard_replacement(&entry.course, course.clone());
        entry.course = replacement.clone();
        Ok(replacement)
    }

    fn get(&self, id: &str) -> StoreResult<Option<Course>> {
        Ok(self.courses.get(id).map(|entry| entry.course.clone()))
    }

    fn list(&self) -> StoreResult<Vec<Course>> {
        let mut snapshot: Vec<StoredCourse> = self
            .courses
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        snapshot.sort_by_key(|stored| stored.seq);
        Ok(snapshot.into_iter().map(|stored| stored.course).collect())
    }

    fn delete_if_exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.courses.remove(id).is_some())
    }

    fn count(&self) -> StoreResult<u64> {
        Ok(self.courses.len() as u64)
    }
}
