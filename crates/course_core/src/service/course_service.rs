//! Course use-case service.
//!
//! # Responsibility
//! - Provide create/read/update/delete entry points for course callers.
//! - Assign audit timestamps and map store outcomes to service errors.
//! - Seed the default catalog on an empty store.
//!
//! # Invariants
//! - Create and update go straight to the store's conditional writes; there
//!   is no `exists` probe that another caller could invalidate.
//! - `created_date` is assigned once, on create. `last_modified_date` is
//!   cleared on create and refreshed on every update.
//! - `InvalidInput` is raised before any store round trip.

use crate::model::course::{
    Course, CourseCreateRequest, CourseId, CourseUpdateRequest, CourseValidationError,
};
use crate::service::clock::{Clock, SystemClock};
use crate::store::{CourseStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for course use-cases.
#[derive(Debug)]
pub enum CourseServiceError {
    /// Explicit id already in use.
    DuplicateId(CourseId),
    /// Target course does not exist.
    NotFound(CourseId),
    /// Input rejected before reaching the store.
    InvalidInput(CourseValidationError),
    /// Store failed; not retried here.
    StorageUnavailable(StoreError),
}

impl Display for CourseServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "course id already exists: {id}"),
            Self::NotFound(id) => write!(f, "course not found: {id}"),
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
        }
    }
}

impl Error for CourseServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::StorageUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for CourseServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(id) => Self::DuplicateId(id),
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::StorageUnavailable(other),
        }
    }
}

impl From<CourseValidationError> for CourseServiceError {
    fn from(value: CourseValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

pub type ServiceResult<T> = Result<T, CourseServiceError>;

/// Course service facade over a store implementation.
pub struct CourseService<S: CourseStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
}

impl<S: CourseStore> CourseService<S> {
    /// Creates a service stamping audit fields from the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: CourseStore, C: Clock> CourseService<S, C> {
    /// Creates a service with an explicit time source.
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates one course.
    ///
    /// # Contract
    /// - `explicit_id = true` with a non-empty `input.id`: inserts under that
    ///   id or fails with `DuplicateId`, writing nothing.
    /// - Otherwise the store assigns an id; this path cannot conflict.
    /// - The stored record has `created_date = now` and no
    ///   `last_modified_date`.
    pub fn create(&self, input: &Course, explicit_id: bool) -> ServiceResult<Course> {
        let requested_id = if explicit_id { input.assigned_id() } else { None };

        let mut record = input.clone();
        record.created_date = Some(self.clock.now());
        record.last_modified_date = None;

        match self.store.insert_if_absent(requested_id, &record) {
            Ok(created) => {
                debug_assert!(
                    created.audit_is_consistent(),
                    "store returned out-of-order audit dates for {}",
                    created.id
                );
                info!(
                    "event=course_create module=service status=ok id={} explicit_id={}",
                    created.id,
                    requested_id.is_some()
                );
                Ok(created)
            }
            Err(err) => Err(self.reject("course_create", requested_id.unwrap_or(""), err)),
        }
    }

    /// Creates one course from a request DTO; the store assigns the id.
    pub fn create_from_request(&self, request: CourseCreateRequest) -> ServiceResult<Course> {
        self.create(&Course::from(request), false)
    }

    /// Replaces an existing course and refreshes `last_modified_date`.
    ///
    /// The store keeps the original `created_date` regardless of what
    /// `input` carries.
    pub fn update(&self, input: &Course) -> ServiceResult<Course> {
        if let Err(err) = input.validate_for_update() {
            warn!("event=course_update module=service status=rejected reason=invalid_input");
            return Err(err.into());
        }

        let mut record = input.clone();
        record.last_modified_date = Some(self.clock.now());
        self.replace(record)
    }

    /// Replaces an existing course's mutable fields from a request DTO.
    ///
    /// Reads the current record first to carry its identity and
    /// `created_date`; the final replace re-checks existence atomically, so a
    /// delete in between surfaces as `NotFound` instead of reviving the row.
    pub fn update_from_request(&self, request: CourseUpdateRequest) -> ServiceResult<Course> {
        if request.id.is_empty() {
            warn!("event=course_update module=service status=rejected reason=invalid_input");
            return Err(CourseValidationError::EmptyId.into());
        }

        let existing = self
            .store
            .get(&request.id)
            .map_err(|err| self.reject("course_update", &request.id, err))?
            .ok_or_else(|| {
                info!(
                    "event=course_update module=service status=not_found id={}",
                    request.id
                );
                CourseServiceError::NotFound(request.id.clone())
            })?;

        let record = Course {
            id: existing.id,
            name: request.name,
            language: request.language,
            level: request.level,
            description: request.description,
            created_date: existing.created_date,
            last_modified_date: Some(self.clock.now()),
        };
        self.replace(record)
    }

    /// Returns every stored course.
    pub fn get_all(&self) -> ServiceResult<Vec<Course>> {
        Ok(self.store.list()?)
    }

    /// Returns one course, or `None` when absent.
    pub fn get_by_id(&self, id: &str) -> ServiceResult<Option<Course>> {
        Ok(self.store.get(id)?)
    }

    /// Deletes one course. Returns whether it existed; absent ids are not an
    /// error.
    pub fn delete(&self, id: &str) -> ServiceResult<bool> {
        let removed = self.store.delete_if_exists(id)?;
        info!(
            "event=course_delete module=service status=ok id={} removed={}",
            id, removed
        );
        Ok(removed)
    }

    /// Inserts `defaults` when the store is empty. Returns how many records
    /// were inserted.
    ///
    /// Intended to run once at process startup.
    pub fn bootstrap_seed(&self, defaults: &[Course]) -> ServiceResult<usize> {
        if self.store.count()? > 0 {
            info!("event=course_seed module=service status=skipped reason=not_empty");
            return Ok(0);
        }

        for course in defaults {
            self.create(course, true)?;
        }
        info!(
            "event=course_seed module=service status=ok inserted={}",
            defaults.len()
        );
        Ok(defaults.len())
    }

    fn replace(&self, record: Course) -> ServiceResult<Course> {
        match self.store.replace_if_exists(&record.id, &record) {
            Ok(updated) => {
                debug_assert!(
                    updated.audit_is_consistent(),
                    "store returned out-of-order audit dates for {}",
                    updated.id
                );
                info!(
                    "event=course_update module=service status=ok id={}",
                    updated.id
                );
                Ok(updated)
            }
            Err(err) => Err(self.reject("course_update", &record.id, err)),
        }
    }

    fn reject(&self, event: &str, id: &str, err: StoreError) -> CourseServiceError {
        if err.is_outcome() {
            info!("event={event} module=service status=rejected id={id} reason={err}");
        } else {
            warn!("event={event} module=service status=error id={id} error={err}");
        }
        err.into()
    }
}

/// Default catalog inserted by `bootstrap_seed` on an empty store.
pub fn default_catalog() -> Vec<Course> {
    vec![
        Course::new("English A1", "English", "A1", "Beginner English course"),
        Course::new("French B1", "French", "B1", "Intermediate French course"),
        Course::new("German A2", "German", "A2", "Basic German course"),
        Course::new(
            "Spanish B2",
            "Spanish",
            "B2",
            "Upper-intermediate Spanish course",
        ),
        Course::new("Italian C1", "Italian", "C1", "Advanced Italian course"),
    ]
}

#[cfg(test)]
mod tests {
    use super::{default_catalog, CourseService, CourseServiceError};
    use crate::model::course::{Course, CourseValidationError};
    use crate::store::MemoryCourseStore;

    #[test]
    fn update_with_empty_id_never_reaches_store() {
        let service = CourseService::new(MemoryCourseStore::new());
        let err = service
            .update(&Course::new("n", "l", "v", "d"))
            .unwrap_err();
        assert!(matches!(
            err,
            CourseServiceError::InvalidInput(CourseValidationError::EmptyId)
        ));
        assert_eq!(service.get_all().unwrap().len(), 0);
    }

    #[test]
    fn create_clears_caller_supplied_last_modified_date() {
        let service = CourseService::new(MemoryCourseStore::new());
        let mut input = Course::new("n", "l", "v", "d");
        input.last_modified_date = Some(chrono::Utc::now());

        let created = service.create(&input, false).unwrap();
        assert!(created.created_date.is_some());
        assert_eq!(created.last_modified_date, None);
    }

    #[test]
    fn explicit_id_flag_off_ignores_supplied_id() {
        let service = CourseService::new(MemoryCourseStore::new());
        let input = Course::with_id("chosen", "n", "l", "v", "d");

        let created = service.create(&input, false).unwrap();
        assert_ne!(created.id, "chosen");
        assert!(!created.id.is_empty());
    }

    #[test]
    fn default_catalog_has_five_distinct_courses() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 5);
        assert!(catalog.iter().all(|course| course.id.is_empty()));
    }
}
