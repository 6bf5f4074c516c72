//! Course domain model.
//!
//! # Responsibility
//! - Define the canonical course record and its wire shape.
//! - Define create/update request DTOs and their mapping to records.
//!
//! # Invariants
//! - An empty `id` means "not yet assigned"; stored records always carry one.
//! - `created_date` is set once at creation and never changes afterwards.
//! - `last_modified_date` is unset after creation and, once set, is
//!   `>= created_date`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque course identifier. Empty means unassigned.
pub type CourseId = String;

/// Validation failures detected before any store round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseValidationError {
    /// Update paths require the target id.
    EmptyId,
    /// Request body did not carry the required `name` field.
    MissingName,
}

impl Display for CourseValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "course id must not be empty"),
            Self::MissingName => write!(f, "course name is required"),
        }
    }
}

impl Error for CourseValidationError {}

/// Canonical course record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Primary key. Absent and `null` both decode to the empty string.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: CourseId,
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub description: String,
    /// Set by the service on successful creation.
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
    /// Set by the service on every successful update.
    #[serde(default)]
    pub last_modified_date: Option<DateTime<Utc>>,
}

impl Course {
    /// Creates an unassigned course with no audit timestamps.
    pub fn new(
        name: impl Into<String>,
        language: impl Into<String>,
        level: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: CourseId::new(),
            name: name.into(),
            language: language.into(),
            level: level.into(),
            description: description.into(),
            created_date: None,
            last_modified_date: None,
        }
    }

    /// Creates a course carrying a caller-chosen id.
    pub fn with_id(
        id: impl Into<CourseId>,
        name: impl Into<String>,
        language: impl Into<String>,
        level: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let mut course = Self::new(name, language, level, description);
        course.id = id.into();
        course
    }

    /// Returns the id when one has been assigned.
    pub fn assigned_id(&self) -> Option<&str> {
        if self.id.is_empty() {
            None
        } else {
            Some(self.id.as_str())
        }
    }

    /// Checks the preconditions of the update path.
    pub fn validate_for_update(&self) -> Result<(), CourseValidationError> {
        if self.id.is_empty() {
            return Err(CourseValidationError::EmptyId);
        }
        Ok(())
    }

    /// Returns whether the audit pair is ordered (`last_modified >= created`).
    pub fn audit_is_consistent(&self) -> bool {
        match (self.created_date, self.last_modified_date) {
            (Some(created), Some(modified)) => modified >= created,
            (None, Some(_)) => false,
            _ => true,
        }
    }
}

/// Creation payload without identity or audit fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseCreateRequest {
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub description: String,
}

impl From<CourseCreateRequest> for Course {
    fn from(request: CourseCreateRequest) -> Self {
        Course::new(
            request.name,
            request.language,
            request.level,
            request.description,
        )
    }
}

/// Update payload addressing an existing course by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseUpdateRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: CourseId,
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub description: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::{Course, CourseCreateRequest, CourseValidationError};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn new_course_is_unassigned_without_audit_fields() {
        let course = Course::new("English A1", "English", "A1", "Beginner");
        assert_eq!(course.assigned_id(), None);
        assert_eq!(course.created_date, None);
        assert_eq!(course.last_modified_date, None);
    }

    #[test]
    fn validate_for_update_rejects_empty_id() {
        let course = Course::new("n", "l", "v", "d");
        assert_eq!(
            course.validate_for_update(),
            Err(CourseValidationError::EmptyId)
        );
        let course = Course::with_id("c-1", "n", "l", "v", "d");
        assert!(course.validate_for_update().is_ok());
    }

    #[test]
    fn audit_consistency_requires_ordered_timestamps() {
        let created = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();
        let mut course = Course::with_id("c-1", "n", "l", "v", "d");
        course.created_date = Some(created);
        assert!(course.audit_is_consistent());

        course.last_modified_date = Some(created);
        assert!(course.audit_is_consistent());

        course.last_modified_date = Some(created - Duration::seconds(1));
        assert!(!course.audit_is_consistent());
    }

    #[test]
    fn create_request_maps_to_unassigned_course() {
        let request = CourseCreateRequest {
            name: "German A2".to_string(),
            language: "German".to_string(),
            level: "A2".to_string(),
            description: "Basic German course".to_string(),
        };
        let course = Course::from(request);
        assert!(course.id.is_empty());
        assert_eq!(course.level, "A2");
    }
}
