//! Transport-facing course API.
//!
//! # Responsibility
//! - Expose one handler per course endpoint over any `CourseStore`.
//! - Decode request bodies and map service outcomes to status codes.
//!
//! # Invariants
//! - Handlers never panic; every outcome becomes an `ApiResponse`.
//! - Malformed bodies are rejected as 400 before reaching the service.
//! - Error bodies always carry `error` (stable kind) and `message`.

use course_core::{
    core_version, Clock, Course, CourseCreateRequest, CourseService, CourseServiceError,
    CourseStore, CourseUpdateRequest, CourseValidationError,
};
use log::error;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Status code plus JSON body, ready for any transport to write out.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn json(status: u16, payload: &impl Serialize) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self { status, body },
            Err(err) => Self::error(STATUS_INTERNAL_ERROR, "serialization", err.to_string()),
        }
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            body: Value::Null,
        }
    }

    fn error(status: u16, kind: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": kind, "message": message.into() }),
        }
    }

    /// Returns whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<CourseServiceError> for ApiResponse {
    fn from(err: CourseServiceError) -> Self {
        let message = err.to_string();
        match err {
            CourseServiceError::DuplicateId(_) => {
                Self::error(STATUS_CONFLICT, "duplicate_id", message)
            }
            CourseServiceError::NotFound(_) => Self::error(STATUS_NOT_FOUND, "not_found", message),
            CourseServiceError::InvalidInput(_) => {
                Self::error(STATUS_BAD_REQUEST, "invalid_input", message)
            }
            CourseServiceError::StorageUnavailable(_) => {
                error!("event=api_error module=api status=error error={message}");
                Self::error(STATUS_INTERNAL_ERROR, "storage_unavailable", message)
            }
        }
    }
}

/// Liveness probe.
pub fn health() -> ApiResponse {
    ApiResponse::json(
        STATUS_OK,
        &json!({ "status": "ok", "version": core_version() }),
    )
}

/// `GET /courses`
pub fn list_courses<S: CourseStore, C: Clock>(service: &CourseService<S, C>) -> ApiResponse {
    respond(STATUS_OK, service.get_all())
}

/// `GET /courses/{id}`
pub fn get_course<S: CourseStore, C: Clock>(
    service: &CourseService<S, C>,
    id: &str,
) -> ApiResponse {
    match service.get_by_id(id) {
        Ok(Some(course)) => ApiResponse::json(STATUS_OK, &course),
        Ok(None) => ApiResponse::from(CourseServiceError::NotFound(id.to_string())),
        Err(err) => err.into(),
    }
}

/// `POST /courses`; the body's non-empty `id` makes the create explicit.
pub fn create_course<S: CourseStore, C: Clock>(
    service: &CourseService<S, C>,
    body: &str,
) -> ApiResponse {
    let course: Course = match decode(body) {
        Ok(course) => course,
        Err(response) => return response,
    };
    let explicit_id = course.assigned_id().is_some();
    respond(STATUS_CREATED, service.create(&course, explicit_id))
}

/// `PUT /courses`
pub fn update_course<S: CourseStore, C: Clock>(
    service: &CourseService<S, C>,
    body: &str,
) -> ApiResponse {
    match decode::<Course>(body) {
        Ok(course) => respond(STATUS_OK, service.update(&course)),
        Err(response) => response,
    }
}

/// `DELETE /courses/{id}`; absent ids also succeed.
pub fn delete_course<S: CourseStore, C: Clock>(
    service: &CourseService<S, C>,
    id: &str,
) -> ApiResponse {
    match service.delete(id) {
        Ok(_) => ApiResponse::empty(STATUS_NO_CONTENT),
        Err(err) => err.into(),
    }
}

/// `POST /courses/dto`
pub fn create_course_from_request<S: CourseStore, C: Clock>(
    service: &CourseService<S, C>,
    body: &str,
) -> ApiResponse {
    match decode::<CourseCreateRequest>(body) {
        Ok(request) => respond(STATUS_CREATED, service.create_from_request(request)),
        Err(response) => response,
    }
}

/// `PUT /courses/dto`
pub fn update_course_from_request<S: CourseStore, C: Clock>(
    service: &CourseService<S, C>,
    body: &str,
) -> ApiResponse {
    match decode::<CourseUpdateRequest>(body) {
        Ok(request) => respond(STATUS_OK, service.update_from_request(request)),
        Err(response) => response,
    }
}

fn respond<T: Serialize>(status: u16, result: Result<T, CourseServiceError>) -> ApiResponse {
    match result {
        Ok(payload) => ApiResponse::json(status, &payload),
        Err(err) => err.into(),
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiResponse> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| ApiResponse::error(STATUS_BAD_REQUEST, "malformed_body", err.to_string()))?;

    let has_name = value
        .get("name")
        .is_some_and(|name| !name.is_null());
    if value.is_object() && !has_name {
        return Err(CourseServiceError::InvalidInput(CourseValidationError::MissingName).into());
    }

    serde_json::from_value(value)
        .map_err(|err| ApiResponse::error(STATUS_BAD_REQUEST, "malformed_body", err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{decode, health, ApiResponse, STATUS_BAD_REQUEST, STATUS_OK};
    use course_core::Course;

    #[test]
    fn health_reports_version() {
        let response = health();
        assert_eq!(response.status, STATUS_OK);
        assert_eq!(response.body["status"], "ok");
        assert!(!response.body["version"].as_str().unwrap().is_empty());
    }

    #[test]
    fn decode_distinguishes_missing_name_from_malformed_json() {
        let missing: ApiResponse = decode::<Course>(r#"{"level":"A1"}"#).unwrap_err();
        assert_eq!(missing.status, STATUS_BAD_REQUEST);
        assert_eq!(missing.body["error"], "invalid_input");

        let null_name = decode::<Course>(r#"{"name":null}"#).unwrap_err();
        assert_eq!(null_name.body["error"], "invalid_input");

        let malformed = decode::<Course>("{not json").unwrap_err();
        assert_eq!(malformed.status, STATUS_BAD_REQUEST);
        assert_eq!(malformed.body["error"], "malformed_body");
    }
}
