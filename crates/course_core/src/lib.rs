//! Core domain logic for the course catalog.
//! This crate is the single source of truth for identity and audit invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{ConfigError, CourseConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::course::{
    Course, CourseCreateRequest, CourseId, CourseUpdateRequest, CourseValidationError,
};
pub use service::clock::{Clock, SystemClock};
pub use service::course_service::{
    default_catalog, CourseService, CourseServiceError, ServiceResult,
};
pub use store::{CourseStore, MemoryCourseStore, SqliteCourseStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
