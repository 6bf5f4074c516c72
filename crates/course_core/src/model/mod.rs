//! Course catalog domain model.
//!
//! # Responsibility
//! - Define the canonical course record persisted by every store adapter.
//! - Define the request shapes accepted by create/update use-cases.
//!
//! # Invariants
//! - Every stored course is identified by a non-empty `CourseId`.
//! - Audit timestamps are owned by the service layer, never by callers.

pub mod course;
