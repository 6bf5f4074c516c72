//! Core use-case services.
//!
//! # Responsibility
//! - Turn store outcomes into domain-level results.
//! - Own audit timestamp assignment.
//!
//! # Invariants
//! - Services never perform a separate existence check before a write.
//! - Services stay transport-agnostic.

pub mod clock;
pub mod course_service;
