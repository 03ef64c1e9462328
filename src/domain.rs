//! Domain models for course manifests.
//!
//! This module contains the value types describing a course, the structural
//! validation applied to them, and the flattened lesson sequence handed to a
//! rendering platform.

/// Course and unit value types.
pub mod course;
pub use course::{Course, Unit};

mod config;
pub use config::Config;

/// Topic-existence checks used during validation.
pub mod resolve;
pub use resolve::{NoResolver, ResolveError, TopicResolver};

pub mod sequence;
pub use sequence::{Bookmark, Lesson, Lessons, Sequence};

/// Topic references.
pub mod topic;
pub use topic::TopicRef;

pub mod validation;
pub use validation::{
    Diagnostic, DiagnosticKind, Diagnostics, Position, ValidCourse, Validator,
};
