//! Declarative course manifests
//!
//! A course is an ordered list of units, each an ordered list of references
//! to externally authored topic files. This crate parses a manifest into a
//! [`Course`], validates its structure, and flattens a valid course into the
//! ordered [`Sequence`] of lessons a rendering platform consumes.
//!
//! ```
//! use coursework::{parse, Validator};
//!
//! let course = parse(
//!     r#"
//! name = "Rust"
//! description = "Learn Rust"
//!
//! [[units]]
//! name = "Introduction"
//! topics = ["topics/first-project/topic.toml"]
//! "#,
//! )
//! .unwrap();
//!
//! let course = Validator::new().validate(course).unwrap();
//! let first = course.sequence().first().unwrap();
//! assert_eq!(first.topic.path(), "topics/first-project/topic.toml");
//! ```

pub mod domain;
pub use domain::{
    Bookmark, Config, Course, Diagnostic, DiagnosticKind, Diagnostics, Lesson, Position,
    ResolveError, Sequence, TopicRef, TopicResolver, Unit, ValidCourse, Validator,
};

/// Manifest files, topic files and project configuration on disk.
pub mod storage;
pub use storage::{
    load, load_all, parse, FsResolver, LoadError, ManifestError, ParseError, Project,
    ProjectError, SchemaError,
};
