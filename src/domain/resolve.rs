//! The capability used to check that topic references point at real files.
//!
//! Validation stays filesystem-agnostic: it only ever talks to a
//! [`TopicResolver`]. The filesystem-backed implementation lives in
//! [`crate::storage::FsResolver`]; tests and hosts can pass a closure instead.

use std::io;

use crate::domain::TopicRef;

/// Checks whether a well-formed topic reference resolves to an existing topic
/// file.
pub trait TopicResolver {
    /// Resolves `topic`, returning why it could not be resolved on failure.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if the topic file is missing, is not a
    /// regular file, or cannot be accessed.
    fn resolve(&self, topic: &TopicRef) -> Result<(), ResolveError>;
}

impl<F> TopicResolver for F
where
    F: Fn(&TopicRef) -> Result<(), ResolveError>,
{
    fn resolve(&self, topic: &TopicRef) -> Result<(), ResolveError> {
        self(topic)
    }
}

/// A resolver that can never be constructed.
///
/// This is the resolver type of a syntax-only [`Validator`](crate::Validator).
#[derive(Debug, Clone, Copy)]
pub enum NoResolver {}

impl TopicResolver for NoResolver {
    #[allow(clippy::uninhabited_references)]
    fn resolve(&self, _topic: &TopicRef) -> Result<(), ResolveError> {
        match *self {}
    }
}

/// Why a topic reference failed to resolve.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Nothing exists at the referenced path.
    #[error("no such file")]
    NotFound,

    /// Something exists at the referenced path, but it is not a regular file.
    #[error("not a regular file")]
    NotAFile,

    /// The referenced path could not be accessed.
    #[error(transparent)]
    Io(#[from] io::Error),
}
