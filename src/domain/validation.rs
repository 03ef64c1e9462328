//! Structural validation of parsed courses.
//!
//! Validation is exhaustive: every violation is collected in a single pass so
//! that a manifest author can fix them all in one edit. Diagnostics are
//! reported in a fixed order (empty units, empty topics, duplicate unit names,
//! malformed paths, unresolved topics) to keep output stable between runs.
//!
//! The same topic path may appear in more than one unit. This is never
//! reported.

use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
    ops::Deref,
};

use nonempty::NonEmpty;
use serde::{Serialize, Serializer};
use tracing::instrument;

use crate::domain::{
    resolve::{NoResolver, TopicResolver},
    sequence::Sequence,
    Course,
};

/// Checks the structural rules of a [`Course`].
///
/// A `Validator` built with [`Validator::new`] only checks the manifest
/// itself. One built with [`Validator::with_resolver`] additionally asks the
/// resolver whether each well-formed topic path exists.
#[derive(Debug, Clone)]
pub struct Validator<R = NoResolver> {
    resolver: Option<R>,
}

impl Validator<NoResolver> {
    /// Creates a validator that performs no existence checks.
    #[must_use]
    pub const fn new() -> Self {
        Self { resolver: None }
    }
}

impl Default for Validator<NoResolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: TopicResolver> Validator<R> {
    /// Creates a validator that checks topic existence with `resolver`.
    #[must_use]
    pub const fn with_resolver(resolver: R) -> Self {
        Self {
            resolver: Some(resolver),
        }
    }

    /// Creates a validator that checks topic existence only if a resolver is
    /// given.
    #[must_use]
    pub const fn with_optional_resolver(resolver: Option<R>) -> Self {
        Self { resolver }
    }

    /// Validates `course`, consuming it.
    ///
    /// # Errors
    ///
    /// Returns every problem found if the course breaks any structural rule.
    #[instrument(level = "debug", skip_all, fields(course = course.name()))]
    pub fn validate(&self, course: Course) -> Result<ValidCourse, Diagnostics> {
        if let Some(diagnostics) = NonEmpty::from_vec(self.check(&course)) {
            tracing::warn!(count = diagnostics.len(), "course failed validation");
            return Err(Diagnostics(diagnostics));
        }

        tracing::debug!(units = course.units().len(), "course is valid");
        Ok(ValidCourse(course))
    }

    /// Collects every diagnostic for `course` without consuming it.
    ///
    /// An empty result means the course is valid.
    #[must_use]
    pub fn check(&self, course: &Course) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if course.units().is_empty() {
            diagnostics.push(Diagnostic::EmptyUnits);
        }
        check_empty_topics(course, &mut diagnostics);
        check_duplicate_unit_names(course, &mut diagnostics);
        check_malformed_paths(course, &mut diagnostics);
        if let Some(resolver) = &self.resolver {
            check_unresolved_topics(resolver, course, &mut diagnostics);
        }

        diagnostics
    }
}

fn check_empty_topics(course: &Course, diagnostics: &mut Vec<Diagnostic>) {
    for (unit, u) in course.units().iter().enumerate() {
        if u.topics().is_empty() {
            diagnostics.push(Diagnostic::EmptyTopics {
                unit,
                name: u.name().to_string(),
            });
        }
    }
}

fn check_duplicate_unit_names(course: &Course, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (unit, u) in course.units().iter().enumerate() {
        match seen.entry(u.name()) {
            Entry::Vacant(entry) => {
                entry.insert(unit);
            }
            Entry::Occupied(entry) => diagnostics.push(Diagnostic::DuplicateUnitName {
                unit,
                first: *entry.get(),
                name: u.name().to_string(),
            }),
        }
    }
}

fn check_malformed_paths(course: &Course, diagnostics: &mut Vec<Diagnostic>) {
    for (unit, u) in course.units().iter().enumerate() {
        for (topic, t) in u.topics().iter().enumerate() {
            if !t.is_well_formed() {
                diagnostics.push(Diagnostic::MalformedPath {
                    unit,
                    topic,
                    path: t.path().to_string(),
                });
            }
        }
    }
}

fn check_unresolved_topics<R: TopicResolver>(
    resolver: &R,
    course: &Course,
    diagnostics: &mut Vec<Diagnostic>,
) {
    // Repeated references are resolved once and reported at every occurrence.
    let mut cache: HashMap<&str, Result<(), String>> = HashMap::new();

    for (unit, u) in course.units().iter().enumerate() {
        for (topic, t) in u.topics().iter().enumerate() {
            if !t.is_well_formed() {
                continue;
            }

            let outcome = cache.entry(t.path()).or_insert_with(|| {
                resolver.resolve(t).map_err(|e| {
                    tracing::debug!(path = t.path(), "topic did not resolve: {e}");
                    e.to_string()
                })
            });

            if let Err(reason) = outcome {
                diagnostics.push(Diagnostic::UnresolvedTopic {
                    unit,
                    topic,
                    path: t.path().to_string(),
                    reason: reason.clone(),
                });
            }
        }
    }
}

/// A single structural problem found in a course.
///
/// Unit and topic indices are zero-based positions in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The course declares no units.
    #[error("the course declares no units")]
    EmptyUnits,

    /// A unit declares no topics.
    #[error("unit {unit} ('{name}') declares no topics")]
    EmptyTopics {
        /// Index of the offending unit.
        unit: usize,
        /// Name of the offending unit.
        name: String,
    },

    /// A unit reuses the name of an earlier unit.
    #[error("unit {unit} reuses the name '{name}' of unit {first}")]
    DuplicateUnitName {
        /// Index of the offending unit.
        unit: usize,
        /// Index of the earlier unit with the same name.
        first: usize,
        /// The colliding name.
        name: String,
    },

    /// A topic path does not match `topics/<slug>/topic.toml`.
    #[error("unit {unit}, topic {topic}: '{path}' does not match 'topics/<slug>/topic.toml'")]
    MalformedPath {
        /// Index of the unit containing the topic.
        unit: usize,
        /// Index of the topic within its unit.
        topic: usize,
        /// The offending path.
        path: String,
    },

    /// A well-formed topic path does not resolve to a topic file.
    #[error("unit {unit}, topic {topic}: '{path}' cannot be resolved: {reason}")]
    UnresolvedTopic {
        /// Index of the unit containing the topic.
        unit: usize,
        /// Index of the topic within its unit.
        topic: usize,
        /// The unresolved path.
        path: String,
        /// Why the path did not resolve.
        reason: String,
    },
}

impl Diagnostic {
    /// The kind of problem.
    #[must_use]
    pub const fn kind(&self) -> DiagnosticKind {
        match self {
            Self::EmptyUnits => DiagnosticKind::EmptyUnits,
            Self::EmptyTopics { .. } => DiagnosticKind::EmptyTopics,
            Self::DuplicateUnitName { .. } => DiagnosticKind::DuplicateUnitName,
            Self::MalformedPath { .. } => DiagnosticKind::MalformedPath,
            Self::UnresolvedTopic { .. } => DiagnosticKind::UnresolvedTopic,
        }
    }

    /// Where in the course the problem is.
    #[must_use]
    pub const fn position(&self) -> Position {
        match *self {
            Self::EmptyUnits => Position {
                unit: None,
                topic: None,
            },
            Self::EmptyTopics { unit, .. } | Self::DuplicateUnitName { unit, .. } => Position {
                unit: Some(unit),
                topic: None,
            },
            Self::MalformedPath { unit, topic, .. } | Self::UnresolvedTopic { unit, topic, .. } => {
                Position {
                    unit: Some(unit),
                    topic: Some(topic),
                }
            }
        }
    }
}

/// The kinds of [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// See [`Diagnostic::EmptyUnits`].
    EmptyUnits,
    /// See [`Diagnostic::EmptyTopics`].
    EmptyTopics,
    /// See [`Diagnostic::DuplicateUnitName`].
    DuplicateUnitName,
    /// See [`Diagnostic::MalformedPath`].
    MalformedPath,
    /// See [`Diagnostic::UnresolvedTopic`].
    UnresolvedTopic,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::EmptyUnits => "empty units",
            Self::EmptyTopics => "empty topics",
            Self::DuplicateUnitName => "duplicate unit name",
            Self::MalformedPath => "malformed path",
            Self::UnresolvedTopic => "unresolved topic",
        })
    }
}

/// The position of the entity a [`Diagnostic`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    /// Index of the unit, if the problem concerns a unit or one of its topics.
    pub unit: Option<usize>,
    /// Index of the topic within its unit, if the problem concerns a topic.
    pub topic: Option<usize>,
}

/// The non-empty, ordered batch of problems that made a course invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("course failed validation with {} problem(s)", .0.len())]
pub struct Diagnostics(NonEmpty<Diagnostic>);

impl Diagnostics {
    /// Number of problems; always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The first problem reported.
    #[must_use]
    pub const fn first(&self) -> &Diagnostic {
        self.0.first()
    }

    /// Iterates the problems in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Consumes the batch, returning the problems in report order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0.into()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl Serialize for Diagnostics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// A course that passed validation.
///
/// Only a [`Validator`] can produce one. It dereferences to the underlying
/// [`Course`] and is the only input a [`Sequence`] accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidCourse(Course);

impl ValidCourse {
    /// The flattened, ordered lesson sequence of this course.
    #[must_use]
    pub fn sequence(&self) -> Sequence<'_> {
        Sequence::new(self)
    }

    /// Unwraps the validated course.
    #[must_use]
    pub fn into_inner(self) -> Course {
        self.0
    }
}

impl Deref for ValidCourse {
    type Target = Course;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Course> for ValidCourse {
    fn as_ref(&self) -> &Course {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use non_empty_string::NonEmptyString;

    use super::*;
    use crate::domain::{resolve::ResolveError, TopicRef, Unit};

    fn unit(name: &str, topics: &[&str]) -> Unit {
        Unit::new(
            NonEmptyString::new(name.to_string()).unwrap(),
            topics.iter().copied().map(TopicRef::from).collect(),
        )
    }

    fn course(units: Vec<Unit>) -> Course {
        Course::new(
            NonEmptyString::new("Rust".to_string()).unwrap(),
            NonEmptyString::new("Learn Rust".to_string()).unwrap(),
            units,
        )
    }

    #[test]
    fn valid_course_passes_unchanged() {
        let input = course(vec![
            unit("Basics", &["topics/first-project/topic.toml"]),
            unit("Ownership", &["topics/move-semantics/topic.toml"]),
        ]);

        let valid = Validator::new().validate(input.clone()).unwrap();
        assert_eq!(*valid, input);
        assert_eq!(valid.into_inner(), input);
    }

    #[test]
    fn no_units_is_reported() {
        let diagnostics = Validator::new().validate(course(vec![])).unwrap_err();
        assert_eq!(diagnostics.into_vec(), vec![Diagnostic::EmptyUnits]);
    }

    #[test]
    fn empty_topics_names_the_unit() {
        let diagnostics = Validator::new()
            .validate(course(vec![
                unit("Basics", &["topics/first-project/topic.toml"]),
                unit("Nothing yet", &[]),
            ]))
            .unwrap_err();

        assert_eq!(
            diagnostics.first(),
            &Diagnostic::EmptyTopics {
                unit: 1,
                name: "Nothing yet".to_string()
            }
        );
        assert_eq!(
            diagnostics.first().position(),
            Position {
                unit: Some(1),
                topic: None
            }
        );
    }

    #[test]
    fn duplicate_unit_names_point_at_first_occurrence() {
        let diagnostics = Validator::new()
            .validate(course(vec![
                unit("Interior mutability", &["topics/interior-mutability/topic.toml"]),
                unit("Concurrency", &["topics/multithreading/topic.toml"]),
                unit("Interior mutability", &["topics/interior-mutability/topic.toml"]),
            ]))
            .unwrap_err();

        assert_eq!(
            diagnostics.into_vec(),
            vec![Diagnostic::DuplicateUnitName {
                unit: 2,
                first: 0,
                name: "Interior mutability".to_string()
            }]
        );
    }

    #[test]
    fn unit_names_are_case_sensitive() {
        let result = Validator::new().validate(course(vec![
            unit("Traits", &["topics/traits/topic.toml"]),
            unit("traits", &["topics/generics/topic.toml"]),
        ]));
        assert!(result.is_ok());
    }

    #[test]
    fn repeated_topic_across_units_is_accepted() {
        let result = Validator::new().validate(course(vec![
            unit(
                "Advanced Syntax",
                &[
                    "topics/advanced-syntax/topic.toml",
                    "topics/interior-mutability/topic.toml",
                ],
            ),
            unit("Interior mutability", &["topics/interior-mutability/topic.toml"]),
        ]));
        assert!(result.is_ok());
    }

    #[test]
    fn every_problem_is_reported_in_order() {
        let diagnostics = Validator::new()
            .check(&course(vec![
                unit("Basics", &["topics/first-project/topic.toml", "first.toml"]),
                unit("Empty", &[]),
                unit("Basics", &["topics//topic.toml"]),
            ]));

        let kinds: Vec<_> = diagnostics.iter().map(Diagnostic::kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::EmptyTopics,
                DiagnosticKind::DuplicateUnitName,
                DiagnosticKind::MalformedPath,
                DiagnosticKind::MalformedPath,
            ]
        );
        assert_eq!(
            diagnostics[2].position(),
            Position {
                unit: Some(0),
                topic: Some(1)
            }
        );
        assert_eq!(
            diagnostics[3].position(),
            Position {
                unit: Some(2),
                topic: Some(0)
            }
        );
    }

    #[test]
    fn resolver_is_consulted_once_per_distinct_path() {
        let calls = Cell::new(0);
        let resolver = |topic: &TopicRef| {
            calls.set(calls.get() + 1);
            if topic.slug() == Some("missing") {
                Err(ResolveError::NotFound)
            } else {
                Ok(())
            }
        };

        let diagnostics = Validator::with_resolver(resolver).check(&course(vec![
            unit(
                "One",
                &["topics/missing/topic.toml", "topics/present/topic.toml"],
            ),
            unit("Two", &["topics/missing/topic.toml", "not-a-topic"]),
        ]));

        assert_eq!(calls.get(), 2);
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::MalformedPath {
                    unit: 1,
                    topic: 1,
                    path: "not-a-topic".to_string()
                },
                Diagnostic::UnresolvedTopic {
                    unit: 0,
                    topic: 0,
                    path: "topics/missing/topic.toml".to_string(),
                    reason: "no such file".to_string()
                },
                Diagnostic::UnresolvedTopic {
                    unit: 1,
                    topic: 0,
                    path: "topics/missing/topic.toml".to_string(),
                    reason: "no such file".to_string()
                },
            ]
        );
    }

    #[test]
    fn diagnostics_serialize_with_kind_tag() {
        let diagnostics = Validator::new().validate(course(vec![])).unwrap_err();
        let json = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(json, serde_json::json!([{ "kind": "empty_units" }]));
    }
}
