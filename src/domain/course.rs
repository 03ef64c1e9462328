use non_empty_string::NonEmptyString;
use serde::Serialize;

use crate::domain::TopicRef;

/// A course: a named, ordered sequence of units.
///
/// A `Course` is built once per manifest load and never mutated afterwards;
/// reloading a manifest produces a new value. A parsed course may still break
/// structural rules (no units, duplicate unit names, ...). Run it through a
/// [`Validator`](crate::Validator) to obtain a
/// [`ValidCourse`](crate::ValidCourse).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    name: NonEmptyString,
    description: NonEmptyString,
    units: Vec<Unit>,
}

impl Course {
    /// Creates a course from its parts.
    #[must_use]
    pub const fn new(name: NonEmptyString, description: NonEmptyString, units: Vec<Unit>) -> Self {
        Self {
            name,
            description,
            units,
        }
    }

    /// The course name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The course description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// The units, in declaration order.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// The unit at `index`, if any.
    #[must_use]
    pub fn unit(&self, index: usize) -> Option<&Unit> {
        self.units.get(index)
    }

    /// Total number of topic references across all units.
    ///
    /// Repeated references are counted once per occurrence.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.units.iter().map(|unit| unit.topics.len()).sum()
    }
}

/// A named, ordered group of topic references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    name: NonEmptyString,
    topics: Vec<TopicRef>,
}

impl Unit {
    /// Creates a unit from its parts.
    #[must_use]
    pub const fn new(name: NonEmptyString, topics: Vec<TopicRef>) -> Self {
        Self { name, topics }
    }

    /// The unit name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The topic references, in declaration order.
    #[must_use]
    pub fn topics(&self) -> &[TopicRef] {
        &self.topics
    }

    /// A lowercase, dash-separated slug of the unit name.
    ///
    /// Alphanumeric characters are kept; every other run of characters
    /// collapses to a single dash. Hosts use this to name per-unit outputs.
    ///
    /// ```
    /// use coursework::{TopicRef, Unit};
    /// use non_empty_string::NonEmptyString;
    ///
    /// let name = NonEmptyString::new("Advanced Syntax & Traits".to_string()).unwrap();
    /// let unit = Unit::new(name, vec![TopicRef::new("topics/traits/topic.toml")]);
    /// assert_eq!(unit.tag(), "advanced-syntax-traits");
    /// ```
    #[must_use]
    pub fn tag(&self) -> String {
        let mut tag = String::with_capacity(self.name.as_str().len());
        for c in self.name.as_str().chars() {
            if c.is_alphanumeric() {
                tag.extend(c.to_lowercase());
            } else if !tag.is_empty() && !tag.ends_with('-') {
                tag.push('-');
            }
        }
        if tag.ends_with('-') {
            tag.pop();
        }
        tag
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn unit(name: &str, topics: &[&str]) -> Unit {
        Unit::new(
            NonEmptyString::new(name.to_string()).unwrap(),
            topics.iter().copied().map(TopicRef::from).collect(),
        )
    }

    #[test]
    fn topic_count_sums_every_occurrence() {
        let course = Course::new(
            NonEmptyString::new("Rust".to_string()).unwrap(),
            NonEmptyString::new("A course".to_string()).unwrap(),
            vec![
                unit("One", &["topics/a/topic.toml", "topics/b/topic.toml"]),
                unit("Two", &["topics/a/topic.toml"]),
            ],
        );

        assert_eq!(course.topic_count(), 3);
        assert_eq!(course.unit(1).map(Unit::name), Some("Two"));
        assert!(course.unit(2).is_none());
    }

    #[test_case("Introduction", "introduction"; "single word")]
    #[test_case("Interior mutability", "interior-mutability"; "two words")]
    #[test_case("  Leading and trailing!  ", "leading-and-trailing"; "trimmed")]
    #[test_case("Traits -- & generics", "traits-generics"; "collapsed separators")]
    #[test_case("Async/Await 101", "async-await-101"; "digits kept")]
    #[test_case("???", ""; "no alphanumerics")]
    fn unit_tags(name: &str, expected: &str) {
        assert_eq!(unit(name, &[]).tag(), expected);
    }
}
