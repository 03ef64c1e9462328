use std::{fmt, path::Path, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

/// Shape every topic reference must have: `topics/<slug>/topic.toml`.
static TOPIC_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^topics/([^/]+)/topic\.toml$").expect("topic path pattern is a valid regex")
});

/// A reference to an externally authored topic file.
///
/// The reference is opaque: this crate never reads the topic file's contents.
/// A freshly parsed reference may be malformed; only a validated course
/// guarantees every reference matches `topics/<slug>/topic.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TopicRef {
    path: String,
}

impl TopicRef {
    /// Creates a reference from a raw manifest string.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The path exactly as written in the manifest.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The path as a relative filesystem path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.path)
    }

    /// Whether the path matches `topics/<slug>/topic.toml`.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        TOPIC_PATH.is_match(&self.path)
    }

    /// The `<slug>` component, if the path is well-formed.
    ///
    /// ```
    /// use coursework::TopicRef;
    ///
    /// let topic = TopicRef::new("topics/first-project/topic.toml");
    /// assert_eq!(topic.slug(), Some("first-project"));
    ///
    /// assert_eq!(TopicRef::new("first-project.toml").slug(), None);
    /// ```
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        TOPIC_PATH
            .captures(&self.path)
            .and_then(|captures| captures.get(1))
            .map(|slug| slug.as_str())
    }
}

impl From<&str> for TopicRef {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for TopicRef {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl AsRef<str> for TopicRef {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for TopicRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("topics/first-project/topic.toml", Some("first-project"); "simple slug")]
    #[test_case("topics/interior-mutability/topic.toml", Some("interior-mutability"); "dashed slug")]
    #[test_case("topics/a/topic.toml", Some("a"); "single character slug")]
    #[test_case("topics/with space/topic.toml", Some("with space"); "slug with whitespace")]
    #[test_case("topics/v1.2/topic.toml", Some("v1.2"); "slug with dots")]
    fn well_formed_paths(path: &str, slug: Option<&str>) {
        let topic = TopicRef::new(path);
        assert!(topic.is_well_formed());
        assert_eq!(topic.slug(), slug);
    }

    #[test_case(""; "empty")]
    #[test_case("topics//topic.toml"; "empty slug")]
    #[test_case("topics/a/b/topic.toml"; "nested slug")]
    #[test_case("topic/first-project/topic.toml"; "wrong prefix")]
    #[test_case("topics/first-project/topic.yaml"; "wrong extension")]
    #[test_case("topics/first-project/topicXtoml"; "dot is literal")]
    #[test_case("./topics/first-project/topic.toml"; "leading dot segment")]
    #[test_case("/topics/first-project/topic.toml"; "absolute")]
    #[test_case("topics/first-project/topic.toml "; "trailing whitespace")]
    fn malformed_paths(path: &str) {
        let topic = TopicRef::new(path);
        assert!(!topic.is_well_formed());
        assert_eq!(topic.slug(), None);
    }

    #[test]
    fn display_is_raw_path() {
        let topic = TopicRef::from("topics/closures/topic.toml");
        assert_eq!(topic.to_string(), "topics/closures/topic.toml");
        assert_eq!(topic.as_path(), Path::new("topics/closures/topic.toml"));
    }
}
