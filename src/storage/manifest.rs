//! Manifest parsing
//!
//! A manifest is a TOML document:
//!
//! ```toml
//! name = "Rust Programming"
//! description = "An introduction to Rust"
//!
//! [[units]]
//! name = "Introduction"
//! topics = ["topics/first-project/topic.toml"]
//! ```
//!
//! Parsing checks the document's shape only. Cross-record rules (unique unit
//! names, topic path syntax, ...) are left to the
//! [`Validator`](crate::Validator).

use std::{
    fmt, fs, io,
    ops::Range,
    path::{Path, PathBuf},
};

use non_empty_string::NonEmptyString;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Deserialize;
use toml::{Spanned, Value};
use tracing::instrument;

use crate::domain::{Course, TopicRef, Unit};

/// Top-level fields, kept loosely typed so shape errors can be reported
/// against the field that caused them.
#[derive(Debug, Deserialize)]
struct RawManifest {
    name: Option<Spanned<Value>>,
    description: Option<Spanned<Value>>,
    units: Option<Value>,
}

/// Second pass over the same document, once `units` is known to be an array
/// of tables.
#[derive(Debug, Deserialize)]
struct RawUnits {
    #[serde(default)]
    units: Vec<Spanned<RawUnit>>,
}

#[derive(Debug, Deserialize)]
struct RawUnit {
    name: Option<Spanned<Value>>,
    topics: Option<Spanned<Value>>,
}

/// Parses manifest text into a [`Course`].
///
/// Names and the description must contain something other than whitespace.
///
/// # Errors
///
/// Returns [`ManifestError::Parse`] if the text is not valid TOML, and
/// [`ManifestError::Schema`] if a field is missing or has the wrong shape.
#[instrument(level = "debug", skip_all)]
pub fn parse(text: &str) -> Result<Course, ManifestError> {
    let raw: RawManifest = toml::from_str(text).map_err(|e| ParseError::from_toml(text, &e))?;

    let name = required_string(text, raw.name, "name".to_string(), None, None)?;
    let description =
        required_string(text, raw.description, "description".to_string(), None, None)?;

    match raw.units {
        None => {
            return Err(SchemaError::MissingField {
                field: "units".to_string(),
                unit: None,
                location: None,
            }
            .into());
        }
        Some(Value::Array(items)) => {
            if let Some((index, item)) = items.iter().enumerate().find(|(_, v)| !v.is_table()) {
                return Err(SchemaError::WrongType {
                    field: format!("units[{index}]"),
                    unit: Some(index),
                    expected: "a table",
                    found: item.type_str(),
                    location: None,
                }
                .into());
            }
        }
        Some(other) => {
            return Err(SchemaError::WrongType {
                field: "units".to_string(),
                unit: None,
                expected: "an array of tables",
                found: other.type_str(),
                location: None,
            }
            .into());
        }
    }

    let raw: RawUnits = toml::from_str(text).map_err(|e| ParseError::from_toml(text, &e))?;
    let units = raw
        .units
        .into_iter()
        .enumerate()
        .map(|(index, unit)| {
            let location = Location::from_span(text, &unit.span());
            unit.into_inner().into_unit(text, index, location)
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(units = units.len(), "parsed manifest");
    Ok(Course::new(name, description, units))
}

/// Reads and parses the manifest at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
#[instrument(level = "debug")]
pub fn load(path: &Path) -> Result<Course, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    parse(&text).map_err(|source| LoadError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads several manifests in parallel.
///
/// Each manifest is independent, so results are returned one per path, in
/// the order the paths were given.
pub fn load_all<P>(paths: &[P]) -> Vec<Result<Course, LoadError>>
where
    P: AsRef<Path> + Sync,
{
    paths.par_iter().map(|path| load(path.as_ref())).collect()
}

impl RawUnit {
    /// `table` is where the unit's table starts, for fields that are absent.
    fn into_unit(self, text: &str, index: usize, table: Location) -> Result<Unit, SchemaError> {
        let name = required_string(
            text,
            self.name,
            format!("units[{index}].name"),
            Some(index),
            Some(table),
        )?;

        let field = format!("units[{index}].topics");
        let topics = self.topics.ok_or_else(|| SchemaError::MissingField {
            field: field.clone(),
            unit: Some(index),
            location: Some(table),
        })?;
        let location = Location::from_span(text, &topics.span());

        let items = match topics.into_inner() {
            Value::Array(items) => items,
            other => {
                return Err(SchemaError::WrongType {
                    field,
                    unit: Some(index),
                    expected: "an array of strings",
                    found: other.type_str(),
                    location: Some(location),
                });
            }
        };

        let topics = items
            .into_iter()
            .enumerate()
            .map(|(topic, item)| match item {
                Value::String(path) => Ok(TopicRef::new(path)),
                other => Err(SchemaError::WrongType {
                    field: format!("{field}[{topic}]"),
                    unit: Some(index),
                    expected: "a string",
                    found: other.type_str(),
                    location: Some(location),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Unit::new(name, topics))
    }
}

fn required_string(
    text: &str,
    value: Option<Spanned<Value>>,
    field: String,
    unit: Option<usize>,
    table: Option<Location>,
) -> Result<NonEmptyString, SchemaError> {
    let Some(value) = value else {
        return Err(SchemaError::MissingField {
            field,
            unit,
            location: table,
        });
    };
    let location = Some(Location::from_span(text, &value.span()));

    match value.into_inner() {
        Value::String(s) if s.trim().is_empty() => Err(SchemaError::EmptyString {
            field,
            unit,
            location,
        }),
        Value::String(s) => NonEmptyString::new(s).map_err(|_| SchemaError::EmptyString {
            field,
            unit,
            location,
        }),
        other => Err(SchemaError::WrongType {
            field,
            unit,
            expected: "a string",
            found: other.type_str(),
            location,
        }),
    }
}

/// A 1-based line and column in manifest text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number in characters, starting at 1.
    pub column: usize,
}

impl Location {
    /// The location of byte `offset` in `text`.
    ///
    /// Offsets past the end of `text` are clamped to the end.
    #[must_use]
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let mut end = offset.min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let prefix = &text[..end];
        let line = prefix.matches('\n').count() + 1;
        let column = prefix.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        Self { line, column }
    }

    fn from_span(text: &str, span: &Range<usize>) -> Self {
        Self::from_offset(text, span.start)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

fn at(location: Option<&Location>) -> String {
    location.map_or_else(String::new, |location| format!(" ({location})"))
}

/// The manifest text is not valid TOML.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid manifest syntax{}: {message}", at(.location.as_ref()))]
pub struct ParseError {
    message: String,
    location: Option<Location>,
}

impl ParseError {
    fn from_toml(text: &str, error: &toml::de::Error) -> Self {
        Self {
            message: error.message().trim().to_string(),
            location: error
                .span()
                .map(|span| Location::from_span(text, &span)),
        }
    }

    /// Description of the syntax problem.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the problem is, when known.
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        self.location
    }
}

/// A manifest field is missing or has the wrong shape.
///
/// `field` is a path such as `units[2].topics[1]`; `unit` is the index of the
/// unit the field belongs to, if any.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A required field is absent.
    ///
    /// The location, if any, is that of the enclosing unit's table.
    #[error("missing required field '{field}'{}", at(.location.as_ref()))]
    MissingField {
        /// Path of the missing field.
        field: String,
        /// Index of the enclosing unit.
        unit: Option<usize>,
        /// Where the enclosing table is, when known.
        location: Option<Location>,
    },

    /// A field holds a value of the wrong type.
    #[error("field '{field}' must be {expected}, found {found}{}", at(.location.as_ref()))]
    WrongType {
        /// Path of the offending field.
        field: String,
        /// Index of the enclosing unit.
        unit: Option<usize>,
        /// The expected shape.
        expected: &'static str,
        /// The TOML type actually found.
        found: &'static str,
        /// Where the value is, when known.
        location: Option<Location>,
    },

    /// A string field is empty or only whitespace.
    #[error("field '{field}' must not be empty{}", at(.location.as_ref()))]
    EmptyString {
        /// Path of the offending field.
        field: String,
        /// Index of the enclosing unit.
        unit: Option<usize>,
        /// Where the value is, when known.
        location: Option<Location>,
    },
}

impl SchemaError {
    /// Path of the offending field.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field, .. }
            | Self::WrongType { field, .. }
            | Self::EmptyString { field, .. } => field,
        }
    }

    /// Index of the unit the field belongs to, if any.
    #[must_use]
    pub const fn unit(&self) -> Option<usize> {
        match self {
            Self::MissingField { unit, .. }
            | Self::WrongType { unit, .. }
            | Self::EmptyString { unit, .. } => *unit,
        }
    }

    /// Where the problem is in the text, when known.
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        match self {
            Self::MissingField { location, .. }
            | Self::WrongType { location, .. }
            | Self::EmptyString { location, .. } => *location,
        }
    }
}

/// Why manifest text could not be turned into a [`Course`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    /// The text is not valid TOML.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A field is missing or has the wrong shape.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Why a manifest file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No file exists at the path.
    #[error("manifest not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read manifest '{}': {source}", path.display())]
    Io {
        /// The manifest path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The file was read but is not a valid manifest.
    #[error("invalid manifest '{}': {source}", path.display())]
    Manifest {
        /// The manifest path.
        path: PathBuf,
        /// The underlying error.
        source: ManifestError,
    },
}
