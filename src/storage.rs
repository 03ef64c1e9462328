/// Manifest parsing and loading.
pub mod manifest;
mod project;
mod resolver;

pub use manifest::{
    load, load_all, parse, LoadError, Location, ManifestError, ParseError, SchemaError,
};
pub use project::{Project, ProjectError};
pub use resolver::FsResolver;
