//! A course stored on disk
//!
//! A [`Project`] ties a course root directory to its [`Config`]: where the
//! manifest lives, where topic files are resolved from, and whether topic
//! existence is checked during validation. Each call to [`Project::load`]
//! reads the manifest afresh and returns a new, independent [`Course`].

use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::{
    domain::{Config, Course, Diagnostics, ValidCourse, Validator},
    storage::{manifest, FsResolver, LoadError},
};

/// A course root directory and its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens the course rooted at `root`.
    ///
    /// The configuration is read from `.course/config.toml`; if it is missing
    /// or invalid the defaults are used.
    #[must_use]
    pub fn open(root: PathBuf) -> Self {
        let config = load_config(&root);
        Self { root, config }
    }

    /// Uses an explicit configuration instead of reading one from disk.
    #[must_use]
    pub const fn with_config(root: PathBuf, config: Config) -> Self {
        Self { root, config }
    }

    /// The course root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Where the configuration file lives for a course rooted at `root`.
    #[must_use]
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(".course").join("config.toml")
    }

    /// Full path of the manifest.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(self.config.manifest())
    }

    /// The directory topic paths are resolved against.
    #[must_use]
    pub fn topics_root(&self) -> PathBuf {
        self.config.topics_root().map_or_else(
            || {
                FsResolver::for_manifest(&self.manifest_path())
                    .root()
                    .to_path_buf()
            },
            |topics_root| self.root.join(topics_root),
        )
    }

    /// A validator configured for this project.
    ///
    /// Topic existence is checked only if `resolve_topics` is enabled.
    #[must_use]
    pub fn validator(&self) -> Validator<FsResolver> {
        let resolver = self
            .config
            .resolve_topics
            .then(|| FsResolver::new(self.topics_root()));
        Validator::with_optional_resolver(resolver)
    }

    /// Loads the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or parsed.
    pub fn load(&self) -> Result<Course, LoadError> {
        manifest::load(&self.manifest_path())
    }

    /// Loads and validates the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be loaded, or the diagnostics
    /// if it is structurally invalid.
    #[instrument(level = "debug", skip(self), fields(root = %self.root.display()))]
    pub fn load_valid(&self) -> Result<ValidCourse, ProjectError> {
        let course = self.load()?;
        Ok(self.validator().validate(course)?)
    }
}

fn load_config(root: &Path) -> Config {
    let path = Project::config_path(root);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

/// Why a project's course could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// The manifest could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The manifest loaded but is structurally invalid.
    #[error(transparent)]
    Invalid(#[from] Diagnostics),
}
