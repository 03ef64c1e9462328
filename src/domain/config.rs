use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for loading and validating a course.
///
/// Stored as TOML in `.course/config.toml` beneath the course root. Every
/// field has a default, so the file is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Path of the manifest, relative to the course root.
    manifest: PathBuf,

    /// Directory that topic paths are resolved against, relative to the
    /// course root.
    ///
    /// When unset, topic paths are resolved against the directory containing
    /// the manifest.
    topics_root: Option<PathBuf>,

    /// Whether validation checks that every topic file exists.
    pub resolve_topics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            topics_root: None,
            resolve_topics: true,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the manifest path, relative to the course root.
    #[must_use]
    pub fn manifest(&self) -> &Path {
        &self.manifest
    }

    /// Sets the manifest path, relative to the course root.
    pub fn set_manifest(&mut self, manifest: PathBuf) {
        self.manifest = manifest;
    }

    /// Returns the configured topics root, if any.
    #[must_use]
    pub fn topics_root(&self) -> Option<&Path> {
        self.topics_root.as_deref()
    }

    /// Sets the directory topic paths are resolved against.
    pub fn set_topics_root(&mut self, topics_root: Option<PathBuf>) {
        self.topics_root = topics_root;
    }
}

fn default_manifest() -> PathBuf {
    PathBuf::from("course.toml")
}

const fn default_resolve_topics() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_manifest")]
        manifest: PathBuf,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        topics_root: Option<PathBuf>,

        #[serde(default = "default_resolve_topics")]
        resolve_topics: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                manifest,
                topics_root,
                resolve_topics,
            } => Self {
                manifest,
                topics_root,
                resolve_topics,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            manifest: config.manifest,
            topics_root: config.topics_root,
            resolve_topics: config.resolve_topics,
        }
    }
}
