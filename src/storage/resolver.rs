use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use crate::domain::{ResolveError, TopicRef, TopicResolver};

/// Resolves topic references against a directory on disk.
///
/// A topic resolves if joining its path onto the root names a regular file
/// that can be opened. The file is closed again before `resolve` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    /// Creates a resolver rooted at `root`.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Creates a resolver rooted at the directory containing `manifest`.
    #[must_use]
    pub fn for_manifest(manifest: &Path) -> Self {
        let root = manifest.parent().unwrap_or_else(|| Path::new("."));
        Self::new(root.to_path_buf())
    }

    /// The directory topic paths are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TopicResolver for FsResolver {
    fn resolve(&self, topic: &TopicRef) -> Result<(), ResolveError> {
        let path = self.root.join(topic.as_path());
        let file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ResolveError::NotFound,
            _ => ResolveError::Io(e),
        })?;

        if file.metadata()?.is_file() {
            Ok(())
        } else {
            Err(ResolveError::NotAFile)
        }
    }
}
