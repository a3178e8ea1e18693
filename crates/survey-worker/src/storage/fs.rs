//! Filesystem storage backend
//!
//! Writes each object to `<root>/<name>`, creating the date directory on
//! demand. Object names contain `/` separators, which map onto directories.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{validate_name, ObjectStore, StorageError};

/// Object store backed by a local directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn put(&self, name: &str, body: &[u8]) -> Result<(), StorageError> {
        validate_name(name)?;
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, body).await?;
        debug!(path = %path.display(), size = body.len(), "Wrote object");
        Ok(())
    }
}
