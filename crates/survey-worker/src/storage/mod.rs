//! Object storage for survey submissions
//!
//! Submissions are written once under a name derived from the time, the
//! submission id and its trust state. The worker only ever writes; reading the
//! bucket back is left to the analysis tooling.

pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::fmt::Debug;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid object name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Bucket the worker persists submissions into
///
/// Writing an existing name overwrites it.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Store `body` under `name`
    async fn put(&self, name: &str, body: &[u8]) -> Result<(), StorageError>;
}

/// Reject names that could escape the bucket
pub(crate) fn validate_name(name: &str) -> Result<(), StorageError> {
    let escapes = name.is_empty()
        || name.starts_with('/')
        || name.contains('\\')
        || name.contains('\0')
        || name.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if escapes {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}
