//! In-memory storage backend
//!
//! Keeps objects in a map. Used by tests and local experiments; data is lost
//! on restart.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::debug;

use super::{validate_name, ObjectStore, StorageError};

/// In-memory object store
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an object's contents
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.objects.read().ok()?.get(name).cloned()
    }

    /// List stored object names, sorted
    pub fn names(&self) -> Vec<String> {
        self.objects
            .read()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Get the number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().map(|objects| objects.len()).unwrap_or(0)
    }

    /// Check whether nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, name: &str, body: &[u8]) -> Result<(), StorageError> {
        validate_name(name)?;
        let mut objects = self
            .objects
            .write()
            .map_err(|_| StorageError::Backend("object map lock poisoned".into()))?;
        debug!(name = %name, size = body.len(), "Storing object");
        objects.insert(name.to_string(), body.to_vec());
        Ok(())
    }
}
