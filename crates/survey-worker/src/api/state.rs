//! Application state shared across handlers

use std::sync::Arc;
use tokio_util::task::TaskTracker;

use crate::config::WorkerConfig;
use crate::keys::{KeyRegistry, SecretRing};
use crate::storage::ObjectStore;

/// Application state shared across handlers
///
/// Everything except the task tracker is read-only after startup.
#[derive(Debug)]
pub struct AppState {
    /// Callers allowed to request survey keys
    pub registry: KeyRegistry,
    /// Survey key secrets
    pub secrets: SecretRing,
    /// Bucket submissions are written to
    pub store: Arc<dyn ObjectStore>,
    /// Submission work still running after its response was sent
    pub tasks: TaskTracker,
}

impl AppState {
    /// Create state with a fresh task tracker
    pub fn new(registry: KeyRegistry, secrets: SecretRing, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            registry,
            secrets,
            store,
            tasks: TaskTracker::new(),
        }
    }

    /// Create state from loaded configuration
    pub fn from_config(config: WorkerConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self::new(config.registry, config.secrets, store)
    }

    /// Stop accepting background work and wait for what is in flight
    pub async fn drain(&self) {
        self.tasks.close();
        self.tasks.wait().await;
    }
}
