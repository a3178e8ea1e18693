//! Survey Worker
//!
//! Edge service for the in-game survey:
//! - Accepts anonymous survey submissions and writes them to a bucket, tagged
//!   with the trust state of the survey key they carry
//! - Issues survey keys to registered callers who sign their request with
//!   their RSA key
//!
//! Neither endpoint tells the client what went wrong. Submissions are always
//! answered with `200 OK`; refused survey key requests are always answered
//! with the same `404 Not Found` as an unknown path.
//!
//! ## API Endpoints
//!
//! - `POST /` - Submit a survey result
//! - `POST /create-survey-key/{identifier}` - Issue a survey key

pub mod api;
pub mod config;
pub mod core;
pub mod keys;
pub mod storage;

pub use api::create_router;
pub use api::state::AppState;
pub use config::{ConfigError, WorkerConfig};
pub use keys::{KeyRegistry, SecretRing};
pub use storage::{FsStore, MemoryStore, ObjectStore, StorageError};
