//! # Survey Core
//!
//! Protocol primitives for the survey worker.
//!
//! ## Key Concepts
//!
//! - **Caller key**: RSA public key of a caller allowed to mint survey keys;
//!   callers sign the raw request body (PKCS#1 v1.5, SHA-256)
//! - **Survey key**: compact `header.payload.signature` token signed with
//!   HMAC-SHA256 under a secret chosen by the header `kid`
//! - **Trust state**: `verified`, `invalid` or `unknown` for the survey key
//!   attached to a submission
//!
//! Nothing here performs I/O; the worker crate wires these into the HTTP
//! surface and the object store.

pub mod error;
pub mod signature;
pub mod token;
pub mod types;

pub use error::{Result, SurveyError};
pub use signature::CallerKey;
pub use token::{DecodedToken, Secret, TokenHeader};
pub use types::{Kid, SurveyId, TrustState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
