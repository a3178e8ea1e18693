//! Key material held by the worker

pub mod registry;
pub mod secrets;

pub use registry::KeyRegistry;
pub use secrets::SecretRing;
