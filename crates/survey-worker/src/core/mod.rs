//! Core submission logic

pub mod classifier;

pub use classifier::{classify, classify_key, object_name, record_submission, Rejection, Submission};
