//! API request handlers

pub mod issue;
pub mod submit;

pub use issue::{create_survey_key, SIGNATURE_HEADER};
pub use submit::submit_survey;
