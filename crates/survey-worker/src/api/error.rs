//! API error types and responses
//!
//! Each endpoint has exactly one failure response. Internally the reasons are
//! kept apart for logging and tests; externally they are all the same bytes.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use survey_core::SurveyError;

/// Body of every 404
pub const NOT_FOUND_BODY: &str = "Not Found";

/// Body of every 405
pub const METHOD_NOT_ALLOWED_BODY: &str = "Method Not Allowed";

/// Body of every submission response
pub const OK_BODY: &str = "OK";

/// Reasons a survey key request is refused
#[derive(Error, Debug)]
pub enum IssueError {
    #[error("missing caller identifier")]
    MissingIdentifier,

    #[error("missing x-signature header")]
    MissingSignature,

    #[error("request body could not be read")]
    UnreadableBody,

    #[error("request body is not JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("request body is empty")]
    EmptyPayload,

    #[error("unknown caller")]
    UnknownCaller,

    #[error("signature rejected")]
    SignatureRejected,

    #[error("failed to sign survey key: {0}")]
    Token(#[from] SurveyError),
}

impl IntoResponse for IssueError {
    fn into_response(self) -> Response {
        not_found()
    }
}

/// `404 Not Found`
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}

/// `405 Method Not Allowed` advertising POST
pub fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        METHOD_NOT_ALLOWED_BODY,
    )
        .into_response()
}
