//! Survey Key Issuance Handler
//!
//! A registered caller asks for a survey key by POSTing the JSON claims it
//! wants in the key, signed with its private key in the `x-signature` header.
//! If the signature checks out against the raw body, the claims are signed
//! into a survey key under the active kid and returned as plain text.
//!
//! Every refusal is the same `404 Not Found` that an unknown path gets, so a
//! prober cannot tell a bad signature from an unknown caller from a route
//! that does not exist.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, Uri},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use survey_core::{token, Kid};

use crate::api::error::IssueError;
use crate::api::state::AppState;
use crate::core::classifier::is_blank;

/// Header carrying the caller's base64 signature over the raw body
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Issue a survey key to a registered caller
///
/// POST /create-survey-key/{identifier}
pub async fn create_survey_key(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<String, IssueError> {
    let identifier = caller_identifier(uri.path());

    match issue_survey_key(&state, identifier, &headers, body) {
        Ok((kid, survey_key)) => {
            info!(identifier = ?identifier, kid = %kid, "Issued survey key");
            Ok(survey_key)
        }
        Err(err) => {
            debug!(identifier = ?identifier, reason = %err, "Refused survey key request");
            Err(err)
        }
    }
}

/// Caller identifier: the path segment after `/create-survey-key/`
///
/// Anything after a further `/` is ignored.
fn caller_identifier(path: &str) -> Option<&str> {
    path.split('/').nth(2).filter(|segment| !segment.is_empty())
}

fn issue_survey_key(
    state: &AppState,
    identifier: Option<&str>,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(Kid, String), IssueError> {
    let body = body.map_err(|_| IssueError::UnreadableBody)?;
    let payload: Value = serde_json::from_slice(&body)?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or(IssueError::MissingSignature)?;
    let identifier = identifier.ok_or(IssueError::MissingIdentifier)?;
    if is_blank(&payload) {
        return Err(IssueError::EmptyPayload);
    }

    if !state.registry.contains(identifier) {
        return Err(IssueError::UnknownCaller);
    }
    if !state.registry.verify(identifier, &body, signature) {
        return Err(IssueError::SignatureRejected);
    }

    let (kid, secret) = state.secrets.active();
    let survey_key = token::sign(&payload, secret, kid)?;
    Ok((kid, survey_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_identifier() {
        assert_eq!(caller_identifier("/create-survey-key/openttd"), Some("openttd"));
        assert_eq!(caller_identifier("/create-survey-key/openttd/extra"), Some("openttd"));
        assert_eq!(caller_identifier("/create-survey-key/"), None);
        assert_eq!(caller_identifier("/create-survey-key"), None);
    }
}
