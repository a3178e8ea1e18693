//! Survey submission classification
//!
//! A submission is a JSON object `{"id": <32 hex>, "schema": 1, "key": ...}`
//! plus whatever else the client sends. Anything that does not look like that
//! on the surface is dropped without a trace. Everything that does is stored
//! verbatim, with the trust state of its survey key in the object name.
//!
//! The HTTP caller never learns the outcome: the response has already been
//! sent by the time this runs.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use survey_core::{token, SurveyError, SurveyId, TrustState};

use crate::keys::SecretRing;
use crate::storage::ObjectStore;

/// The only submission schema currently accepted
pub const SUPPORTED_SCHEMA: u64 = 1;

/// Why a submission was dropped before classification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("body is not JSON")]
    NotJson,

    #[error("body is not a JSON object")]
    NotObject,

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("unsupported schema")]
    UnsupportedSchema,

    #[error("id is not 32 hexadecimal characters")]
    InvalidId,
}

/// A submission that passed surface validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Submission id as sent
    pub id: SurveyId,
    /// Trust state of the attached survey key
    pub state: TrustState,
}

impl Submission {
    /// Name the submission is stored under when received at `now`
    pub fn object_name(&self, now: DateTime<Utc>) -> String {
        object_name(now, &self.id, self.state)
    }
}

/// `<YYYY-MM-DD>/<HH:MM:SS.mmmZ>-<id>.<state>.json`, all in UTC
pub fn object_name(now: DateTime<Utc>, id: &SurveyId, state: TrustState) -> String {
    format!(
        "{}/{}-{}.{}.json",
        now.format("%Y-%m-%d"),
        now.format("%H:%M:%S%.3fZ"),
        id,
        state
    )
}

/// Values a client may send to mean "no value": `null`, `false`, `0`, `""`
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Validate a raw body and classify its survey key
pub fn classify(
    body: &[u8],
    secrets: &SecretRing,
    now: DateTime<Utc>,
) -> Result<Submission, Rejection> {
    let payload: Value = serde_json::from_slice(body).map_err(|_| Rejection::NotJson)?;
    let fields = payload.as_object().ok_or(Rejection::NotObject)?;

    let id = fields.get("id").ok_or(Rejection::MissingField("id"))?;
    let key = fields.get("key").ok_or(Rejection::MissingField("key"))?;
    let schema = fields.get("schema").ok_or(Rejection::MissingField("schema"))?;

    if schema.as_f64() != Some(SUPPORTED_SCHEMA as f64) {
        return Err(Rejection::UnsupportedSchema);
    }

    let id = id
        .as_str()
        .and_then(SurveyId::parse)
        .ok_or(Rejection::InvalidId)?;

    Ok(Submission {
        id,
        state: classify_key(key, secrets, now),
    })
}

/// Trust state of a submission's `key` field
pub fn classify_key(key: &Value, secrets: &SecretRing, now: DateTime<Utc>) -> TrustState {
    if is_blank(key) {
        return TrustState::Unknown;
    }
    let Some(survey_key) = key.as_str() else {
        debug!("Survey key is not a string");
        return TrustState::Invalid;
    };
    match verify_survey_key(survey_key, secrets, now) {
        Ok(()) => TrustState::Verified,
        Err(err) => {
            debug!(reason = %err, "Survey key rejected");
            TrustState::Invalid
        }
    }
}

/// Decode the header, select the secret by kid, then verify
fn verify_survey_key(
    survey_key: &str,
    secrets: &SecretRing,
    now: DateTime<Utc>,
) -> Result<(), SurveyError> {
    let decoded = token::decode(survey_key)?;
    let kid = decoded.header().kid;
    let secret = secrets.get(kid).ok_or(SurveyError::UnknownKid(kid.get()))?;
    decoded.verify(secret, now)
}

/// Classify a submission and store it
///
/// Never fails: rejected bodies and storage errors are logged at debug level
/// and otherwise ignored. Returns the name written, if any.
pub async fn record_submission(
    body: &[u8],
    secrets: &SecretRing,
    store: &dyn ObjectStore,
    now: DateTime<Utc>,
) -> Option<String> {
    let submission = match classify(body, secrets, now) {
        Ok(submission) => submission,
        Err(rejection) => {
            debug!(reason = %rejection, "Dropping submission");
            return None;
        }
    };

    let name = submission.object_name(now);
    match store.put(&name, body).await {
        Ok(()) => {
            debug!(id = %submission.id, state = %submission.state, "Stored submission");
            Some(name)
        }
        Err(err) => {
            debug!(error = %err, "Failed to store submission");
            None
        }
    }
}
