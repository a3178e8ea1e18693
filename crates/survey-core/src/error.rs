//! Error types for the survey key protocol

use thiserror::Error;

/// Result type alias using SurveyError
pub type Result<T> = std::result::Result<T, SurveyError>;

/// Errors that can occur while handling survey keys and caller signatures
///
/// These never reach an HTTP caller. The worker collapses every variant into
/// a single external outcome per endpoint; the variants exist so the reason
/// can be logged and tested.
#[derive(Error, Debug)]
pub enum SurveyError {
    /// Token is not three base64url segments of JSON
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Token header is not `{type: "JWT", alg: "HS256", kid: <int>}`
    #[error("Unsupported token header: {0}")]
    UnsupportedHeader(String),

    /// Key identifier is not a positive integer
    #[error("Invalid key identifier: {0}")]
    InvalidKid(String),

    /// No secret is configured for the key identifier
    #[error("Unknown key identifier: {0}")]
    UnknownKid(u32),

    /// Signature over the token or payload did not match
    #[error("Signature mismatch")]
    SignatureMismatch,

    /// Token payload carries an `exp` in the past
    #[error("Token expired at {0}")]
    Expired(i64),

    /// Token payload carries an `nbf` in the future
    #[error("Token not valid before {0}")]
    NotYetValid(i64),

    /// Public key material could not be imported
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Base64 decoding failed
    #[error("Invalid base64 encoding: {0}")]
    Encoding(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Cryptographic provider error
    #[error("Cryptographic error: {0}")]
    Crypto(String),
}

impl From<serde_json::Error> for SurveyError {
    fn from(err: serde_json::Error) -> Self {
        SurveyError::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for SurveyError {
    fn from(err: base64::DecodeError) -> Self {
        SurveyError::Encoding(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for SurveyError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::InvalidSignature => SurveyError::SignatureMismatch,
            ErrorKind::Base64(e) => SurveyError::Encoding(e.to_string()),
            _ => SurveyError::Crypto(err.to_string()),
        }
    }
}

impl From<rsa::Error> for SurveyError {
    fn from(err: rsa::Error) -> Self {
        match err {
            rsa::Error::Verification => SurveyError::SignatureMismatch,
            other => SurveyError::Crypto(other.to_string()),
        }
    }
}

impl From<rsa::pkcs8::spki::Error> for SurveyError {
    fn from(err: rsa::pkcs8::spki::Error) -> Self {
        SurveyError::InvalidPublicKey(err.to_string())
    }
}
