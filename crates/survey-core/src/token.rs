//! Compact survey key tokens
//!
//! A survey key is three base64url segments joined by `.`:
//!
//! ```text
//! base64url(header) "." base64url(payload) "." base64url(HMAC-SHA256(secret, header "." payload))
//! ```
//!
//! The header is always `{"type":"JWT","alg":"HS256","kid":<int>}`. The payload
//! is whatever JSON the issuing caller chose. The `kid` selects which secret
//! signs and verifies the token, so decoding happens before verification and
//! everything in the token stays untrusted until the signature checks out.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::{crypto, Algorithm, DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SurveyError};
use crate::types::Kid;

/// Value of the header `type` field
pub const TOKEN_TYPE: &str = "JWT";

/// Value of the header `alg` field
pub const TOKEN_ALG: &str = "HS256";

/// base64url without padding on encode, tolerant of padding on decode
const SEGMENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Symmetric secret used to sign and verify survey keys
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Vec<u8>);

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

impl Secret {
    /// Wrap raw secret bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.0)
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.0)
    }
}

/// Header written on issuance
#[derive(Serialize)]
struct IssuedHeader {
    #[serde(rename = "type")]
    token_type: &'static str,
    alg: &'static str,
    kid: Kid,
}

/// Header as found in an untrusted token
#[derive(Deserialize)]
struct RawHeader {
    #[serde(rename = "type")]
    token_type: Option<Value>,
    alg: Option<Value>,
    kid: Option<Value>,
}

/// Accepted token header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenHeader {
    /// Key identifier selecting the secret
    pub kid: Kid,
}

impl RawHeader {
    fn accept(self) -> Result<TokenHeader> {
        if self.token_type.as_ref().and_then(Value::as_str) != Some(TOKEN_TYPE) {
            return Err(SurveyError::UnsupportedHeader("type".into()));
        }
        if self.alg.as_ref().and_then(Value::as_str) != Some(TOKEN_ALG) {
            return Err(SurveyError::UnsupportedHeader("alg".into()));
        }
        let kid = self
            .kid
            .as_ref()
            .and_then(Kid::from_header_value)
            .ok_or_else(|| SurveyError::UnsupportedHeader("kid".into()))?;
        Ok(TokenHeader { kid })
    }
}

/// A token whose structure and header have been accepted but whose
/// signature has not been checked yet
#[derive(Debug, Clone)]
pub struct DecodedToken<'a> {
    header: TokenHeader,
    payload: Value,
    signing_input: &'a str,
    signature: &'a str,
}

impl<'a> DecodedToken<'a> {
    /// The accepted header
    pub fn header(&self) -> TokenHeader {
        self.header
    }

    /// The unverified payload
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Check the signature with `secret` and the payload's time claims
    /// against `now`
    pub fn verify(&self, secret: &Secret, now: DateTime<Utc>) -> Result<()> {
        let valid = crypto::verify(
            self.signature,
            self.signing_input.as_bytes(),
            &secret.decoding_key(),
            Algorithm::HS256,
        )?;
        if !valid {
            return Err(SurveyError::SignatureMismatch);
        }
        check_time_claims(&self.payload, now)
    }
}

/// Split a token and accept its header
///
/// Rejects anything that is not three segments, whose header or payload is
/// not JSON, or whose header is not exactly the supported shape. No secret is
/// touched.
pub fn decode(token: &str) -> Result<DecodedToken<'_>> {
    let (signing_input, signature) = token
        .rsplit_once('.')
        .ok_or_else(|| SurveyError::MalformedToken("missing signature segment".into()))?;
    let (header_segment, payload_segment) = signing_input
        .split_once('.')
        .ok_or_else(|| SurveyError::MalformedToken("missing payload segment".into()))?;
    if payload_segment.contains('.') {
        return Err(SurveyError::MalformedToken("too many segments".into()));
    }

    let raw_header: RawHeader = serde_json::from_slice(&SEGMENT.decode(header_segment)?)?;
    let header = raw_header.accept()?;
    let payload: Value = serde_json::from_slice(&SEGMENT.decode(payload_segment)?)?;

    Ok(DecodedToken {
        header,
        payload,
        signing_input,
        signature,
    })
}

/// Decode `token` and verify it with `secret`, reporting only success
pub fn verify(token: &str, secret: &Secret, now: DateTime<Utc>) -> bool {
    decode(token)
        .and_then(|decoded| decoded.verify(secret, now))
        .is_ok()
}

/// Issue a token carrying `payload`, signed with `secret` under `kid`
pub fn sign(payload: &Value, secret: &Secret, kid: Kid) -> Result<String> {
    let header = IssuedHeader {
        token_type: TOKEN_TYPE,
        alg: TOKEN_ALG,
        kid,
    };
    let signing_input = format!(
        "{}.{}",
        SEGMENT.encode(serde_json::to_vec(&header)?),
        SEGMENT.encode(serde_json::to_vec(payload)?),
    );
    let signature = crypto::sign(
        signing_input.as_bytes(),
        &secret.encoding_key(),
        Algorithm::HS256,
    )?;
    Ok(format!("{}.{}", signing_input, signature))
}

/// Enforce `nbf` and `exp` (seconds since the epoch) when the payload has them
fn check_time_claims(payload: &Value, now: DateTime<Utc>) -> Result<()> {
    let now = now.timestamp();
    if let Some(nbf) = payload.get("nbf").and_then(Value::as_f64) {
        if nbf > now as f64 {
            return Err(SurveyError::NotYetValid(nbf as i64));
        }
    }
    if let Some(exp) = payload.get("exp").and_then(Value::as_f64) {
        if exp <= now as f64 {
            return Err(SurveyError::Expired(exp as i64));
        }
    }
    Ok(())
}
