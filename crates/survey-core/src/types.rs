//! Common types used across the survey key protocol

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SurveyError;

/// Outcome of classifying the survey key attached to a submission
///
/// Every failure (malformed token, unknown kid, bad signature, expired claims)
/// is the same `Invalid` value so that the reason cannot be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustState {
    /// Key decoded and verified under a configured secret
    Verified,
    /// Key present but not acceptable
    Invalid,
    /// No key supplied
    Unknown,
}

impl TrustState {
    /// Lowercase name used in object names
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustState::Verified => "verified",
            TrustState::Invalid => "invalid",
            TrustState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TrustState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric key identifier selecting a symmetric secret
///
/// Zero is not a valid identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kid(u32);

impl Kid {
    /// Create a key identifier, rejecting zero
    pub fn new(value: u32) -> Option<Self> {
        (value != 0).then_some(Self(value))
    }

    /// Interpret a token header `kid` value
    ///
    /// Accepts a positive JSON integer or a string holding one.
    pub fn from_header_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .and_then(Self::new),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Raw numeric value
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl FromStr for Kid {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| SurveyError::InvalidKid(s.to_string()))
    }
}

impl fmt::Display for Kid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Survey submission identifier: exactly 32 hexadecimal characters
///
/// Case is preserved as submitted; it ends up in the object name verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SurveyId(String);

impl SurveyId {
    /// Required length in characters
    pub const LEN: usize = 32;

    /// Validate a submitted id
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() == Self::LEN && value.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    /// The id as submitted
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurveyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
