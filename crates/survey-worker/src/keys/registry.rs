//! Key Registry for the survey worker
//!
//! Maps caller identifiers to the RSA public keys they sign survey key
//! requests with. The table is built once at startup and only read afterwards.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use std::collections::HashMap;
use tracing::{debug, info};

use survey_core::CallerKey;

use crate::config::ConfigError;

/// Standard base64 that, like browser `atob`, does not insist on padding
const SIGNATURE_ENCODING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Registry of callers allowed to request survey keys
#[derive(Debug, Default, Clone)]
pub struct KeyRegistry {
    /// Caller public keys (identifier -> key)
    callers: HashMap<String, CallerKey>,
}

impl KeyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a caller key, replacing any key with the same identifier
    pub fn with_caller(mut self, key: CallerKey) -> Self {
        info!(identifier = %key.identifier(), "Registered caller key");
        self.callers.insert(key.identifier().to_string(), key);
        self
    }

    /// Build from `(identifier, base64 SPKI)` pairs
    ///
    /// Every key is imported here so that a broken entry fails startup
    /// instead of surfacing as a rejected request later.
    pub fn from_encoded<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for (identifier, encoded) in entries {
            let identifier = identifier.as_ref();
            if identifier.is_empty() || identifier.contains('/') {
                return Err(ConfigError::InvalidCallerIdentifier(identifier.to_string()));
            }
            let key = CallerKey::from_base64(identifier, encoded.as_ref()).map_err(|source| {
                ConfigError::InvalidPublicKey {
                    identifier: identifier.to_string(),
                    source,
                }
            })?;
            registry = registry.with_caller(key);
        }
        Ok(registry)
    }

    /// Build from a JSON object `{"identifier": "base64 SPKI", ...}`
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let entries: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| ConfigError::PublicKeys(e.to_string()))?;
        Self::from_encoded(entries)
    }

    /// Look up a caller's public key
    pub fn lookup(&self, identifier: &str) -> Option<&CallerKey> {
        self.callers.get(identifier)
    }

    /// Check whether a caller is registered
    pub fn contains(&self, identifier: &str) -> bool {
        self.callers.contains_key(identifier)
    }

    /// Verify a base64 `signature` by `identifier` over the raw `payload`
    ///
    /// Unknown callers, undecodable signatures and mismatches all yield
    /// `false`.
    pub fn verify(&self, identifier: &str, payload: &[u8], signature: &str) -> bool {
        let Some(key) = self.lookup(identifier) else {
            debug!(identifier = %identifier, "Unknown caller");
            return false;
        };
        let Ok(signature) = SIGNATURE_ENCODING.decode(signature.trim()) else {
            debug!(identifier = %identifier, "Undecodable signature");
            return false;
        };
        key.is_valid_signature(payload, &signature)
    }

    /// List registered caller identifiers, sorted
    pub fn identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = self.callers.keys().cloned().collect();
        identifiers.sort();
        identifiers
    }

    /// Get the number of registered callers
    pub fn len(&self) -> usize {
        self.callers.len()
    }

    /// Check whether no caller is registered
    pub fn is_empty(&self) -> bool {
        self.callers.is_empty()
    }
}
