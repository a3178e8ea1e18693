//! Survey key secrets
//!
//! Several HMAC secrets can be configured at once so keys can be rotated:
//! new survey keys are always signed with the active kid, while keys issued
//! under an older kid keep verifying as long as its secret stays configured.

use std::collections::BTreeMap;

use survey_core::{Kid, Secret};

use crate::config::ConfigError;

/// Configured secrets and the kid used for issuing
#[derive(Debug, Clone)]
pub struct SecretRing {
    secrets: BTreeMap<Kid, Secret>,
    active: Kid,
}

impl SecretRing {
    /// Create a ring; the active kid must have a secret
    pub fn new(secrets: BTreeMap<Kid, Secret>, active: Kid) -> Result<Self, ConfigError> {
        if !secrets.contains_key(&active) {
            return Err(ConfigError::UnknownActiveKid(active));
        }
        Ok(Self { secrets, active })
    }

    /// Secret for a kid taken from a token header
    ///
    /// The kid is only ever used as a key into the configured set.
    pub fn get(&self, kid: Kid) -> Option<&Secret> {
        self.secrets.get(&kid)
    }

    /// The kid and secret new survey keys are signed with
    pub fn active(&self) -> (Kid, &Secret) {
        // `new` guarantees the entry exists
        (self.active, &self.secrets[&self.active])
    }

    /// All configured kids, ascending
    pub fn kids(&self) -> Vec<Kid> {
        self.secrets.keys().copied().collect()
    }
}
