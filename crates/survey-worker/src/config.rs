//! Worker configuration
//!
//! Everything is read once at startup and handed to the router as an
//! explicit value; handlers never consult the process environment.
//!
//! | Variable | Meaning |
//! |---|---|
//! | `SECRET_<kid>` | HMAC secret for numeric key id `<kid>` |
//! | `ACTIVE_KID` | kid new survey keys are signed with (required) |
//! | `SURVEY_PUBLIC_KEYS` | path to a JSON object of caller → base64 SPKI |
//! | `SURVEY_BUCKET_DIR` | directory submissions are written to |
//! | `SURVEY_PORT` | listen port |

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

use survey_core::{Kid, Secret, SurveyError};

use crate::keys::{KeyRegistry, SecretRing};

/// Prefix of secret variables
pub const SECRET_PREFIX: &str = "SECRET_";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8787;

/// Default bucket directory
pub const DEFAULT_BUCKET_DIR: &str = "./survey-bucket";

/// Configuration errors; all of them abort startup
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required variable {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    InvalidVar { name: String, reason: String },

    #[error("No secret configured for active kid {0}")]
    UnknownActiveKid(Kid),

    #[error("Invalid caller identifier: {0:?}")]
    InvalidCallerIdentifier(String),

    #[error("Invalid public key for caller {identifier}: {source}")]
    InvalidPublicKey {
        identifier: String,
        #[source]
        source: SurveyError,
    },

    #[error("Failed to load public keys: {0}")]
    PublicKeys(String),
}

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Survey key secrets and the active kid
    pub secrets: SecretRing,
    /// Callers allowed to request survey keys
    pub registry: KeyRegistry,
    /// Directory of the filesystem object store
    pub bucket_dir: PathBuf,
    /// Listen port
    pub port: u16,
}

impl WorkerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Load from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut secrets = BTreeMap::new();
        let mut active = None;
        let mut public_keys = None;
        let mut bucket_dir = PathBuf::from(DEFAULT_BUCKET_DIR);
        let mut port = DEFAULT_PORT;

        for (name, value) in vars {
            if let Some(suffix) = name.strip_prefix(SECRET_PREFIX) {
                let Ok(kid) = suffix.parse::<Kid>() else {
                    warn!(var = %name, "Ignoring secret with non-numeric kid");
                    continue;
                };
                if value.is_empty() {
                    return Err(ConfigError::InvalidVar {
                        name,
                        reason: "secret is empty".into(),
                    });
                }
                secrets.insert(kid, Secret::new(value));
                continue;
            }

            match name.as_str() {
                "ACTIVE_KID" => {
                    let kid = value.trim().parse::<Kid>().map_err(|e| ConfigError::InvalidVar {
                        name: name.clone(),
                        reason: e.to_string(),
                    })?;
                    active = Some(kid);
                }
                "SURVEY_PUBLIC_KEYS" => public_keys = Some(PathBuf::from(value)),
                "SURVEY_BUCKET_DIR" => bucket_dir = PathBuf::from(value),
                "SURVEY_PORT" => {
                    port = value.trim().parse().map_err(|_| ConfigError::InvalidVar {
                        name: name.clone(),
                        reason: format!("{:?} is not a port number", value),
                    })?;
                }
                _ => {}
            }
        }

        let active = active.ok_or(ConfigError::MissingVar("ACTIVE_KID"))?;
        let secrets = SecretRing::new(secrets, active)?;

        let registry = match public_keys {
            Some(path) => {
                let json = std::fs::read_to_string(&path).map_err(|e| {
                    ConfigError::PublicKeys(format!("{}: {}", path.display(), e))
                })?;
                KeyRegistry::from_json(&json)?
            }
            None => {
                warn!("SURVEY_PUBLIC_KEYS not set; survey keys cannot be issued");
                KeyRegistry::new()
            }
        };

        Ok(Self {
            secrets,
            registry,
            bucket_dir,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC_KEYS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/public_keys.json");

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn kid(value: u32) -> Kid {
        Kid::new(value).unwrap()
    }

    #[test]
    fn test_full_config() {
        let config = WorkerConfig::from_vars(vars(&[
            ("SECRET_1", "first"),
            ("SECRET_2", "second"),
            ("ACTIVE_KID", "2"),
            ("SURVEY_PUBLIC_KEYS", PUBLIC_KEYS),
            ("SURVEY_BUCKET_DIR", "/tmp/bucket"),
            ("SURVEY_PORT", "9000"),
            ("PATH", "/usr/bin"),
        ]))
        .unwrap();

        assert_eq!(config.secrets.kids(), vec![kid(1), kid(2)]);
        assert_eq!(config.secrets.active().0, kid(2));
        assert!(config.registry.contains("openttd"));
        assert_eq!(config.bucket_dir, PathBuf::from("/tmp/bucket"));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_defaults() {
        let config =
            WorkerConfig::from_vars(vars(&[("SECRET_1", "first"), ("ACTIVE_KID", "1")])).unwrap();

        assert!(config.registry.is_empty());
        assert_eq!(config.bucket_dir, PathBuf::from(DEFAULT_BUCKET_DIR));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_non_numeric_secret_ignored() {
        let config = WorkerConfig::from_vars(vars(&[
            ("SECRET_1", "first"),
            ("SECRET_KEY", "unrelated"),
            ("SECRET_0", "zero"),
            ("ACTIVE_KID", "1"),
        ]))
        .unwrap();

        assert_eq!(config.secrets.kids(), vec![kid(1)]);
    }

    #[test]
    fn test_missing_active_kid() {
        let result = WorkerConfig::from_vars(vars(&[("SECRET_1", "first")]));
        assert!(matches!(result, Err(ConfigError::MissingVar("ACTIVE_KID"))));
    }

    #[test]
    fn test_active_kid_without_secret() {
        let result = WorkerConfig::from_vars(vars(&[("SECRET_1", "first"), ("ACTIVE_KID", "3")]));
        assert!(matches!(result, Err(ConfigError::UnknownActiveKid(_))));
    }

    #[test]
    fn test_invalid_values() {
        let bad_kid = WorkerConfig::from_vars(vars(&[("SECRET_1", "x"), ("ACTIVE_KID", "one")]));
        let empty_secret = WorkerConfig::from_vars(vars(&[("SECRET_1", ""), ("ACTIVE_KID", "1")]));
        let bad_port = WorkerConfig::from_vars(vars(&[
            ("SECRET_1", "x"),
            ("ACTIVE_KID", "1"),
            ("SURVEY_PORT", "http"),
        ]));

        assert!(matches!(bad_kid, Err(ConfigError::InvalidVar { .. })));
        assert!(matches!(empty_secret, Err(ConfigError::InvalidVar { .. })));
        assert!(matches!(bad_port, Err(ConfigError::InvalidVar { .. })));
    }

    #[test]
    fn test_missing_public_keys_file() {
        let result = WorkerConfig::from_vars(vars(&[
            ("SECRET_1", "x"),
            ("ACTIVE_KID", "1"),
            ("SURVEY_PUBLIC_KEYS", "/nonexistent/keys.json"),
        ]));
        assert!(matches!(result, Err(ConfigError::PublicKeys(_))));
    }
}
