//! Caller request signatures
//!
//! Callers allowed to mint survey keys sign the raw bytes of their request
//! body with RSASSA-PKCS1-v1_5 over SHA-256. Their public keys are
//! distributed as base64-encoded DER SubjectPublicKeyInfo.
//!
//! Verification always runs over the exact bytes received. Parsing and
//! re-encoding the body first would let a differently-encoded but equivalent
//! payload pass under someone else's signature.

use base64::{engine::general_purpose::STANDARD, Engine};
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// RSA public key of a caller, usable for verification only
#[derive(Clone, PartialEq)]
pub struct CallerKey {
    /// Caller identifier
    identifier: String,
    /// RSA public key
    public_key: RsaPublicKey,
}

impl std::fmt::Debug for CallerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallerKey")
            .field("identifier", &self.identifier)
            .finish()
    }
}

impl CallerKey {
    /// Import a DER-encoded SubjectPublicKeyInfo
    pub fn from_spki_der(identifier: impl Into<String>, der: &[u8]) -> Result<Self> {
        let public_key = RsaPublicKey::from_public_key_der(der)?;
        Ok(Self {
            identifier: identifier.into(),
            public_key,
        })
    }

    /// Import a base64-encoded DER SubjectPublicKeyInfo
    pub fn from_base64(identifier: impl Into<String>, encoded: &str) -> Result<Self> {
        let der = STANDARD.decode(encoded.trim())?;
        Self::from_spki_der(identifier, &der)
    }

    /// Get the caller identifier
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Verify `signature` over the raw `payload` bytes
    pub fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<()> {
        let digest = Sha256::digest(payload);
        self.public_key
            .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature)?;
        Ok(())
    }

    /// Verify and collapse every failure to `false`
    pub fn is_valid_signature(&self, payload: &[u8], signature: &[u8]) -> bool {
        self.verify(payload, signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurveyError;
    use rsa::pkcs8::EncodePublicKey;
    use rsa::RsaPrivateKey;

    // 1024-bit keeps key generation quick in debug builds
    fn generate() -> (RsaPrivateKey, String) {
        let mut rng = rsa::rand_core::OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let spki = private_key.to_public_key().to_public_key_der().unwrap();
        (private_key, STANDARD.encode(spki.as_bytes()))
    }

    fn sign(private_key: &RsaPrivateKey, payload: &[u8]) -> Vec<u8> {
        private_key
            .sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(payload))
            .unwrap()
    }

    #[test]
    fn test_verify_valid_signature() {
        let (private_key, encoded) = generate();
        let key = CallerKey::from_base64("openttd", &encoded).unwrap();
        let body = br#"{"survey":"2024"}"#;

        assert_eq!(key.identifier(), "openttd");
        assert!(key.verify(body, &sign(&private_key, body)).is_ok());
    }

    #[test]
    fn test_exact_bytes_required() {
        let (private_key, encoded) = generate();
        let key = CallerKey::from_base64("openttd", &encoded).unwrap();
        let signature = sign(&private_key, br#"{"a":1,"b":2}"#);

        // Same JSON value, different encoding
        assert!(!key.is_valid_signature(br#"{"a": 1, "b": 2}"#, &signature));
        assert!(!key.is_valid_signature(br#"{"b":2,"a":1}"#, &signature));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let (private_key, _) = generate();
        let (_, other_encoded) = generate();
        let other = CallerKey::from_base64("other", &other_encoded).unwrap();
        let body = b"payload";

        let result = other.verify(body, &sign(&private_key, body));
        assert!(matches!(result, Err(SurveyError::SignatureMismatch)));
    }

    #[test]
    fn test_malformed_signature_rejected() {
        let (_, encoded) = generate();
        let key = CallerKey::from_base64("openttd", &encoded).unwrap();

        assert!(!key.is_valid_signature(b"payload", b""));
        assert!(!key.is_valid_signature(b"payload", &[0u8; 7]));
        assert!(!key.is_valid_signature(b"payload", &[0xffu8; 512]));
    }

    #[test]
    fn test_malformed_key_rejected() {
        assert!(matches!(
            CallerKey::from_base64("x", "not base64!"),
            Err(SurveyError::Encoding(_))
        ));
        assert!(matches!(
            CallerKey::from_base64("x", &STANDARD.encode(b"not a key")),
            Err(SurveyError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_debug_omits_key_material() {
        let (_, encoded) = generate();
        let key = CallerKey::from_base64("openttd", &encoded).unwrap();
        assert_eq!(format!("{:?}", key), r#"CallerKey { identifier: "openttd" }"#);
    }
}
