// src/crypto/suite.rs
//! Signature suite abstraction.
//!
//! A suite binds a proof type label to a sign/verify capability. An
//! issuance-side instance carries the signing key and the verification
//! method it will stamp into proofs; a verification-side instance carries
//! neither, because the public key is looked up per credential from
//! itemized chain storage.
//!
//! Suites operate on exactly the canonical bytes handed to them; any
//! hashing or encoding belongs to the canonicalization layer.

use crate::error::SuiteError;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

/// A pluggable sign/verify capability bound to a verification method.
pub trait SignatureSuite: Send + Sync {
    /// Proof type label stamped into proofs, e.g. "Ed25519Signature2020".
    fn proof_type(&self) -> &'static str;

    /// Key reference for proofs this suite creates. `None` on
    /// verify-only instances.
    fn verification_method(&self) -> Option<&str>;

    /// Signs the canonical input, returning raw signature bytes.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SuiteError>;

    /// Verifies raw signature bytes over the canonical input with the
    /// given raw public key.
    fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> bool;
}

/// Ed25519Signature2020 suite.
pub struct Ed25519Suite {
    signing_key: Option<SigningKey>,
    verification_method: Option<String>,
}

impl Ed25519Suite {
    /// Creates an issuance-side suite.
    ///
    /// # Arguments
    /// * `signing_key` - the issuer's assertion-method secret key
    /// * `verification_method` - issuer URI plus `#` plus key index
    pub fn signing(signing_key: SigningKey, verification_method: String) -> Self {
        Ed25519Suite {
            signing_key: Some(signing_key),
            verification_method: Some(verification_method),
        }
    }

    /// Creates a verification-side suite. Keys are supplied per call.
    pub fn verifying() -> Self {
        Ed25519Suite {
            signing_key: None,
            verification_method: None,
        }
    }
}

impl SignatureSuite for Ed25519Suite {
    fn proof_type(&self) -> &'static str {
        "Ed25519Signature2020"
    }

    fn verification_method(&self) -> Option<&str> {
        self.verification_method.as_deref()
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SuiteError> {
        let key = self.signing_key.as_ref().ok_or(SuiteError::NoSigningKey)?;
        Ok(key.sign(message).to_bytes().to_vec())
    }

    fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        let Ok(key_bytes) = <&[u8; 32]>::try_from(public_key) else {
            return false;
        };
        let Ok(key) = VerifyingKey::from_bytes(key_bytes) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        key.verify_strict(message, &signature).is_ok()
    }
}

/// Encodes bytes as multibase base58btc (`z` prefix).
pub fn multibase_encode(bytes: &[u8]) -> String {
    format!("z{}", bs58::encode(bytes).into_string())
}

/// Decodes a multibase base58btc string, `None` if malformed.
pub fn multibase_decode(value: &str) -> Option<Vec<u8>> {
    let payload = value.strip_prefix('z')?;
    bs58::decode(payload).into_vec().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn sign_then_verify_round_trip() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let public_key = signing_key.verifying_key().to_bytes();
        let suite = Ed25519Suite::signing(signing_key, "dsnp://1#0".into());

        let message = b"canonical credential bytes";
        let signature = suite.sign(message).unwrap();
        assert_eq!(signature.len(), 64);

        let verifier = Ed25519Suite::verifying();
        assert!(verifier.verify(message, &signature, &public_key));
        assert!(!verifier.verify(b"different bytes", &signature, &public_key));
    }

    #[test]
    fn verify_only_suite_cannot_sign() {
        let suite = Ed25519Suite::verifying();
        assert!(suite.verification_method().is_none());
        assert!(matches!(
            suite.sign(b"anything"),
            Err(SuiteError::NoSigningKey)
        ));
    }

    #[test]
    fn verify_rejects_malformed_key_and_signature() {
        let suite = Ed25519Suite::verifying();
        assert!(!suite.verify(b"msg", &[0u8; 64], &[0u8; 31]));
        assert!(!suite.verify(b"msg", &[0u8; 63], &[0u8; 32]));
    }

    #[test]
    fn multibase_round_trip() {
        let bytes = vec![1u8, 2, 3, 250, 255];
        let encoded = multibase_encode(&bytes);
        assert!(encoded.starts_with('z'));
        assert_eq!(multibase_decode(&encoded).unwrap(), bytes);
        assert!(multibase_decode("not-multibase").is_none());
    }
}
