// src/services/credential_issuer.rs
//! Credential Issuer Service
//!
//! Signs unsigned credentials: canonicalizes the credential with context
//! resolution through the document resolver, computes the suite signature
//! over the canonical bytes, and attaches the proof block. Issuance has no
//! side effects beyond resolver fetches; the signed credential is returned
//! to the caller and never mutated afterward.

use crate::crypto::canonical;
use crate::crypto::suite::{multibase_encode, SignatureSuite};
use crate::error::{IssueError, SuiteError};
use crate::models::credential::{Proof, VerifiableCredential};
use crate::resolver::DocumentResolver;
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;

/// Service producing signed credentials.
pub struct CredentialIssuer {
    /// Resolver shared with verification; gates context references
    resolver: Arc<DocumentResolver>,
}

impl CredentialIssuer {
    /// Creates a new CredentialIssuer.
    ///
    /// # Arguments
    /// * `resolver` - document resolver used for context expansion
    pub fn new(resolver: Arc<DocumentResolver>) -> Self {
        CredentialIssuer { resolver }
    }

    /// Signs an unsigned credential with the given suite.
    ///
    /// The proof's verification method comes from the suite; its purpose
    /// is always "assertionMethod" and `created` is the signing time.
    ///
    /// # Errors
    /// Returns `IssueError` if the credential is already signed, a context
    /// cannot be resolved, or the suite cannot sign. No retry; failures
    /// are fatal to the issuance request.
    pub async fn issue(
        &self,
        credential: &VerifiableCredential,
        suite: &dyn SignatureSuite,
    ) -> Result<VerifiableCredential, IssueError> {
        if credential.proof.is_some() {
            return Err(IssueError::AlreadySigned);
        }
        let verification_method = suite
            .verification_method()
            .ok_or(SuiteError::NoVerificationMethod)?
            .to_string();

        let created = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let config = canonical::proof_config(suite.proof_type(), &created, &verification_method);
        let document = serde_json::to_value(credential)?;

        let input = canonical::signing_input(&document, &config, &self.resolver).await?;
        let signature = suite.sign(&input)?;

        let mut signed = credential.clone();
        signed.proof = Some(Proof {
            proof_type: suite.proof_type().to_string(),
            created,
            verification_method,
            proof_purpose: canonical::PROOF_PURPOSE.to_string(),
            proof_value: multibase_encode(&signature),
        });
        Ok(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::suite::{multibase_decode, Ed25519Suite};
    use crate::models::credential::CredentialSchemaRef;
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;
    use serde_json::json;

    fn unsigned_ticket() -> VerifiableCredential {
        VerifiableCredential {
            context: vec![
                json!("https://www.w3.org/2018/credentials/v1"),
                json!({"@vocab": "dsnp://1#"}),
            ],
            credential_type: vec!["OndcProofOfPurchase".into(), "VerifiableCredential".into()],
            issuer: "dsnp://1".into(),
            issuance_date: "2024-03-01T00:00:00.000Z".into(),
            expiration_date: None,
            credential_schema: CredentialSchemaRef {
                schema_type: "VerifiableCredentialSchema2023".into(),
                id: "https://ondc.org/schema/interactions/ProofOfPurchase.json".into(),
                extra: Default::default(),
            },
            credential_subject: json!({
                "interactionId": "abc",
                "href": "https://x",
                "reference": {"hello": "world"}
            }),
            proof: None,
            extra: Default::default(),
        }
    }

    #[tokio::test]
    async fn issue_attaches_a_well_formed_proof() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let public_key = signing_key.verifying_key().to_bytes();
        let suite = Ed25519Suite::signing(signing_key, "dsnp://1#0".into());
        let issuer = CredentialIssuer::new(Arc::new(DocumentResolver::new()));

        let unsigned = unsigned_ticket();
        let signed = issuer.issue(&unsigned, &suite).await.unwrap();

        let proof = signed.proof.as_ref().unwrap();
        assert_eq!(proof.proof_type, "Ed25519Signature2020");
        assert_eq!(proof.proof_purpose, "assertionMethod");
        assert_eq!(proof.verification_method, "dsnp://1#0");

        // The signature covers the canonical form reconstructed from the
        // signed credential.
        let config = canonical::proof_config(
            &proof.proof_type,
            &proof.created,
            &proof.verification_method,
        );
        let document = serde_json::to_value(&unsigned).unwrap();
        let resolver = DocumentResolver::new();
        let input = canonical::signing_input(&document, &config, &resolver)
            .await
            .unwrap();
        let signature = multibase_decode(&proof.proof_value).unwrap();
        assert!(Ed25519Suite::verifying().verify(&input, &signature, &public_key));
    }

    #[tokio::test]
    async fn issuing_twice_is_an_error() {
        let suite = Ed25519Suite::signing(SigningKey::generate(&mut OsRng), "dsnp://1#0".into());
        let issuer = CredentialIssuer::new(Arc::new(DocumentResolver::new()));

        let signed = issuer.issue(&unsigned_ticket(), &suite).await.unwrap();
        let err = issuer.issue(&signed, &suite).await.unwrap_err();
        assert!(matches!(err, IssueError::AlreadySigned));
    }

    #[tokio::test]
    async fn suite_without_verification_method_cannot_issue() {
        let issuer = CredentialIssuer::new(Arc::new(DocumentResolver::new()));
        let err = issuer
            .issue(&unsigned_ticket(), &Ed25519Suite::verifying())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IssueError::Suite(SuiteError::NoVerificationMethod)
        ));
    }
}
