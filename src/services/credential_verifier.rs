// src/services/credential_verifier.rs
//! Credential verification service.
//!
//! Verifies interaction tickets end to end: proof structure, on-chain key
//! lookup, signature, expiration, and the schema trust chain. Expected
//! invalidity is reported as `Ok(false)`; only genuine I/O or parsing
//! failures surface as errors.
//!
//! Schema trust is recursive: an ordinary credential references a
//! schema-credential, which is itself verified with the same algorithm
//! and terminates at the well-known meta-schema for schemas. The walk
//! carries an explicit depth budget and fails closed when it runs out, so
//! a cyclic schema reference verifies as invalid instead of looping.

use crate::blockchain::ChainClient;
use crate::crypto::canonical;
use crate::crypto::suite::{multibase_decode, Ed25519Suite, SignatureSuite};
use crate::error::VerifyError;
use crate::models::credential::{
    parse_dsnp_user_uri, SchemaCredentialSubject, VerifiableCredential,
};
use crate::resolver::DocumentResolver;
use chrono::{DateTime, Utc};
use jsonschema::JSONSchema;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Schema id that marks a credential as a schema-credential: the
/// meta-schema for schemas. Verification of such a credential needs no
/// further schema check, terminating the trust recursion.
pub const META_SCHEMA_URL: &str =
    "https://www.w3.org/2022/credentials/v2/json-schema-credential-schema.json";

/// Default budget for the schema trust walk.
pub const DEFAULT_MAX_SCHEMA_DEPTH: usize = 8;

// 0xed varint: Ed25519 public key from the multicodec table.
const ED25519_MULTICODEC_PREFIX: [u8; 2] = [0xed, 0x01];

/// Service verifying signed credentials against chain state and the
/// schema trust chain.
pub struct CredentialVerifier {
    /// Resolver for contexts and schema-credential documents
    resolver: Arc<DocumentResolver>,

    /// Client used to look up issuers' assertion-method keys
    chain: Arc<dyn ChainClient>,

    /// Schema id of the itemized assertion-method key storage
    key_schema_id: u16,

    /// Suite checked against proofs and used for signature verification
    suite: Arc<dyn SignatureSuite>,

    /// Remaining-depth budget for the schema trust walk
    max_schema_depth: usize,
}

impl CredentialVerifier {
    /// Creates a new CredentialVerifier with the default Ed25519 suite
    /// and depth budget.
    ///
    /// # Arguments
    /// * `resolver` - document resolver shared with issuance
    /// * `chain` - chain storage client for key lookups
    /// * `key_schema_id` - assertion-method key schema id
    pub fn new(
        resolver: Arc<DocumentResolver>,
        chain: Arc<dyn ChainClient>,
        key_schema_id: u16,
    ) -> Self {
        CredentialVerifier {
            resolver,
            chain,
            key_schema_id,
            suite: Arc::new(Ed25519Suite::verifying()),
            max_schema_depth: DEFAULT_MAX_SCHEMA_DEPTH,
        }
    }

    /// Overrides the schema trust walk depth budget.
    pub fn with_max_schema_depth(mut self, max_schema_depth: usize) -> Self {
        self.max_schema_depth = max_schema_depth;
        self
    }

    /// Verifies a signed credential.
    ///
    /// # Returns
    /// - `Ok(true)` only when every check passes
    /// - `Ok(false)` for any expected-invalid condition (bad issuer or
    ///   proof shape, unknown key, signature mismatch, expiration, schema
    ///   mismatch, schema validation failure)
    ///
    /// # Errors
    /// `VerifyError` for chain or resolver failures.
    pub async fn verify(&self, credential: &VerifiableCredential) -> Result<bool, VerifyError> {
        self.verify_bounded(credential.clone(), self.max_schema_depth)
            .await
    }

    fn verify_bounded(
        &self,
        credential: VerifiableCredential,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = Result<bool, VerifyError>> + Send + '_>> {
        Box::pin(async move {
            // Issuer must be a DSNP user URI.
            let Some(issuer_id) = parse_dsnp_user_uri(&credential.issuer) else {
                log::debug!("issuer '{}' is not a DSNP user URI", credential.issuer);
                return Ok(false);
            };

            // Proof must be from the issuer: verification method is the
            // issuer URI plus a key index.
            let Some(proof) = credential.proof.clone() else {
                return Ok(false);
            };
            if proof.proof_type != self.suite.proof_type()
                || proof.proof_purpose != canonical::PROOF_PURPOSE
            {
                return Ok(false);
            }
            let prefix = format!("{}#", credential.issuer);
            let Some(key_suffix) = proof.verification_method.strip_prefix(&prefix) else {
                log::debug!(
                    "proof verification method '{}' does not belong to issuer '{}'",
                    proof.verification_method,
                    credential.issuer
                );
                return Ok(false);
            };
            let Ok(key_index) = key_suffix.parse::<u32>() else {
                return Ok(false);
            };

            // Resolve the issuer's public key from itemized storage.
            let records = self
                .chain
                .get_itemized_records(issuer_id, self.key_schema_id)
                .await?;
            let Some(record) = records.get(key_index as usize) else {
                log::debug!("issuer {} has no key at index {}", issuer_id, key_index);
                return Ok(false);
            };
            let Some(public_key) = record.payload.strip_prefix(&ED25519_MULTICODEC_PREFIX[..])
            else {
                return Ok(false);
            };
            if public_key.len() != 32 {
                return Ok(false);
            }

            // Check the signature over the canonical form.
            let mut document = credential.clone();
            document.proof = None;
            let document = serde_json::to_value(&document)?;
            let config = canonical::proof_config(
                &proof.proof_type,
                &proof.created,
                &proof.verification_method,
            );
            let input = canonical::signing_input(&document, &config, &self.resolver).await?;
            let Some(signature) = multibase_decode(&proof.proof_value) else {
                return Ok(false);
            };
            if !self.suite.verify(&input, &signature, public_key) {
                return Ok(false);
            }

            // Reject expired credentials.
            if let Some(expiration) = &credential.expiration_date {
                match DateTime::parse_from_rfc3339(expiration) {
                    Ok(expires) if expires.with_timezone(&Utc) < Utc::now() => return Ok(false),
                    Ok(_) => {}
                    Err(_) => return Ok(false),
                }
            }

            // Schema references are HTTPS URLs.
            if !credential.credential_schema.id.starts_with("https://") {
                return Ok(false);
            }

            // Base case: the credential under test is itself a
            // schema-credential.
            if credential.credential_schema.id == META_SCHEMA_URL {
                return Ok(true);
            }

            if depth == 0 {
                log::warn!(
                    "schema trust chain for '{}' exceeded the depth budget",
                    credential.credential_schema.id
                );
                return Ok(false);
            }

            // Resolve and check the governing schema-credential.
            let schema_document = self.resolver.resolve(&credential.credential_schema.id).await?;
            let Ok(schema_credential) =
                serde_json::from_value::<VerifiableCredential>(schema_document)
            else {
                log::debug!(
                    "document at '{}' is not a credential",
                    credential.credential_schema.id
                );
                return Ok(false);
            };
            if !schema_credential
                .credential_type
                .iter()
                .any(|label| label == "JsonSchemaCredential")
            {
                return Ok(false);
            }
            let Ok(subject) = serde_json::from_value::<SchemaCredentialSubject>(
                schema_credential.credential_subject.clone(),
            ) else {
                return Ok(false);
            };
            let Some(title) = subject.json_schema.get("title").and_then(|v| v.as_str()) else {
                return Ok(false);
            };
            if !credential.credential_type.iter().any(|label| label == title) {
                return Ok(false);
            }

            // The schema-credential must itself verify.
            if !self.verify_bounded(schema_credential, depth - 1).await? {
                return Ok(false);
            }

            // Finally, the credential must satisfy the embedded schema.
            let compiled = JSONSchema::compile(&subject.json_schema)
                .map_err(|e| VerifyError::SchemaCompile(e.to_string()))?;
            let instance = serde_json::to_value(&credential)?;
            if !compiled.is_valid(&instance) {
                log::debug!(
                    "credential does not satisfy schema '{}'",
                    credential.credential_schema.id
                );
                return Ok(false);
            }

            Ok(true)
        })
    }
}
