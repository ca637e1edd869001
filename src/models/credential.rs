// src/models/credential.rs
//! Verifiable Credential data model implementation.
//!
//! Defines the structure of the interaction tickets this gateway issues and
//! verifies, following the [W3C Verifiable Credentials Data Model](https://www.w3.org/TR/vc-data-model/)
//! with DSNP user URIs as issuers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Verifiable Credential, unsigned or signed.
///
/// The unsigned form has `proof: None`; issuance attaches the proof exactly
/// once and the credential is never mutated afterward. Schema-credentials
/// (credentials whose subject embeds a JSON Schema) use the same shape and
/// are fetched, not owned, by the verifier.
///
/// # Serialization
/// Serializes to the wire JSON shape: camelCase fields, `@context` as an
/// ordered array whose first entry is the base VC context. Fields this
/// model does not enumerate (for example `digestSRI` on published schema
/// documents) survive round trips through `extra`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    /// Ordered context references: URIs or inline vocabulary objects.
    #[serde(rename = "@context")]
    pub context: Vec<Value>,

    /// Type labels. Contains `"VerifiableCredential"` plus the domain type.
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,

    /// DSNP user URI of the issuer.
    /// Example: "dsnp://13972"
    pub issuer: String,

    /// ISO-8601 timestamp of issuance.
    pub issuance_date: String,

    /// Optional ISO-8601 expiration timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    /// Reference to the schema-credential governing this credential's shape.
    pub credential_schema: CredentialSchemaRef,

    /// Domain payload: an interaction subject, or for schema-credentials an
    /// embedded JSON Schema plus display/trust metadata.
    pub credential_subject: Value,

    /// Cryptographic proof; present only on the signed form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,

    /// Fields outside the modeled set, preserved for re-canonicalization.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Reference to the credential's governing schema document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSchemaRef {
    /// Schema reference type label.
    /// Example: "VerifiableCredentialSchema2023"
    #[serde(rename = "type")]
    pub schema_type: String,

    /// HTTPS URL identifying the schema-credential.
    pub id: String,

    /// Fields outside the modeled set (for example `digestSRI`).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A data-integrity proof block.
///
/// `verification_method` is constrained to `"<issuer>#<keyIndex>"` where
/// the suffix indexes the issuer's on-chain assertion-method key list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Signature suite type label.
    /// Example: "Ed25519Signature2020"
    #[serde(rename = "type")]
    pub proof_type: String,

    /// ISO-8601 timestamp of proof creation.
    pub created: String,

    /// Key reference: issuer URI, `#`, key index.
    /// Example: "dsnp://13972#0"
    pub verification_method: String,

    /// Always "assertionMethod" for credentials issued here.
    pub proof_purpose: String,

    /// Multibase base58btc signature value.
    pub proof_value: String,
}

/// The credential subject of an interaction ticket.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InteractionSubject {
    /// Content-derived interaction identifier (multibase).
    pub interaction_id: String,

    /// Link the interaction refers to.
    pub href: String,

    /// Opaque checker-defined reference object.
    pub reference: Value,
}

/// The credential subject of a schema-credential.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SchemaCredentialSubject {
    /// Subject type label, "JsonSchema" on published documents.
    #[serde(rename = "type")]
    pub subject_type: String,

    /// The embedded JSON Schema. Its `title` names the credential type the
    /// schema governs.
    pub json_schema: Value,

    /// DSNP display and trust metadata attached to the schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsnp: Option<Value>,
}

/// Parses a DSNP user URI of the form `dsnp://<positive-integer>`.
///
/// Leading zeros are rejected, matching the `^dsnp://[1-9][0-9]*$` shape.
///
/// # Returns
/// The MSA id, or `None` if the URI does not match.
pub fn parse_dsnp_user_uri(uri: &str) -> Option<u64> {
    let digits = uri.strip_prefix("dsnp://")?;
    if digits.is_empty() || digits.starts_with('0') {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Formats an MSA id as a DSNP user URI.
pub fn dsnp_user_uri(msa_id: u64) -> String {
    format!("dsnp://{}", msa_id)
}
