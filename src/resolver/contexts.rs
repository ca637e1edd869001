// src/resolver/contexts.rs
//! Well-known documents served without a network round trip.
//!
//! The base credentials context and the Ed25519-2020 suite context are
//! pinned here; shipping them avoids a network dependency for every
//! issuance and keeps canonicalization deterministic offline.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// URI of the base Verifiable Credentials v1 context.
pub const CREDENTIALS_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// URI of the Ed25519Signature2020 suite context.
pub const ED25519_2020_CONTEXT: &str = "https://w3id.org/security/suites/ed25519-2020/v1";

/// Pinned copy of the base credentials context document.
pub static CREDENTIALS_V1_DOCUMENT: Lazy<Value> = Lazy::new(|| {
    json!({
        "@context": {
            "@version": 1.1,
            "@protected": true,
            "id": "@id",
            "type": "@type",
            "VerifiableCredential": {
                "@id": "https://www.w3.org/2018/credentials#VerifiableCredential",
                "@context": {
                    "@version": 1.1,
                    "@protected": true,
                    "id": "@id",
                    "type": "@type",
                    "cred": "https://www.w3.org/2018/credentials#",
                    "credentialSchema": { "@id": "cred:credentialSchema", "@type": "@id" },
                    "credentialSubject": { "@id": "cred:credentialSubject", "@type": "@id" },
                    "expirationDate": { "@id": "cred:expirationDate", "@type": "xsd:dateTime" },
                    "issuanceDate": { "@id": "cred:issuanceDate", "@type": "xsd:dateTime" },
                    "issuer": { "@id": "cred:issuer", "@type": "@id" },
                    "proof": { "@id": "https://w3id.org/security#proof", "@type": "@id", "@container": "@graph" },
                    "xsd": "http://www.w3.org/2001/XMLSchema#"
                }
            }
        }
    })
});

/// Pinned copy of the Ed25519-2020 suite context document.
pub static ED25519_2020_DOCUMENT: Lazy<Value> = Lazy::new(|| {
    json!({
        "@context": {
            "@version": 1.1,
            "@protected": true,
            "id": "@id",
            "type": "@type",
            "Ed25519VerificationKey2020": {
                "@id": "https://w3id.org/security#Ed25519VerificationKey2020",
                "@context": {
                    "@protected": true,
                    "id": "@id",
                    "type": "@type",
                    "controller": { "@id": "https://w3id.org/security#controller", "@type": "@id" },
                    "publicKeyMultibase": {
                        "@id": "https://w3id.org/security#publicKeyMultibase",
                        "@type": "https://w3id.org/security#multibase"
                    }
                }
            },
            "Ed25519Signature2020": {
                "@id": "https://w3id.org/security#Ed25519Signature2020",
                "@context": {
                    "@protected": true,
                    "id": "@id",
                    "type": "@type",
                    "created": { "@id": "http://purl.org/dc/terms/created", "@type": "xsd:dateTime" },
                    "proofPurpose": {
                        "@id": "https://w3id.org/security#proofPurpose",
                        "@type": "@vocab"
                    },
                    "proofValue": {
                        "@id": "https://w3id.org/security#proofValue",
                        "@type": "https://w3id.org/security#multibase"
                    },
                    "verificationMethod": {
                        "@id": "https://w3id.org/security#verificationMethod",
                        "@type": "@id"
                    },
                    "xsd": "http://www.w3.org/2001/XMLSchema#"
                }
            }
        }
    })
});

/// Synthetic descriptor for a DID-style or DSNP-user-style URI.
///
/// Declares only the cryptographic type of the referenced verification
/// key; the key material itself comes from itemized chain storage.
pub fn key_descriptor_document(uri: &str) -> Value {
    json!({
        "@context": ED25519_2020_CONTEXT,
        "id": uri,
        "type": "Ed25519VerificationKey2020"
    })
}
