// src/crypto/canonical.rs
//! Canonical serialization of credentials for signing.
//!
//! Both issuance and verification must derive the same bytes from a
//! credential, so the byte form is produced here and nowhere else: the
//! canonical JSON of the proof configuration, a newline, the canonical
//! JSON of the proofless document, a newline. Canonical JSON sorts object
//! keys lexicographically and uses compact scalar formatting.
//!
//! Every string entry of the document's `@context` must resolve through
//! the [`DocumentResolver`] before the form is produced; an unresolvable
//! context fails the whole operation.

use crate::error::ResolveError;
use crate::resolver::DocumentResolver;
use serde_json::Value;

/// Proof purpose carried by every proof this gateway creates or accepts.
pub const PROOF_PURPOSE: &str = "assertionMethod";

/// Builds the proof configuration document that gets signed alongside the
/// credential.
pub fn proof_config(proof_type: &str, created: &str, verification_method: &str) -> Value {
    serde_json::json!({
        "type": proof_type,
        "created": created,
        "proofPurpose": PROOF_PURPOSE,
        "verificationMethod": verification_method,
    })
}

/// Produces the byte input handed to the signature suite.
///
/// # Arguments
/// * `document` - the credential JSON without its `proof`
/// * `config` - the proof configuration from [`proof_config`]
///
/// # Errors
/// Returns `ResolveError` if any `@context` string entry cannot be
/// resolved.
pub async fn signing_input(
    document: &Value,
    config: &Value,
    resolver: &DocumentResolver,
) -> Result<Vec<u8>, ResolveError> {
    if let Some(entries) = document.get("@context").and_then(Value::as_array) {
        for entry in entries {
            if let Some(uri) = entry.as_str() {
                resolver.resolve(uri).await?;
            }
        }
    }

    let mut input = Vec::new();
    input.extend_from_slice(canonical_json(config).as_bytes());
    input.push(b'\n');
    input.extend_from_slice(canonical_json(document).as_bytes());
    input.push(b'\n');
    Ok(input)
}

/// Serializes a JSON value with lexicographically sorted object keys.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (index, key) in keys.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        // Scalars already have a single compact form.
        scalar => out.push_str(&scalar.to_string()),
    }
}
