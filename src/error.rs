// src/error.rs
//! Error taxonomy for the gateway core.
//!
//! Expected-invalid credential conditions are not errors: the verifier
//! reports them as `Ok(false)`. The types here cover genuine failures
//! (network, chain, misconfiguration) and the graph engine's concurrency
//! conflicts.

use thiserror::Error;

/// Document resolution failures.
///
/// Raised when a URI is neither a well-known short-circuit, a registered
/// schema document, nor fetchable from the network.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The network fetch itself failed (connection, TLS, bad status).
    #[error("failed to fetch document at {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The fetched body was not a JSON document.
    #[error("document at {url} is not valid JSON: {source}")]
    Json {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Signature suite failures.
#[derive(Debug, Error)]
pub enum SuiteError {
    /// A verify-only suite instance was asked to sign.
    #[error("signature suite holds no signing key")]
    NoSigningKey,

    /// A suite without a verification method was used for issuance.
    #[error("signature suite holds no verification method")]
    NoVerificationMethod,
}

/// Credential issuance failures. Fatal to the issuance request; no retry.
#[derive(Debug, Error)]
pub enum IssueError {
    /// The credential already carries a proof.
    #[error("credential is already signed")]
    AlreadySigned,

    #[error(transparent)]
    Resolution(#[from] ResolveError),

    #[error(transparent)]
    Suite(#[from] SuiteError),

    #[error("credential serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Unexpected failures during credential verification.
///
/// Expected-invalid credentials yield `Ok(false)` from the verifier, never
/// this type.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    /// A schema-credential embeds a JSON Schema that does not compile.
    #[error("embedded json schema does not compile: {0}")]
    SchemaCompile(String),

    #[error("credential serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Chain collaborator failures.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("chain query failed: {0}")]
    Rpc(String),
}

/// Graph mutation failures.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The page write lost an optimistic-concurrency race. Not retried
    /// here; the caller decides whether to re-read and retry.
    #[error("follow page {page_number} was modified concurrently")]
    WriteConflict { page_number: u32 },
}

/// Interaction submission failures, mapped by the HTTP layer to
/// authorization-style rejections.
#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("attribute set type '{0}' is malformed")]
    InvalidAttributeSetType(String),

    /// No checker registered for the requested attribute set type.
    #[error("no entitlement checker is registered for '{0}'")]
    UnknownAttributeSetType(String),

    /// The checker ran and declined the request.
    #[error("request is not entitled to '{0}'")]
    NotEntitled(String),

    /// The checker itself failed.
    #[error(transparent)]
    Checker(#[from] anyhow::Error),

    #[error(transparent)]
    Issuance(#[from] IssueError),
}

/// Process-level misconfiguration, fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),

    #[error("{var} is invalid: {reason}")]
    InvalidVar { var: &'static str, reason: String },

    /// A credential schema document may be registered only once.
    #[error("a credential schema is already registered for '{0}'")]
    DuplicateSchema(String),

    /// One entitlement checker per attribute set type.
    #[error("an entitlement checker is already registered for '{0}'")]
    DuplicateChecker(String),
}
