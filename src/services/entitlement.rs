// src/services/entitlement.rs
//! Entitlement checking for interaction ticket issuance.
//!
//! An attribute set type names a kind of interaction credential a provider
//! can vouch for, e.g. `dsnp://1#OndcProofOfPurchase`. Each type maps to
//! one checker, registered at startup; the checker evaluates a request and
//! either produces issuance parameters or declines. New entitlement
//! domains plug in through the registry without touching the issuance
//! flow.

use crate::error::ConfigError;
use crate::services::interaction::InteractionRequest;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A validated attribute set type key: `dsnp://<issuer>#<name>`.
///
/// The fragment doubles as the domain type label stamped into issued
/// tickets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSetType {
    issuer_id: u64,
    name: String,
}

impl AttributeSetType {
    /// Parses an attribute set type from its string form.
    ///
    /// # Returns
    /// `None` if the issuer part is not a DSNP user URI or the fragment
    /// is empty.
    pub fn parse(value: &str) -> Option<Self> {
        let (issuer, name) = value.split_once('#')?;
        let issuer_id = crate::models::credential::parse_dsnp_user_uri(issuer)?;
        if name.is_empty() || name.contains('#') {
            return None;
        }
        Some(AttributeSetType {
            issuer_id,
            name: name.to_string(),
        })
    }

    /// MSA id of the attribute set's defining issuer.
    pub fn issuer_id(&self) -> u64 {
        self.issuer_id
    }

    /// The fragment, used as the issued ticket's domain type.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for AttributeSetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dsnp://{}#{}", self.issuer_id, self.name)
    }
}

/// Issuance parameters produced by a successful entitlement check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitlement {
    /// URL of the schema-credential the ticket will reference.
    pub schema_url: String,

    /// Link the ticket's subject points at.
    pub href: String,
}

/// Per-request entitlement predicate for one attribute set type.
#[async_trait]
pub trait EntitlementChecker: Send + Sync {
    /// Evaluates a request.
    ///
    /// # Returns
    /// - `Ok(Some(entitlement))` when the request may be issued a ticket
    /// - `Ok(None)` when the request is not entitled
    /// - `Err` when the check itself failed
    async fn check(&self, request: &InteractionRequest) -> anyhow::Result<Option<Entitlement>>;
}

/// Registry mapping attribute set types to their checkers.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Default)]
pub struct EntitlementRegistry {
    checkers: HashMap<AttributeSetType, Arc<dyn EntitlementChecker>>,
}

impl EntitlementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a checker for an attribute set type.
    ///
    /// # Errors
    /// Returns `ConfigError::DuplicateChecker` if the type already has
    /// one; registration happens exactly once per type.
    pub fn register(
        &mut self,
        attribute_set_type: AttributeSetType,
        checker: Arc<dyn EntitlementChecker>,
    ) -> Result<(), ConfigError> {
        if self.checkers.contains_key(&attribute_set_type) {
            return Err(ConfigError::DuplicateChecker(attribute_set_type.to_string()));
        }
        self.checkers.insert(attribute_set_type, checker);
        Ok(())
    }

    /// Looks up the checker for an attribute set type.
    pub fn lookup(&self, attribute_set_type: &AttributeSetType) -> Option<Arc<dyn EntitlementChecker>> {
        self.checkers.get(attribute_set_type).cloned()
    }
}

/// Reference checker for proof-of-purchase tickets.
///
/// Accepts a request when its opaque reference object carries the
/// expected marker field, and points the ticket at a fixed schema URL.
/// Stands in for an order-lookup integration against a commerce backend.
pub struct ProofOfPurchaseChecker {
    /// Schema-credential URL for issued proof-of-purchase tickets.
    pub schema_url: String,
}

#[async_trait]
impl EntitlementChecker for ProofOfPurchaseChecker {
    async fn check(&self, request: &InteractionRequest) -> anyhow::Result<Option<Entitlement>> {
        // Example only: a real deployment validates the reference against
        // its order records.
        if request.reference.get("hello").and_then(|v| v.as_str()) != Some("world") {
            return Ok(None);
        }

        Ok(Some(Entitlement {
            schema_url: self.schema_url.clone(),
            href: request.href.clone(),
        }))
    }
}
