// src/services/interaction.rs
//! Interaction ticket submission flow.
//!
//! Ties the request path together: look up the entitlement checker for
//! the requested attribute set type, evaluate it, build the unsigned
//! ticket, and sign it with the provider's assertion-method key. The HTTP
//! layer maps [`InteractionError`] variants to its status codes: unknown
//! attribute set types are "not found", declined entitlements are
//! "unauthorized".

use crate::config::GatewayConfig;
use crate::crypto::suite::Ed25519Suite;
use crate::error::InteractionError;
use crate::models::credential::{CredentialSchemaRef, VerifiableCredential};
use crate::resolver::contexts::CREDENTIALS_V1_CONTEXT;
use crate::services::credential_issuer::CredentialIssuer;
use crate::services::entitlement::{AttributeSetType, Entitlement, EntitlementRegistry};
use chrono::{SecondsFormat, Utc};
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Schema reference type stamped into issued tickets.
const SCHEMA_REF_TYPE: &str = "VerifiableCredentialSchema2023";

/// An interaction submission, as produced by the HTTP layer.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    /// Which kind of ticket is being requested.
    /// Example: "dsnp://1#OndcProofOfPurchase"
    pub attribute_set_type: String,

    /// Content-derived interaction id minted by the caller.
    pub interaction_id: String,

    /// Link the interaction refers to.
    pub href: String,

    /// Opaque object the entitlement checker validates.
    #[serde(default)]
    pub reference: Value,
}

/// Service issuing interaction tickets to entitled requests.
pub struct InteractionService {
    registry: EntitlementRegistry,
    issuer: CredentialIssuer,
    signing_key: SigningKey,
    provider_id: u64,
    signing_key_index: u32,
}

impl InteractionService {
    /// Creates a new InteractionService.
    ///
    /// # Arguments
    /// * `config` - gateway configuration carrying the provider identity
    ///   and signing key
    /// * `registry` - entitlement registry populated at startup
    /// * `issuer` - credential issuer shared with other services
    pub fn new(
        config: &GatewayConfig,
        registry: EntitlementRegistry,
        issuer: CredentialIssuer,
    ) -> Self {
        InteractionService {
            registry,
            issuer,
            signing_key: SigningKey::from_bytes(&config.provider_key_seed),
            provider_id: config.provider_id,
            signing_key_index: config.signing_key_index,
        }
    }

    /// Handles an interaction submission.
    ///
    /// # Errors
    /// - `InvalidAttributeSetType` / `UnknownAttributeSetType` when the
    ///   requested type cannot be served
    /// - `NotEntitled` when the checker declines
    /// - `Checker` / `Issuance` for checker or signing failures
    pub async fn submit(
        &self,
        request: &InteractionRequest,
    ) -> Result<VerifiableCredential, InteractionError> {
        let set_type = AttributeSetType::parse(&request.attribute_set_type).ok_or_else(|| {
            InteractionError::InvalidAttributeSetType(request.attribute_set_type.clone())
        })?;
        let checker = self.registry.lookup(&set_type).ok_or_else(|| {
            InteractionError::UnknownAttributeSetType(request.attribute_set_type.clone())
        })?;

        let entitlement = checker
            .check(request)
            .await?
            .ok_or_else(|| InteractionError::NotEntitled(request.attribute_set_type.clone()))?;

        let unsigned = self.unsigned_ticket(&set_type, &entitlement, request);
        let suite = Ed25519Suite::signing(
            self.signing_key.clone(),
            format!("dsnp://{}#{}", self.provider_id, self.signing_key_index),
        );
        Ok(self.issuer.issue(&unsigned, &suite).await?)
    }

    /// Builds the unsigned ticket for an entitled request.
    fn unsigned_ticket(
        &self,
        set_type: &AttributeSetType,
        entitlement: &Entitlement,
        request: &InteractionRequest,
    ) -> VerifiableCredential {
        VerifiableCredential {
            context: vec![
                json!(CREDENTIALS_V1_CONTEXT),
                json!({"@vocab": format!("dsnp://{}#", self.provider_id)}),
            ],
            credential_type: vec![set_type.name().to_string(), "VerifiableCredential".into()],
            issuer: format!("dsnp://{}", self.provider_id),
            issuance_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            expiration_date: None,
            credential_schema: CredentialSchemaRef {
                schema_type: SCHEMA_REF_TYPE.into(),
                id: entitlement.schema_url.clone(),
                extra: Default::default(),
            },
            credential_subject: json!({
                "interactionId": request.interaction_id,
                "href": entitlement.href,
                "reference": request.reference,
            }),
            proof: None,
            extra: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use crate::resolver::DocumentResolver;
    use crate::services::entitlement::ProofOfPurchaseChecker;
    use serde_json::json;
    use std::sync::Arc;

    const SCHEMA_URL: &str = "https://ondc.org/schema/interactions/testnet/ProofOfPurchase.json";

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            provider_id: 1,
            network: Network::Local,
            provider_key_seed: [7u8; 32],
            signing_key_index: 0,
            public_follows_schema_id: 13,
            assertion_method_schema_id: 18,
        }
    }

    fn service() -> InteractionService {
        let mut registry = EntitlementRegistry::new();
        registry
            .register(
                AttributeSetType::parse("dsnp://1#OndcProofOfPurchase").unwrap(),
                Arc::new(ProofOfPurchaseChecker {
                    schema_url: SCHEMA_URL.into(),
                }),
            )
            .unwrap();
        let issuer = CredentialIssuer::new(Arc::new(DocumentResolver::new()));
        InteractionService::new(&test_config(), registry, issuer)
    }

    fn request(attribute_set_type: &str, reference: Value) -> InteractionRequest {
        InteractionRequest {
            attribute_set_type: attribute_set_type.into(),
            interaction_id: "zQmInteraction".into(),
            href: "https://mystore.com/item/123".into(),
            reference,
        }
    }

    #[tokio::test]
    async fn entitled_request_gets_a_signed_ticket() {
        let service = service();
        let ticket = service
            .submit(&request("dsnp://1#OndcProofOfPurchase", json!({"hello": "world"})))
            .await
            .unwrap();

        assert_eq!(ticket.issuer, "dsnp://1");
        assert_eq!(
            ticket.credential_type,
            vec!["OndcProofOfPurchase".to_string(), "VerifiableCredential".to_string()]
        );
        assert_eq!(ticket.credential_schema.id, SCHEMA_URL);
        assert_eq!(ticket.credential_subject["interactionId"], "zQmInteraction");
        assert_eq!(ticket.credential_subject["href"], "https://mystore.com/item/123");

        let proof = ticket.proof.unwrap();
        assert_eq!(proof.verification_method, "dsnp://1#0");

        // Context starts with the base context and the provider vocab.
        assert_eq!(ticket.context[0], json!(CREDENTIALS_V1_CONTEXT));
        assert_eq!(ticket.context[1], json!({"@vocab": "dsnp://1#"}));
    }

    #[tokio::test]
    async fn unknown_attribute_set_type_is_not_found() {
        let service = service();
        let err = service
            .submit(&request("dsnp://1#SomethingElse", json!({"hello": "world"})))
            .await
            .unwrap_err();
        assert!(matches!(err, InteractionError::UnknownAttributeSetType(_)));
    }

    #[tokio::test]
    async fn malformed_attribute_set_type_is_rejected() {
        let service = service();
        let err = service
            .submit(&request("OndcProofOfPurchase", json!({"hello": "world"})))
            .await
            .unwrap_err();
        assert!(matches!(err, InteractionError::InvalidAttributeSetType(_)));
    }

    #[tokio::test]
    async fn declined_entitlement_is_unauthorized() {
        let service = service();
        let err = service
            .submit(&request("dsnp://1#OndcProofOfPurchase", json!({"hello": "mars"})))
            .await
            .unwrap_err();
        assert!(matches!(err, InteractionError::NotEntitled(_)));
    }
}
