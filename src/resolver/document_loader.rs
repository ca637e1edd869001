// src/resolver/document_loader.rs
//! Credential document resolution.
//!
//! Resolves the URIs that appear in credentials: context references,
//! schema-credential URLs, and key identifiers. A fixed set of well-known
//! URIs short-circuits before any network traffic; everything else is
//! fetched over HTTP(S) and cached in a bounded LRU.

use crate::error::{ConfigError, ResolveError};
use crate::resolver::contexts;
use lru::LruCache;
use serde_json::Value;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Default capacity of the fetch cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Resolves URIs to JSON documents.
///
/// Resolution order, first match wins:
/// 1. The base credentials context
/// 2. The Ed25519-2020 suite context
/// 3. Documents registered via [`register_credential_schema`](Self::register_credential_schema)
/// 4. DID-style / DSNP-user-style URIs, answered with a synthetic key-type
///    descriptor
/// 5. Network fetch, cached by URL
///
/// Schema registration happens once at startup, before the resolver is
/// shared; the fetch cache is interior-mutable and safe for concurrent use.
pub struct DocumentResolver {
    client: reqwest::Client,

    /// Schema documents pinned at startup, keyed by URL.
    schemas: HashMap<String, Value>,

    /// Bounded cache of fetched documents.
    cache: Mutex<LruCache<String, Value>>,
}

impl DocumentResolver {
    pub fn new() -> Self {
        Self::with_cache_capacity(
            NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).expect("capacity is non-zero"),
        )
    }

    pub fn with_cache_capacity(capacity: NonZeroUsize) -> Self {
        DocumentResolver {
            client: reqwest::Client::new(),
            schemas: HashMap::new(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Pins a schema-credential document under its URL.
    ///
    /// # Errors
    /// Returns `ConfigError::DuplicateSchema` if the URL is already
    /// registered; schemas are registered exactly once at startup.
    pub fn register_credential_schema(
        &mut self,
        url: &str,
        document: Value,
    ) -> Result<(), ConfigError> {
        if self.schemas.contains_key(url) {
            return Err(ConfigError::DuplicateSchema(url.to_string()));
        }
        self.schemas.insert(url.to_string(), document);
        Ok(())
    }

    /// Resolves a URI to a JSON document.
    ///
    /// # Errors
    /// Returns `ResolveError` when the URI is neither a well-known
    /// short-circuit, a registered schema, a key-style URI, nor fetchable
    /// from the network.
    pub async fn resolve(&self, uri: &str) -> Result<Value, ResolveError> {
        if uri == contexts::CREDENTIALS_V1_CONTEXT {
            return Ok(contexts::CREDENTIALS_V1_DOCUMENT.clone());
        }
        if uri == contexts::ED25519_2020_CONTEXT {
            return Ok(contexts::ED25519_2020_DOCUMENT.clone());
        }
        if let Some(document) = self.schemas.get(uri) {
            return Ok(document.clone());
        }
        if uri.starts_with("did:") || uri.starts_with("dsnp://") {
            return Ok(contexts::key_descriptor_document(uri));
        }

        if let Some(document) = self.cache.lock().unwrap().get(uri) {
            return Ok(document.clone());
        }

        log::debug!("fetching document {}", uri);
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| ResolveError::Fetch {
                url: uri.to_string(),
                source,
            })?;
        let document: Value = response.json().await.map_err(|source| ResolveError::Json {
            url: uri.to_string(),
            source,
        })?;

        self.cache
            .lock()
            .unwrap()
            .put(uri.to_string(), document.clone());
        Ok(document)
    }
}

impl Default for DocumentResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn resolves_well_known_contexts_offline() {
        let resolver = DocumentResolver::new();

        let base = resolver
            .resolve(contexts::CREDENTIALS_V1_CONTEXT)
            .await
            .unwrap();
        assert!(base.get("@context").is_some());

        let suite = resolver
            .resolve(contexts::ED25519_2020_CONTEXT)
            .await
            .unwrap();
        assert!(suite["@context"].get("Ed25519Signature2020").is_some());
    }

    #[tokio::test]
    async fn registered_schema_wins_over_fetch() {
        let mut resolver = DocumentResolver::new();
        let url = "https://ondc.org/schema/interactions/ProofOfPurchase.json";
        resolver
            .register_credential_schema(url, json!({"type": ["VerifiableCredential"]}))
            .unwrap();

        // No server behind that URL; resolution must still succeed.
        let document = resolver.resolve(url).await.unwrap();
        assert_eq!(document["type"][0], "VerifiableCredential");
    }

    #[tokio::test]
    async fn duplicate_schema_registration_is_fatal() {
        let mut resolver = DocumentResolver::new();
        let url = "https://example.org/schema.json";
        resolver
            .register_credential_schema(url, json!({}))
            .unwrap();

        let err = resolver
            .register_credential_schema(url, json!({}))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSchema(u) if u == url));
    }

    #[tokio::test]
    async fn user_uris_get_synthetic_key_descriptors() {
        let resolver = DocumentResolver::new();

        let descriptor = resolver.resolve("dsnp://13972#0").await.unwrap();
        assert_eq!(descriptor["type"], "Ed25519VerificationKey2020");
        assert_eq!(descriptor["id"], "dsnp://13972#0");

        let did = resolver.resolve("did:web:example.org").await.unwrap();
        assert_eq!(did["type"], "Ed25519VerificationKey2020");
    }

    #[tokio::test]
    async fn fetches_and_caches_network_documents() {
        let body = r#"{"title": "RemoteSchema"}"#;
        let mock = mockito::mock("GET", "/doc.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(1)
            .create();
        let url = format!("{}/doc.json", mockito::server_url());

        let resolver = DocumentResolver::new();
        let first = resolver.resolve(&url).await.unwrap();
        assert_eq!(first["title"], "RemoteSchema");

        // Second resolve is served from cache; the mock allows one hit.
        let second = resolver.resolve(&url).await.unwrap();
        assert_eq!(second, first);
        mock.assert();
    }

    #[tokio::test]
    async fn missing_document_is_a_resolution_error() {
        let _mock = mockito::mock("GET", "/gone.json")
            .with_status(404)
            .create();
        let url = format!("{}/gone.json", mockito::server_url());

        let resolver = DocumentResolver::new();
        let err = resolver.resolve(&url).await.unwrap_err();
        assert!(matches!(err, ResolveError::Fetch { .. }));
    }
}
