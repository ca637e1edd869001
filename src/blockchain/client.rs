// src/blockchain/client.rs
//! Chain storage interface.
//!
//! The gateway core reads the chain's per-actor stateful storage through
//! this trait and never talks to the wire protocol directly. Two storage
//! families are used:
//! - **Itemized storage**: append-only item lists, here the provider and
//!   user assertion-method public keys
//! - **Paginated storage**: capacity-bounded numbered pages, here the
//!   public follow graph
//!
//! Page writes are a typed compare-and-swap: the caller presents the
//! content hash it read, and the chain rejects the write if the page has
//! moved on. The chain's transaction sequencing provides the actual
//! serialization guarantee; nothing here retries.

use crate::error::ChainError;
use async_trait::async_trait;

/// Opaque content hash of a stored page, used for optimistic concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHash(pub u32);

/// One record of an actor's itemized storage for a given schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemizedRecord {
    /// Raw record payload. For key schemas this is multicodec-prefixed
    /// key material.
    pub payload: Vec<u8>,
}

/// One page of an actor's paginated storage for a given schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPage {
    /// Page index, unique within the actor's page set for the schema.
    pub page_number: u32,

    /// Content hash the chain currently holds for this page.
    pub content_hash: PageHash,

    /// Hex payload with `0x` prefix, as returned by the chain.
    pub payload: String,
}

/// Result of a compare-and-swap page write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The write was accepted.
    Applied,

    /// The presented prior hash was stale; the page was not written.
    Conflict,
}

/// Read/write access to the chain's stateful storage.
///
/// Implementations carry their own timeout policy; calls here do not
/// impose one.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Returns all itemized records for `(msa_id, schema_id)`, in item order.
    async fn get_itemized_records(
        &self,
        msa_id: u64,
        schema_id: u16,
    ) -> Result<Vec<ItemizedRecord>, ChainError>;

    /// Returns all existing pages for `(msa_id, schema_id)`, in page order.
    async fn get_paginated_pages(
        &self,
        msa_id: u64,
        schema_id: u16,
    ) -> Result<Vec<StoredPage>, ChainError>;

    /// Replaces a whole page, guarded by the prior content hash.
    ///
    /// # Arguments
    /// * `prior_hash` - hash read before mutating, `None` for a page that
    ///   does not exist yet
    /// * `payload` - `0x`-prefixed hex page payload
    async fn upsert_page(
        &self,
        msa_id: u64,
        schema_id: u16,
        page_number: u32,
        prior_hash: Option<PageHash>,
        payload: String,
    ) -> Result<CasOutcome, ChainError>;
}
