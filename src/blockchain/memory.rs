// src/blockchain/memory.rs
//! In-memory chain storage backend.
//!
//! Backs local development and tests with the same compare-and-swap
//! semantics the real chain enforces. Content hashes are computed over the
//! page payload and are opaque to callers.

use crate::blockchain::client::{CasOutcome, ChainClient, ItemizedRecord, PageHash, StoredPage};
use crate::error::ChainError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    itemized: HashMap<(u64, u16), Vec<ItemizedRecord>>,
    pages: HashMap<(u64, u16), BTreeMap<u32, (PageHash, String)>>,
    page_writes: usize,
}

/// A `ChainClient` holding all storage in process memory.
#[derive(Default)]
pub struct InMemoryChainClient {
    state: Mutex<State>,
}

impl InMemoryChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to an actor's itemized storage.
    ///
    /// Used to seed assertion-method public keys the way a chain genesis
    /// or key-announcement script would.
    pub fn add_itemized_record(&self, msa_id: u64, schema_id: u16, payload: Vec<u8>) {
        let mut state = self.state.lock().unwrap();
        state
            .itemized
            .entry((msa_id, schema_id))
            .or_default()
            .push(ItemizedRecord { payload });
    }

    /// Number of accepted page writes since construction.
    pub fn page_write_count(&self) -> usize {
        self.state.lock().unwrap().page_writes
    }
}

// FNV-1a, truncated; hash identity only matters within this backend.
fn content_hash(payload: &str) -> PageHash {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in payload.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    PageHash(hash)
}

#[async_trait]
impl ChainClient for InMemoryChainClient {
    async fn get_itemized_records(
        &self,
        msa_id: u64,
        schema_id: u16,
    ) -> Result<Vec<ItemizedRecord>, ChainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .itemized
            .get(&(msa_id, schema_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_paginated_pages(
        &self,
        msa_id: u64,
        schema_id: u16,
    ) -> Result<Vec<StoredPage>, ChainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .pages
            .get(&(msa_id, schema_id))
            .map(|pages| {
                pages
                    .iter()
                    .map(|(page_number, (content_hash, payload))| StoredPage {
                        page_number: *page_number,
                        content_hash: *content_hash,
                        payload: payload.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upsert_page(
        &self,
        msa_id: u64,
        schema_id: u16,
        page_number: u32,
        prior_hash: Option<PageHash>,
        payload: String,
    ) -> Result<CasOutcome, ChainError> {
        let mut state = self.state.lock().unwrap();
        let pages = state.pages.entry((msa_id, schema_id)).or_default();

        let current = pages.get(&page_number).map(|(hash, _)| *hash);
        if current != prior_hash {
            return Ok(CasOutcome::Conflict);
        }

        pages.insert(page_number, (content_hash(&payload), payload));
        state.page_writes += 1;
        Ok(CasOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_rejects_stale_hash() {
        let chain = InMemoryChainClient::new();

        let first = chain
            .upsert_page(1, 13, 0, None, "0x00".into())
            .await
            .unwrap();
        assert_eq!(first, CasOutcome::Applied);

        // A second create against the now-existing page must conflict.
        let stale = chain
            .upsert_page(1, 13, 0, None, "0x01".into())
            .await
            .unwrap();
        assert_eq!(stale, CasOutcome::Conflict);

        let current = chain.get_paginated_pages(1, 13).await.unwrap();
        assert_eq!(current.len(), 1);
        let replaced = chain
            .upsert_page(1, 13, 0, Some(current[0].content_hash), "0x01".into())
            .await
            .unwrap();
        assert_eq!(replaced, CasOutcome::Applied);
        assert_eq!(chain.page_write_count(), 2);
    }

    #[tokio::test]
    async fn itemized_records_keep_insertion_order() {
        let chain = InMemoryChainClient::new();
        chain.add_itemized_record(5, 18, vec![0xed, 0x01, 0xaa]);
        chain.add_itemized_record(5, 18, vec![0xed, 0x01, 0xbb]);

        let records = chain.get_itemized_records(5, 18).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].payload[2], 0xaa);
        assert_eq!(records[1].payload[2], 0xbb);

        assert!(chain.get_itemized_records(6, 18).await.unwrap().is_empty());
    }
}
