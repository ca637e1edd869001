// src/graph/engine.rs
//! Follow graph mutation engine.
//!
//! Applies follow/unfollow operations to an actor's paginated follow
//! storage. Every operation re-reads the actor's current pages from the
//! chain, mutates one page in memory, and writes it back whole under the
//! page's prior content hash. Nothing is cached between operations and a
//! lost optimistic-concurrency race is surfaced, not retried; the caller
//! decides whether to re-read and try again.

use crate::blockchain::{CasOutcome, ChainClient, PageHash, StoredPage};
use crate::error::GraphError;
use crate::graph::codec::{decode_page, encode_page};
use crate::models::graph::{GraphEdge, PAGE_CAPACITY};
use chrono::Utc;
use std::sync::Arc;

/// Service applying follow graph mutations against chain storage.
pub struct GraphService {
    /// Client for the chain's stateful storage
    chain: Arc<dyn ChainClient>,

    /// Schema id of the public-follows paginated storage
    schema_id: u16,
}

impl GraphService {
    /// Creates a new GraphService.
    ///
    /// # Arguments
    /// * `chain` - chain storage client shared across services
    /// * `schema_id` - public-follows schema id for the configured network
    pub fn new(chain: Arc<dyn ChainClient>, schema_id: u16) -> Self {
        GraphService { chain, schema_id }
    }

    /// Returns the ids an actor follows, across all pages.
    ///
    /// Corrupt pages contribute nothing; see the codec's fallback.
    pub async fn public_follows(&self, msa_id: u64) -> Result<Vec<u64>, GraphError> {
        let pages = self.chain.get_paginated_pages(msa_id, self.schema_id).await?;
        Ok(pages
            .iter()
            .flat_map(|page| decode_page(&page.payload))
            .map(|edge| edge.user_id)
            .collect())
    }

    /// Records that `actor_id` follows `object_id`.
    ///
    /// Idempotent: if the edge exists on any page this is a no-op. A new
    /// edge goes to the last page while it has capacity, otherwise to a
    /// freshly allocated page.
    ///
    /// # Errors
    /// `GraphError::WriteConflict` if the page moved between read and
    /// write.
    pub async fn follow(&self, actor_id: u64, object_id: u64) -> Result<(), GraphError> {
        log::info!("follow request: actor={} object={}", actor_id, object_id);
        let pages = self.chain.get_paginated_pages(actor_id, self.schema_id).await?;
        let decoded: Vec<Vec<GraphEdge>> =
            pages.iter().map(|page| decode_page(&page.payload)).collect();

        if decoded
            .iter()
            .any(|edges| edges.iter().any(|edge| edge.user_id == object_id))
        {
            return Ok(());
        }

        let target = select_target_page(&pages, &decoded);
        let mut edges = target.edges;
        edges.push(GraphEdge {
            user_id: object_id,
            since: Utc::now().timestamp() as u64,
        });

        self.write_page(actor_id, target.page_number, target.prior_hash, &edges)
            .await
    }

    /// Removes `object_id` from `actor_id`'s follow list.
    ///
    /// A no-op, with no storage write, when the edge is absent.
    pub async fn unfollow(&self, actor_id: u64, object_id: u64) -> Result<(), GraphError> {
        log::info!("unfollow request: actor={} object={}", actor_id, object_id);
        let pages = self.chain.get_paginated_pages(actor_id, self.schema_id).await?;

        let Some((page, edges)) = pages.iter().find_map(|page| {
            let edges = decode_page(&page.payload);
            edges
                .iter()
                .any(|edge| edge.user_id == object_id)
                .then_some((page, edges))
        }) else {
            return Ok(());
        };

        let remaining: Vec<GraphEdge> = edges
            .into_iter()
            .filter(|edge| edge.user_id != object_id)
            .collect();

        self.write_page(actor_id, page.page_number, Some(page.content_hash), &remaining)
            .await
    }

    async fn write_page(
        &self,
        actor_id: u64,
        page_number: u32,
        prior_hash: Option<PageHash>,
        edges: &[GraphEdge],
    ) -> Result<(), GraphError> {
        let payload = encode_page(edges);
        match self
            .chain
            .upsert_page(actor_id, self.schema_id, page_number, prior_hash, payload)
            .await?
        {
            CasOutcome::Applied => Ok(()),
            CasOutcome::Conflict => Err(GraphError::WriteConflict { page_number }),
        }
    }
}

struct TargetPage {
    page_number: u32,
    prior_hash: Option<PageHash>,
    edges: Vec<GraphEdge>,
}

/// Picks the page a new edge lands on: the last page while it has
/// capacity, else the next page index (0 when no pages exist).
fn select_target_page(pages: &[StoredPage], decoded: &[Vec<GraphEdge>]) -> TargetPage {
    match (pages.last(), decoded.last()) {
        (Some(last), Some(edges)) if edges.len() < PAGE_CAPACITY => TargetPage {
            page_number: last.page_number,
            prior_hash: Some(last.content_hash),
            edges: edges.clone(),
        },
        (Some(last), _) => TargetPage {
            page_number: last.page_number + 1,
            prior_hash: None,
            edges: Vec::new(),
        },
        (None, _) => TargetPage {
            page_number: 0,
            prior_hash: None,
            edges: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::InMemoryChainClient;

    const SCHEMA_ID: u16 = 13;
    const ACTOR: u64 = 42;

    fn service(chain: &Arc<InMemoryChainClient>) -> GraphService {
        let _ = env_logger::builder().is_test(true).try_init();
        GraphService::new(chain.clone() as Arc<dyn ChainClient>, SCHEMA_ID)
    }

    #[tokio::test]
    async fn follow_appends_and_lists() {
        let chain = Arc::new(InMemoryChainClient::new());
        let graph = service(&chain);

        graph.follow(ACTOR, 100).await.unwrap();
        graph.follow(ACTOR, 101).await.unwrap();

        assert_eq!(graph.public_follows(ACTOR).await.unwrap(), vec![100, 101]);
        let pages = chain.get_paginated_pages(ACTOR, SCHEMA_ID).await.unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[tokio::test]
    async fn follow_is_idempotent() {
        let chain = Arc::new(InMemoryChainClient::new());
        let graph = service(&chain);

        graph.follow(ACTOR, 100).await.unwrap();
        let writes_after_first = chain.page_write_count();
        graph.follow(ACTOR, 100).await.unwrap();

        assert_eq!(chain.page_write_count(), writes_after_first);
        assert_eq!(graph.public_follows(ACTOR).await.unwrap(), vec![100]);
    }

    #[tokio::test]
    async fn overflow_opens_a_new_page_in_order() {
        let chain = Arc::new(InMemoryChainClient::new());
        let graph = service(&chain);

        for object in 0..(PAGE_CAPACITY as u64 + 1) {
            graph.follow(ACTOR, 1000 + object).await.unwrap();
        }

        let pages = chain.get_paginated_pages(ACTOR, SCHEMA_ID).await.unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 0);
        assert_eq!(decode_page(&pages[0].payload).len(), PAGE_CAPACITY);
        let overflow = decode_page(&pages[1].payload);
        assert_eq!(overflow.len(), 1);
        assert_eq!(overflow[0].user_id, 1000 + PAGE_CAPACITY as u64);

        // Insertion order is preserved across the page boundary.
        let all = graph.public_follows(ACTOR).await.unwrap();
        let expected: Vec<u64> = (0..(PAGE_CAPACITY as u64 + 1)).map(|o| 1000 + o).collect();
        assert_eq!(all, expected);
    }

    #[tokio::test]
    async fn unfollow_removes_from_the_owning_page() {
        let chain = Arc::new(InMemoryChainClient::new());
        let graph = service(&chain);

        graph.follow(ACTOR, 100).await.unwrap();
        graph.follow(ACTOR, 101).await.unwrap();
        graph.follow(ACTOR, 102).await.unwrap();
        graph.unfollow(ACTOR, 101).await.unwrap();

        assert_eq!(graph.public_follows(ACTOR).await.unwrap(), vec![100, 102]);
    }

    #[tokio::test]
    async fn unfollow_without_pages_writes_nothing() {
        let chain = Arc::new(InMemoryChainClient::new());
        let graph = service(&chain);

        graph.unfollow(ACTOR, 999).await.unwrap();
        assert_eq!(chain.page_write_count(), 0);
    }

    #[tokio::test]
    async fn unfollow_of_unknown_object_writes_nothing() {
        let chain = Arc::new(InMemoryChainClient::new());
        let graph = service(&chain);

        graph.follow(ACTOR, 100).await.unwrap();
        let writes = chain.page_write_count();
        graph.unfollow(ACTOR, 999).await.unwrap();
        assert_eq!(chain.page_write_count(), writes);
    }

    #[tokio::test]
    async fn stale_page_write_surfaces_a_conflict() {
        let chain = Arc::new(InMemoryChainClient::new());
        let graph = service(&chain);
        graph.follow(ACTOR, 100).await.unwrap();

        // Read the page, then let another writer move it on.
        let stale = chain.get_paginated_pages(ACTOR, SCHEMA_ID).await.unwrap();
        let concurrent = encode_page(&[
            GraphEdge { user_id: 100, since: 1 },
            GraphEdge { user_id: 7, since: 2 },
        ]);
        chain
            .upsert_page(ACTOR, SCHEMA_ID, 0, Some(stale[0].content_hash), concurrent)
            .await
            .unwrap();

        // A write keyed by the now-stale hash loses the race.
        let err = graph
            .write_page(ACTOR, 0, Some(stale[0].content_hash), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::WriteConflict { page_number: 0 }));
    }

    #[tokio::test]
    async fn corrupt_page_does_not_block_the_follow_list() {
        let chain = Arc::new(InMemoryChainClient::new());
        let graph = service(&chain);

        chain
            .upsert_page(ACTOR, SCHEMA_ID, 0, None, "0xdeadbeef".into())
            .await
            .unwrap();
        graph.follow(ACTOR, 100).await.unwrap();

        // The corrupt page reads as empty; the new edge landed on it.
        assert_eq!(graph.public_follows(ACTOR).await.unwrap(), vec![100]);
    }
}
