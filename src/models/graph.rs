// src/models/graph.rs
//! Follow graph data model.

use serde::{Deserialize, Serialize};

/// Maximum number of edges a single follow page can hold.
pub const PAGE_CAPACITY: usize = 93;

/// A single directed follow edge stored in a graph page.
///
/// Edges are ordered within a page and unique by `user_id`; a user id
/// appears in at most one page across an actor's whole page set.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    /// MSA id of the followed user.
    pub user_id: u64,

    /// Unix timestamp (seconds) of when the follow was recorded.
    pub since: u64,
}
