// src/blockchain/mod.rs

pub mod client;
pub mod memory;

pub use client::{CasOutcome, ChainClient, ItemizedRecord, PageHash, StoredPage};
pub use memory::InMemoryChainClient;
