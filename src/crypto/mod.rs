// src/crypto/mod.rs

pub mod canonical;
pub mod interaction_id;
pub mod suite;

pub use suite::{Ed25519Suite, SignatureSuite};
