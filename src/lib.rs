// src/lib.rs

//! # DSNP Provider Gateway Core
//!
//! This crate implements the core engine of a provider-side gateway for the
//! Decentralized Social Networking Protocol (DSNP): issuing and verifying
//! interaction credentials, and maintaining a user's compressed public
//! follow graph in the chain's paginated storage.
//!
//! ## Architecture Overview
//! 1. **Blockchain Layer**: the [`blockchain::ChainClient`] trait for itemized
//!    key records, paginated graph pages, and compare-and-swap page writes
//! 2. **Resolver Layer**: [`resolver::DocumentResolver`] for credential
//!    contexts, registered schema documents, and HTTPS document fetches
//! 3. **Cryptography Layer**: canonical serialization, the Ed25519 signature
//!    suite, and interaction id derivation
//! 4. **Services Layer**: credential issuance/verification, the entitlement
//!    registry, and the interaction submission flow
//! 5. **Graph Layer**: the follow-page codec and the follow/unfollow engine
//!
//! The HTTP surface, IPFS pinning, and chain transaction submission live in
//! collaborating layers; this crate exposes the interfaces they call.

// Module declarations (organized by functional domain)
pub mod blockchain; // chain storage interface and in-memory backend
pub mod config;     // environment configuration
pub mod crypto;     // signature suite, canonicalization, interaction ids
pub mod error;      // error taxonomy
pub mod graph;      // follow graph codec and mutation engine
pub mod models;     // data structures
pub mod resolver;   // credential document resolution
pub mod services;   // business logic
