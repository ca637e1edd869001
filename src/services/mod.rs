// src/services/mod.rs

pub mod credential_issuer;
pub mod credential_verifier;
pub mod entitlement;
pub mod interaction;
