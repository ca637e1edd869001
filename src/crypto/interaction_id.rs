// src/crypto/interaction_id.rs
//! Interaction id derivation.
//!
//! An interaction id commits a DSNP user id and a random nonce:
//! blake2b-256 over the concatenation, prefixed with the blake2b-256
//! multicodec value, multibase base58btc encoded. Verifiers that hold the
//! nonce can recompute and compare.

use crate::crypto::suite::{multibase_decode, multibase_encode};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use rand::RngCore;

type Blake2b256 = Blake2b<U32>;

// blake2b-256 from the multicodec table, varint encoded.
const BLAKE2B_256_MULTICODEC: [u8; 3] = [0xa0, 0xe4, 0x02];

/// Length of a freshly generated nonce.
pub const NONCE_LENGTH: usize = 24;

/// Derives the interaction id for a user id and raw nonce bytes.
pub fn make_interaction_id(dsnp_id: &str, nonce: &[u8]) -> String {
    let mut hasher = Blake2b256::new();
    hasher.update(dsnp_id.as_bytes());
    hasher.update(nonce);
    let digest = hasher.finalize();

    let mut bytes = Vec::with_capacity(BLAKE2B_256_MULTICODEC.len() + digest.len());
    bytes.extend_from_slice(&BLAKE2B_256_MULTICODEC);
    bytes.extend_from_slice(&digest);
    multibase_encode(&bytes)
}

/// Derives a fresh interaction id with a random nonce.
///
/// # Returns
/// `(interaction_id, nonce)`, both multibase base58btc encoded.
pub fn make_interaction_id_and_nonce(dsnp_id: &str) -> (String, String) {
    let mut nonce = [0u8; NONCE_LENGTH];
    rand::thread_rng().fill_bytes(&mut nonce);
    (
        make_interaction_id(dsnp_id, &nonce),
        multibase_encode(&nonce),
    )
}

/// Checks an interaction id against a user id and its multibase nonce.
pub fn verify_interaction_id(interaction_id: &str, dsnp_id: &str, nonce_multibase: &str) -> bool {
    match multibase_decode(nonce_multibase) {
        Some(nonce) => make_interaction_id(dsnp_id, &nonce) == interaction_id,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_ids_verify_round_trip() {
        let (interaction_id, nonce) = make_interaction_id_and_nonce("123");
        assert!(interaction_id.starts_with('z'));
        assert!(verify_interaction_id(&interaction_id, "123", &nonce));
    }

    #[test]
    fn wrong_user_or_nonce_fails_verification() {
        let (interaction_id, nonce) = make_interaction_id_and_nonce("123");
        assert!(!verify_interaction_id(&interaction_id, "124", &nonce));

        let (_, other_nonce) = make_interaction_id_and_nonce("123");
        assert!(!verify_interaction_id(&interaction_id, "123", &other_nonce));
        assert!(!verify_interaction_id(&interaction_id, "123", "garbage"));
    }

    #[test]
    fn ids_are_deterministic_for_a_fixed_nonce() {
        let nonce = [7u8; NONCE_LENGTH];
        assert_eq!(
            make_interaction_id("42", &nonce),
            make_interaction_id("42", &nonce)
        );
        assert_ne!(
            make_interaction_id("42", &nonce),
            make_interaction_id("43", &nonce)
        );
    }
}
