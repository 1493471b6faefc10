//! Canonical lock-id derivation.
//!
//! A lock-id is the BLAKE3 digest of a fixed-width encoding of the swap
//! parameter tuple. Every field has a constant width, so no two distinct
//! tuples can produce the same byte string:
//!
//! ```text
//! tag(1) ‖ token(20) ‖ sender(20) ‖ recipient(20) ‖ hashed_secret(32) ‖ timeout_be(8)
//! ```
//!
//! The tag byte is 0x00 for native locks and 0x01 for token locks, and the
//! token field is zeroed for native, so a token lock-id is always distinct
//! from a native lock-id with otherwise identical parameters.

use swapx_core::constants::LOCK_ENCODING_LEN;
use swapx_core::types::{Digest, LockId, Principal, Timestamp, TokenId};

use crate::hash::blake3_hash;

/// Fixed-width encoding of the ordered lock parameter tuple.
pub fn encode_lock_params(
    token: TokenId,
    sender: Principal,
    recipient: Principal,
    hashed_secret: Digest,
    timeout: Timestamp,
) -> [u8; LOCK_ENCODING_LEN] {
    let mut out = [0u8; LOCK_ENCODING_LEN];
    out[..21].copy_from_slice(&token.to_key_bytes());
    out[21..41].copy_from_slice(sender.as_bytes());
    out[41..61].copy_from_slice(recipient.as_bytes());
    out[61..93].copy_from_slice(hashed_secret.as_bytes());
    out[93..].copy_from_slice(&timeout.to_be_bytes());
    out
}

/// Derive the content-addressed lock-id for a parameter tuple.
pub fn lock_id(
    token: TokenId,
    sender: Principal,
    recipient: Principal,
    hashed_secret: Digest,
    timeout: Timestamp,
) -> LockId {
    let encoded = encode_lock_params(token, sender, recipient, hashed_secret, timeout);
    LockId::from_bytes(blake3_hash(&encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(b: u8) -> Principal {
        Principal::from_bytes([b; 20])
    }

    fn hs(b: u8) -> Digest {
        Digest::from_bytes([b; 32])
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = lock_id(TokenId::Native, p(1), p(2), hs(3), 1000);
        let b = lock_id(TokenId::Native, p(1), p(2), hs(3), 1000);
        assert_eq!(a, b);
    }

    #[test]
    fn timeout_changes_lock_id() {
        let a = lock_id(TokenId::Native, p(1), p(2), hs(3), 1000);
        let b = lock_id(TokenId::Native, p(1), p(2), hs(3), 1001);
        assert_ne!(a, b);
    }

    #[test]
    fn native_and_token_ids_never_collide() {
        let native = lock_id(TokenId::Native, p(1), p(2), hs(3), 1000);
        let token = lock_id(TokenId::Token([0u8; 20]), p(1), p(2), hs(3), 1000);
        // Same zeroed token bytes, different tag byte.
        assert_ne!(native, token);
    }

    #[test]
    fn every_field_is_significant() {
        let base = lock_id(TokenId::Token([7u8; 20]), p(1), p(2), hs(3), 1000);
        assert_ne!(base, lock_id(TokenId::Token([8u8; 20]), p(1), p(2), hs(3), 1000));
        assert_ne!(base, lock_id(TokenId::Token([7u8; 20]), p(9), p(2), hs(3), 1000));
        assert_ne!(base, lock_id(TokenId::Token([7u8; 20]), p(1), p(9), hs(3), 1000));
        assert_ne!(base, lock_id(TokenId::Token([7u8; 20]), p(1), p(2), hs(9), 1000));
    }

    #[test]
    fn swapping_sender_and_recipient_changes_lock_id() {
        let a = lock_id(TokenId::Native, p(1), p(2), hs(3), 1000);
        let b = lock_id(TokenId::Native, p(2), p(1), hs(3), 1000);
        assert_ne!(a, b);
    }
}
