use swapx_core::types::{Digest, Secret};

/// Compute BLAKE3 hash of arbitrary bytes → 32-byte array.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Commitment digest of a swap preimage: `hashed_secret = BLAKE3(secret)`.
pub fn hashed_secret(secret: &Secret) -> Digest {
    Digest::from_bytes(blake3_hash(secret.as_bytes()))
}
