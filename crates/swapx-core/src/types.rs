use serde::{Deserialize, Serialize};
use std::fmt;

/// Escrowed value. Unsigned 256-bit; arithmetic panics on overflow, which is
/// treated as a fatal programming error (no wraparound).
pub type Amount = primitive_types::U256;

/// Unix timestamp (seconds, UTC).
pub type Timestamp = u64;

fn parse_fixed<const N: usize>(s: &str) -> Result<[u8; N], hex::FromHexError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s)?;
    if bytes.len() != N {
        return Err(hex::FromHexError::InvalidStringLength);
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

// ── Principal ────────────────────────────────────────────────────────────────

/// 20-byte account identifier, authenticated by the host environment.
///
/// `Principal::ZERO` is the null principal: it marks "no proxy registered"
/// and serves as the sentinel of every stash list.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Principal(pub [u8; 20]);

impl Principal {
    pub const ZERO: Principal = Principal([0u8; 20]);

    pub fn from_bytes(b: [u8; 20]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        parse_fixed::<20>(s).map(Self)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({}…)", &self.to_hex()[..10])
    }
}

// ── AssetTag ─────────────────────────────────────────────────────────────────

/// 32-byte opaque identifier naming the counter-asset a stash or lock is
/// advertising for. The engine assigns no semantics beyond equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetTag(pub [u8; 32]);

impl AssetTag {
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        parse_fixed::<32>(s).map(Self)
    }
}

impl fmt::Display for AssetTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for AssetTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetTag({}…)", &self.to_hex()[..10])
    }
}

// ── TokenId ──────────────────────────────────────────────────────────────────

/// External-token identifier. `Native` denotes the chain's native asset:
/// no TokenLedger call is made and value moves through the engine's own
/// account book.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenId {
    Native,
    Token([u8; 20]),
}

impl TokenId {
    pub fn is_native(&self) -> bool {
        matches!(self, TokenId::Native)
    }

    /// Fixed-width 21-byte form used in storage keys and lock-id encodings:
    /// 1 tag byte (0x00 native / 0x01 token) followed by the 20 token bytes
    /// (zeroed for native). Distinct tuples can never alias.
    pub fn to_key_bytes(&self) -> [u8; 21] {
        let mut out = [0u8; 21];
        if let TokenId::Token(addr) = self {
            out[0] = 0x01;
            out[1..].copy_from_slice(addr);
        }
        out
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        parse_fixed::<20>(s).map(TokenId::Token)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenId::Native => write!(f, "native"),
            TokenId::Token(addr) => write!(f, "0x{}", hex::encode(addr)),
        }
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({self})")
    }
}

// ── Digest ───────────────────────────────────────────────────────────────────

/// 32-byte hash output. The commitment `hashed_secret` is a `Digest` of the
/// swap secret.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        parse_fixed::<32>(s).map(Self)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}…)", &self.to_hex()[..10])
    }
}

// ── LockId ───────────────────────────────────────────────────────────────────

/// Content-addressed escrow cell key: the hash of the canonical encoding of
/// `(token, sender, recipient, hashed_secret, timeout)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LockId(pub [u8; 32]);

impl LockId {
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        parse_fixed::<32>(s).map(Self)
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LockId({}…)", &self.to_hex()[..10])
    }
}

// ── Secret ───────────────────────────────────────────────────────────────────

/// 32-byte swap preimage. Knowledge of the secret unlocks both sides of a
/// swap once either party reveals it.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret(pub [u8; 32]);

impl Secret {
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        parse_fixed::<32>(s).map(Self)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(…)")
    }
}
