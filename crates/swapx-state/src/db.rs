use std::path::Path;

use swapx_core::error::SwapError;
use swapx_core::event::SwapEvent;
use swapx_core::types::{Amount, AssetTag, LockId, Principal, TokenId};

use crate::stash::StashNode;

/// Persistent state database backed by sled (pure-Rust, no C dependencies).
///
/// Named trees:
///   locks    — LockId bytes (32)                    → bincode(Amount)
///   stashes  — token(21) ‖ asset(32) ‖ owner(20)    → bincode(StashNode)
///   accounts — Principal bytes (20)                 → bincode(Amount)
///   proxies  — Principal bytes (20)                 → proxy Principal bytes (20)
///   events   — u64 BE sequence                      → bincode(SwapEvent)
///   meta     — utf8 key bytes                       → raw bytes
pub struct StateDb {
    _db: sled::Db,
    locks: sled::Tree,
    stashes: sled::Tree,
    accounts: sled::Tree,
    proxies: sled::Tree,
    events: sled::Tree,
    meta: sled::Tree,
}

/// Storage key of a stash node: fixed-width token, asset, owner.
fn stash_key(token: TokenId, asset: &AssetTag, owner: &Principal) -> [u8; 73] {
    let mut key = [0u8; 73];
    key[..21].copy_from_slice(&token.to_key_bytes());
    key[21..53].copy_from_slice(asset.as_bytes());
    key[53..].copy_from_slice(owner.as_bytes());
    key
}

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SwapError> {
        let db = sled::open(path).map_err(|e| SwapError::Storage(e.to_string()))?;
        let locks    = db.open_tree("locks").map_err(|e| SwapError::Storage(e.to_string()))?;
        let stashes  = db.open_tree("stashes").map_err(|e| SwapError::Storage(e.to_string()))?;
        let accounts = db.open_tree("accounts").map_err(|e| SwapError::Storage(e.to_string()))?;
        let proxies  = db.open_tree("proxies").map_err(|e| SwapError::Storage(e.to_string()))?;
        let events   = db.open_tree("events").map_err(|e| SwapError::Storage(e.to_string()))?;
        let meta     = db.open_tree("meta").map_err(|e| SwapError::Storage(e.to_string()))?;
        Ok(Self { _db: db, locks, stashes, accounts, proxies, events, meta })
    }

    // ── Locks ────────────────────────────────────────────────────────────────

    pub fn get_lock(&self, id: &LockId) -> Result<Option<Amount>, SwapError> {
        match self.locks.get(id.as_bytes()).map_err(|e| SwapError::Storage(e.to_string()))? {
            Some(bytes) => {
                let amount = bincode::deserialize(&bytes)
                    .map_err(|e| SwapError::Serialization(e.to_string()))?;
                Ok(Some(amount))
            }
            None => Ok(None),
        }
    }

    pub fn put_lock(&self, id: &LockId, amount: Amount) -> Result<(), SwapError> {
        let bytes = bincode::serialize(&amount)
            .map_err(|e| SwapError::Serialization(e.to_string()))?;
        self.locks
            .insert(id.as_bytes(), bytes)
            .map_err(|e| SwapError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn remove_lock(&self, id: &LockId) -> Result<(), SwapError> {
        self.locks
            .remove(id.as_bytes())
            .map_err(|e| SwapError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Return every live lock (no filter).
    pub fn iter_locks(&self) -> Result<Vec<(LockId, Amount)>, SwapError> {
        let mut result = Vec::new();
        for item in self.locks.iter() {
            let (key, bytes) = item.map_err(|e| SwapError::Storage(e.to_string()))?;
            let mut arr = [0u8; 32];
            arr.copy_from_slice(&key);
            let amount: Amount = bincode::deserialize(&bytes)
                .map_err(|e| SwapError::Serialization(e.to_string()))?;
            result.push((LockId::from_bytes(arr), amount));
        }
        Ok(result)
    }

    pub fn count_locks(&self) -> u64 {
        self.locks.len() as u64
    }

    // ── Stash nodes ──────────────────────────────────────────────────────────

    pub fn get_stash_node(
        &self,
        token: TokenId,
        asset: &AssetTag,
        owner: &Principal,
    ) -> Result<Option<StashNode>, SwapError> {
        let key = stash_key(token, asset, owner);
        match self.stashes.get(key).map_err(|e| SwapError::Storage(e.to_string()))? {
            Some(bytes) => {
                let node = bincode::deserialize(&bytes)
                    .map_err(|e| SwapError::Serialization(e.to_string()))?;
                Ok(Some(node))
            }
            None => Ok(None),
        }
    }

    pub fn put_stash_node(
        &self,
        token: TokenId,
        asset: &AssetTag,
        owner: &Principal,
        node: &StashNode,
    ) -> Result<(), SwapError> {
        let bytes = bincode::serialize(node)
            .map_err(|e| SwapError::Serialization(e.to_string()))?;
        self.stashes
            .insert(stash_key(token, asset, owner), bytes)
            .map_err(|e| SwapError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn remove_stash_node(
        &self,
        token: TokenId,
        asset: &AssetTag,
        owner: &Principal,
    ) -> Result<(), SwapError> {
        self.stashes
            .remove(stash_key(token, asset, owner))
            .map_err(|e| SwapError::Storage(e.to_string()))?;
        Ok(())
    }

    // ── Native account book ──────────────────────────────────────────────────

    pub fn get_balance(&self, owner: &Principal) -> Result<Amount, SwapError> {
        match self.accounts.get(owner.as_bytes()).map_err(|e| SwapError::Storage(e.to_string()))? {
            Some(bytes) => {
                let amount = bincode::deserialize(&bytes)
                    .map_err(|e| SwapError::Serialization(e.to_string()))?;
                Ok(amount)
            }
            None => Ok(Amount::zero()),
        }
    }

    pub fn put_balance(&self, owner: &Principal, amount: Amount) -> Result<(), SwapError> {
        let bytes = bincode::serialize(&amount)
            .map_err(|e| SwapError::Serialization(e.to_string()))?;
        self.accounts
            .insert(owner.as_bytes(), bytes)
            .map_err(|e| SwapError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Return every native account balance (no filter).
    pub fn iter_balances(&self) -> Result<Vec<(Principal, Amount)>, SwapError> {
        let mut result = Vec::new();
        for item in self.accounts.iter() {
            let (key, bytes) = item.map_err(|e| SwapError::Storage(e.to_string()))?;
            let mut arr = [0u8; 20];
            arr.copy_from_slice(&key);
            let amount: Amount = bincode::deserialize(&bytes)
                .map_err(|e| SwapError::Serialization(e.to_string()))?;
            result.push((Principal::from_bytes(arr), amount));
        }
        Ok(result)
    }

    // ── Proxy directory ──────────────────────────────────────────────────────

    pub fn get_proxy(&self, account: &Principal) -> Result<Principal, SwapError> {
        match self.proxies.get(account.as_bytes()).map_err(|e| SwapError::Storage(e.to_string()))? {
            Some(bytes) => {
                let mut arr = [0u8; 20];
                arr.copy_from_slice(&bytes);
                Ok(Principal::from_bytes(arr))
            }
            None => Ok(Principal::ZERO),
        }
    }

    pub fn put_proxy(&self, account: &Principal, proxy: &Principal) -> Result<(), SwapError> {
        self.proxies
            .insert(account.as_bytes(), proxy.as_bytes().as_ref())
            .map_err(|e| SwapError::Storage(e.to_string()))?;
        Ok(())
    }

    // ── Event journal ────────────────────────────────────────────────────────

    /// Append an event, returning its sequence number.
    pub fn append_event(&self, event: &SwapEvent) -> Result<u64, SwapError> {
        let seq = self.next_event_seq()?;
        let bytes = bincode::serialize(event)
            .map_err(|e| SwapError::Serialization(e.to_string()))?;
        self.events
            .insert(seq.to_be_bytes(), bytes)
            .map_err(|e| SwapError::Storage(e.to_string()))?;
        Ok(seq)
    }

    /// Page through the journal starting at `from_seq`, in sequence order.
    pub fn get_events(&self, from_seq: u64, limit: usize) -> Result<Vec<(u64, SwapEvent)>, SwapError> {
        let mut result = Vec::new();
        for item in self.events.range(from_seq.to_be_bytes()..) {
            if result.len() >= limit {
                break;
            }
            let (key, bytes) = item.map_err(|e| SwapError::Storage(e.to_string()))?;
            let mut arr = [0u8; 8];
            arr.copy_from_slice(&key);
            let event: SwapEvent = bincode::deserialize(&bytes)
                .map_err(|e| SwapError::Serialization(e.to_string()))?;
            result.push((u64::from_be_bytes(arr), event));
        }
        Ok(result)
    }

    pub fn count_events(&self) -> u64 {
        self.events.len() as u64
    }

    /// Allocate the next event sequence number (stored in meta tree).
    fn next_event_seq(&self) -> Result<u64, SwapError> {
        let key = "next_event_seq";
        let current = self
            .get_meta(key)?
            .map(|b| {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(&b[..8]);
                u64::from_be_bytes(arr)
            })
            .unwrap_or(0);
        self.put_meta(key, &(current + 1).to_be_bytes())?;
        Ok(current)
    }

    // ── Meta ─────────────────────────────────────────────────────────────────

    pub fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), SwapError> {
        self.meta
            .insert(key.as_bytes(), value)
            .map_err(|e| SwapError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, SwapError> {
        self.meta
            .get(key.as_bytes())
            .map(|v| v.map(|iv| iv.to_vec()))
            .map_err(|e| SwapError::Storage(e.to_string()))
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), SwapError> {
        self._db.flush().map_err(|e| SwapError::Storage(e.to_string()))?;
        Ok(())
    }
}
