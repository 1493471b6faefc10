//! Lock store: custody of active escrow cells.
//!
//! A lock is a single strictly-positive amount keyed by the content-addressed
//! lock-id. Every terminal transition (claim, decline, timeout) deletes the
//! entry, so a lock-id is either absent or maps to a positive amount.

use swapx_core::error::SwapError;
use swapx_core::types::{Amount, LockId};

use crate::db::StateDb;

pub struct LockStore<'a> {
    db: &'a StateDb,
}

impl<'a> LockStore<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    /// Create a new escrow cell. Rejects zero amounts and occupied keys.
    pub fn create(&self, id: &LockId, amount: Amount) -> Result<(), SwapError> {
        if amount.is_zero() {
            return Err(SwapError::ZeroValue);
        }
        if self.db.get_lock(id)?.is_some() {
            return Err(SwapError::LockAlreadyExists(*id));
        }
        self.db.put_lock(id, amount)
    }

    /// Remove the cell and return its amount. All terminal transitions pass
    /// through here; the preimage and timeout gating live in the engine.
    pub fn claim(&self, id: &LockId) -> Result<Amount, SwapError> {
        let amount = self.db.get_lock(id)?.ok_or(SwapError::LockNotFound(*id))?;
        self.db.remove_lock(id)?;
        Ok(amount)
    }

    /// Read-only: the locked amount, or zero if the lock is absent.
    pub fn peek(&self, id: &LockId) -> Result<Amount, SwapError> {
        Ok(self.db.get_lock(id)?.unwrap_or_default())
    }
}
