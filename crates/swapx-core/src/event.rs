//! Event schema emitted by the swap engine.
//!
//! Every event carries enough data to reconstruct the affected lock-id and to
//! drive off-chain indexing. Events are appended to a persistent journal with
//! a monotonically increasing sequence number; a failed operation emits
//! nothing.

use serde::{Deserialize, Serialize};

use crate::types::{Amount, AssetTag, Digest, LockId, Principal, Secret, Timestamp, TokenId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SwapEvent {
    /// A buyer locked value, advertising the asset and unit price wanted in
    /// return on the counter-ledger.
    BuyLock {
        token: TokenId,
        sender: Principal,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
        amount: Amount,
        lock_id: LockId,
        sell_asset: AssetTag,
        sell_price: Amount,
    },

    /// A seller locked value against a buyer's lock, either out of a stash or
    /// from direct funds.
    SellLock {
        token: TokenId,
        sender: Principal,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
        amount: Amount,
        lock_id: LockId,
        buy_asset: AssetTag,
        buy_lock_id: LockId,
    },

    /// The declared recipient cancelled the lock; value returned to the sender.
    DeclineByRecipient {
        token: TokenId,
        sender: Principal,
        recipient: Principal,
        lock_id: LockId,
    },

    /// The sender proved the preimage before timeout; value went to the
    /// declared recipient. Reveals the secret.
    UnlockBySender {
        token: TokenId,
        sender: Principal,
        recipient: Principal,
        lock_id: LockId,
        secret: Secret,
    },

    /// The recipient proved the preimage before timeout; value went to the
    /// recipient. Reveals the secret.
    UnlockByRecipient {
        token: TokenId,
        sender: Principal,
        recipient: Principal,
        lock_id: LockId,
        secret: Secret,
    },

    /// The lock expired; value returned to the sender or the sender's stash.
    Timeout {
        token: TokenId,
        sender: Principal,
        recipient: Principal,
        lock_id: LockId,
    },

    /// Value entered a stash.
    StashAdd {
        token: TokenId,
        account: Principal,
        asset: AssetTag,
        amount: Amount,
    },

    /// Value left a stash.
    StashRemove {
        token: TokenId,
        account: Principal,
        asset: AssetTag,
        amount: Amount,
    },
}

impl SwapEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SwapEvent::BuyLock { .. } => "BuyLock",
            SwapEvent::SellLock { .. } => "SellLock",
            SwapEvent::DeclineByRecipient { .. } => "DeclineByRecipient",
            SwapEvent::UnlockBySender { .. } => "UnlockBySender",
            SwapEvent::UnlockByRecipient { .. } => "UnlockByRecipient",
            SwapEvent::Timeout { .. } => "Timeout",
            SwapEvent::StashAdd { .. } => "StashAdd",
            SwapEvent::StashRemove { .. } => "StashRemove",
        }
    }
}
