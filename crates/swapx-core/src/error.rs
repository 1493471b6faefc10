use thiserror::Error;

use crate::types::{Amount, AssetTag, LockId, Principal, TokenId};

#[derive(Debug, Error)]
pub enum SwapError {
    // ── Input validation ─────────────────────────────────────────────────────
    #[error("amount must be greater than zero")]
    ZeroValue,

    // ── Lock state machine ───────────────────────────────────────────────────
    #[error("lock already exists: {0}")]
    LockAlreadyExists(LockId),

    #[error("lock not found: {0}")]
    LockNotFound(LockId),

    #[error("lock timed out: {0}")]
    LockTimedOut(LockId),

    #[error("lock not timed out: {0}")]
    LockNotTimedOut(LockId),

    // ── Stash book ───────────────────────────────────────────────────────────
    #[error("stash not big enough: owner {owner}, asset {asset}, requested {requested}, available {available}")]
    StashNotBigEnough {
        owner: Principal,
        asset: AssetTag,
        requested: Amount,
        available: Amount,
    },

    // ── External collaborators ───────────────────────────────────────────────
    #[error("token transfer failed: token {token}, from {from}, to {to}, amount {amount}")]
    TokenTransferFailed {
        token: TokenId,
        from: Principal,
        to: Principal,
        amount: Amount,
    },

    #[error("invalid proxy: {caller} is not authorised to act for {account}")]
    InvalidProxy {
        account: Principal,
        caller: Principal,
    },

    // ── Native account book ──────────────────────────────────────────────────
    #[error("insufficient balance: need {need}, have {have}")]
    InsufficientBalance { need: Amount, have: Amount },

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),
}
