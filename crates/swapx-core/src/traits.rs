//! External collaborators consumed by the swap engine.
//!
//! The engine never trusts these beyond their stated contracts: ledger calls
//! may fault or re-enter, the proxy directory may answer with the null
//! principal, and the clock is read at most once per operation.

use crate::types::{Amount, Principal, Timestamp, TokenId};

/// Moves external token balances on behalf of the engine.
///
/// Both calls return `false` on failure; a `false` (or a fault inside the
/// implementation) aborts the surrounding operation with
/// `TokenTransferFailed` and full rollback.
pub trait TokenLedger: Send + Sync {
    /// Move `amount` of `token` from `from` into `to`.
    fn transfer_from(&self, token: TokenId, from: Principal, to: Principal, amount: Amount)
        -> bool;

    /// Move `amount` of `token` out of the engine's own holding into `to`.
    fn transfer(&self, token: TokenId, to: Principal, amount: Amount) -> bool;
}

/// Answers "which principal may act on behalf of `account`?".
pub trait AccountDirectory: Send + Sync {
    /// The authorised proxy for `account`, or `Principal::ZERO` if none.
    fn proxy_of(&self, account: Principal) -> Principal;
}

/// Monotonic wall-clock seconds provided by the host.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by the host's system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp().max(0) as Timestamp
    }
}
