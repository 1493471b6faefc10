use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

use crate::types::{
    RpcDecline, RpcDepositStash, RpcEvent, RpcLockBuy, RpcLockQuery, RpcLockSell,
    RpcLockSellDirect, RpcMoveStash, RpcStashEntry, RpcTimeoutStash, RpcTimeoutValue, RpcUnlock,
    RpcWithdrawStash,
};

/// SwapX JSON-RPC 2.0 API definition.
///
/// All method names are prefixed with "swapx_" via `namespace = "swapx"`.
/// Principals, asset tags, digests, secrets, and lock-ids are 0x-prefixed hex
/// strings; amounts are decimal strings; a missing `token` means the native
/// asset.
#[rpc(server, namespace = "swapx")]
pub trait SwapxApi {
    // ── Read surface ─────────────────────────────────────────────────────────

    /// Native balance held at the engine for a principal.
    #[method(name = "getBalance")]
    async fn get_balance(&self, principal: String) -> RpcResult<String>;

    /// Locked amount under a lock-id ("0" if absent).
    #[method(name = "getLockValue")]
    async fn get_lock_value(&self, lock_id: String) -> RpcResult<String>;

    /// Locked amount for a parameter tuple ("0" if absent).
    #[method(name = "getLockValueByParams")]
    async fn get_lock_value_by_params(&self, query: RpcLockQuery) -> RpcResult<String>;

    /// Derive the canonical lock-id for a parameter tuple.
    #[method(name = "deriveLockId")]
    async fn derive_lock_id(&self, query: RpcLockQuery) -> RpcResult<String>;

    /// Stash value for (token, asset, owner).
    #[method(name = "getStashValue")]
    async fn get_stash_value(
        &self,
        token: Option<String>,
        asset: String,
        owner: String,
    ) -> RpcResult<String>;

    /// Page through an asset's stash list, largest sellers first.
    #[method(name = "getStashes")]
    async fn get_stashes(
        &self,
        token: Option<String>,
        asset: String,
        offset: usize,
        limit: usize,
    ) -> RpcResult<Vec<RpcStashEntry>>;

    /// Page through the event journal starting at `from_seq`.
    #[method(name = "getEvents")]
    async fn get_events(&self, from_seq: u64, limit: usize) -> RpcResult<Vec<RpcEvent>>;

    // ── Operations ───────────────────────────────────────────────────────────

    /// Lock value pulled from the caller; returns the lock-id.
    #[method(name = "lockBuy")]
    async fn lock_buy(&self, params: RpcLockBuy) -> RpcResult<String>;

    /// Lock value drawn from a stash; returns the lock-id. Set `account` to
    /// act through a registered proxy.
    #[method(name = "lockSell")]
    async fn lock_sell(&self, params: RpcLockSell) -> RpcResult<String>;

    /// Native sell lock funded directly from the caller's balance.
    #[method(name = "lockSellDirect")]
    async fn lock_sell_direct(&self, params: RpcLockSellDirect) -> RpcResult<String>;

    /// Recipient-initiated cancellation; value returns to the sender.
    #[method(name = "declineByRecipient")]
    async fn decline_by_recipient(&self, params: RpcDecline) -> RpcResult<()>;

    /// Sender reveals the preimage; value goes to the declared recipient.
    #[method(name = "unlockBySender")]
    async fn unlock_by_sender(&self, params: RpcUnlock) -> RpcResult<()>;

    /// Recipient reveals the preimage and collects the value. Set `account`
    /// to act through a registered proxy.
    #[method(name = "unlockByRecipient")]
    async fn unlock_by_recipient(&self, params: RpcUnlock) -> RpcResult<()>;

    /// Reclaim an expired lock to the sender's balance. Set `account` to act
    /// through a registered proxy.
    #[method(name = "timeoutValue")]
    async fn timeout_value(&self, params: RpcTimeoutValue) -> RpcResult<()>;

    /// Reclaim an expired lock into the sender's stash. Set `account` to act
    /// through a registered proxy.
    #[method(name = "timeoutStash")]
    async fn timeout_stash(&self, params: RpcTimeoutStash) -> RpcResult<()>;

    /// Advertise liquidity into a stash.
    #[method(name = "depositStash")]
    async fn deposit_stash(&self, params: RpcDepositStash) -> RpcResult<()>;

    /// Withdraw from a stash (the whole stash when `amount` is omitted).
    /// Returns the withdrawn amount.
    #[method(name = "withdrawStash")]
    async fn withdraw_stash(&self, params: RpcWithdrawStash) -> RpcResult<String>;

    /// Re-advertise stash value under a different asset tag.
    #[method(name = "moveStash")]
    async fn move_stash(&self, params: RpcMoveStash) -> RpcResult<()>;

    /// Register `proxy` as the principal authorised to act for `account`
    /// (the zero principal clears the entry).
    #[method(name = "setProxy")]
    async fn set_proxy(&self, account: String, proxy: String) -> RpcResult<()>;
}
