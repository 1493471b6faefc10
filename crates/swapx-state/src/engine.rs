use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tracing::info;

use swapx_core::constants::MAX_PAGE_LIMIT;
use swapx_core::error::SwapError;
use swapx_core::event::SwapEvent;
use swapx_core::traits::{AccountDirectory, Clock, TokenLedger};
use swapx_core::types::{Amount, AssetTag, Digest, LockId, Principal, Secret, Timestamp, TokenId};
use swapx_crypto::hash::hashed_secret;
use swapx_crypto::lockid::lock_id;

use crate::db::StateDb;
use crate::locks::LockStore;
use crate::stash::StashBook;

// ── SwapEngine ────────────────────────────────────────────────────────────────

/// The public operation surface of the escrow engine.
///
/// Every operation is atomic: it validates all preconditions, performs token
/// ingress, commits LockStore/StashBook mutations, performs token egress, and
/// only then emits its event. Any failure aborts with no partial effects
/// (a failed egress undoes the already-committed mutations).
///
/// Effects-before-interactions: egress ledger calls run strictly after the
/// state mutations they pay out, so a ledger that re-enters the engine
/// observes the lock as already claimed and fails cleanly.
pub struct SwapEngine {
    pub db: Arc<StateDb>,
    ledger: Arc<dyn TokenLedger>,
    directory: Arc<dyn AccountDirectory>,
    clock: Arc<dyn Clock>,
    /// The engine's own account on external token ledgers; ingress lands
    /// here and egress draws from here.
    holding: Principal,
    /// Serializes operations. Reentrant, so a ledger calling back into the
    /// engine on the same thread proceeds against committed state instead of
    /// deadlocking.
    op_guard: ReentrantMutex<()>,
}

impl SwapEngine {
    pub fn new(
        db: Arc<StateDb>,
        ledger: Arc<dyn TokenLedger>,
        directory: Arc<dyn AccountDirectory>,
        clock: Arc<dyn Clock>,
        holding: Principal,
    ) -> Self {
        Self { db, ledger, directory, clock, holding, op_guard: ReentrantMutex::new(()) }
    }

    // ── Value movement helpers ────────────────────────────────────────────────

    fn native_debit(&self, owner: &Principal, amount: Amount) -> Result<(), SwapError> {
        let have = self.db.get_balance(owner)?;
        if have < amount {
            return Err(SwapError::InsufficientBalance { need: amount, have });
        }
        self.db.put_balance(owner, have - amount)
    }

    fn native_credit(&self, owner: &Principal, amount: Amount) -> Result<(), SwapError> {
        let have = self.db.get_balance(owner)?;
        self.db.put_balance(owner, have + amount)
    }

    /// Pull `amount` from `from` into the engine. Runs before any state
    /// mutation; a failure leaves the engine untouched.
    fn ingress(&self, token: TokenId, from: Principal, amount: Amount) -> Result<(), SwapError> {
        match token {
            TokenId::Native => self.native_debit(&from, amount),
            TokenId::Token(_) => {
                if self.ledger.transfer_from(token, from, self.holding, amount) {
                    Ok(())
                } else {
                    Err(SwapError::TokenTransferFailed { token, from, to: self.holding, amount })
                }
            }
        }
    }

    /// Pay `amount` out of the engine to `to`. Runs strictly after the state
    /// mutations it settles; the caller compensates on failure.
    fn egress(&self, token: TokenId, to: Principal, amount: Amount) -> Result<(), SwapError> {
        match token {
            TokenId::Native => self.native_credit(&to, amount),
            TokenId::Token(_) => {
                if self.ledger.transfer(token, to, amount) {
                    Ok(())
                } else {
                    Err(SwapError::TokenTransferFailed { token, from: self.holding, to, amount })
                }
            }
        }
    }

    fn emit(&self, event: SwapEvent) -> Result<(), SwapError> {
        let seq = self.db.append_event(&event)?;
        info!(seq, kind = event.kind(), "event");
        Ok(())
    }

    fn require_proxy(&self, account: Principal, caller: Principal) -> Result<(), SwapError> {
        let proxy = self.directory.proxy_of(account);
        if proxy.is_zero() || proxy != caller {
            return Err(SwapError::InvalidProxy { account, caller });
        }
        Ok(())
    }

    // ── Lock creation ─────────────────────────────────────────────────────────

    /// Lock `amount` pulled from the caller, advertising `sell_asset` at
    /// `sell_price` as the counter-leg wanted on the other ledger.
    #[allow(clippy::too_many_arguments)]
    pub fn lock_buy(
        &self,
        caller: Principal,
        token: TokenId,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
        sell_asset: AssetTag,
        sell_price: Amount,
        amount: Amount,
    ) -> Result<LockId, SwapError> {
        let _guard = self.op_guard.lock();
        if amount.is_zero() {
            return Err(SwapError::ZeroValue);
        }
        let id = lock_id(token, caller, recipient, hashed_secret, timeout);
        if self.db.get_lock(&id)?.is_some() {
            return Err(SwapError::LockAlreadyExists(id));
        }
        self.ingress(token, caller, amount)?;
        LockStore::new(&self.db).create(&id, amount)?;
        self.emit(SwapEvent::BuyLock {
            token,
            sender: caller,
            recipient,
            hashed_secret,
            timeout,
            amount,
            lock_id: id,
            sell_asset,
            sell_price,
        })?;
        Ok(id)
    }

    /// Lock `amount` drawn out of the caller's `stash_asset` stash against an
    /// existing buy lock on the counter-ledger.
    #[allow(clippy::too_many_arguments)]
    pub fn lock_sell(
        &self,
        caller: Principal,
        token: TokenId,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
        stash_asset: AssetTag,
        amount: Amount,
        buy_lock_id: LockId,
    ) -> Result<LockId, SwapError> {
        self.do_lock_sell(caller, token, recipient, hashed_secret, timeout, stash_asset, amount, buy_lock_id)
    }

    /// Proxy variant of [`lock_sell`](Self::lock_sell): the stash drawn from
    /// and the declared sender are `account`'s.
    #[allow(clippy::too_many_arguments)]
    pub fn lock_sell_proxy(
        &self,
        caller: Principal,
        account: Principal,
        token: TokenId,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
        stash_asset: AssetTag,
        amount: Amount,
        buy_lock_id: LockId,
    ) -> Result<LockId, SwapError> {
        self.require_proxy(account, caller)?;
        self.do_lock_sell(account, token, recipient, hashed_secret, timeout, stash_asset, amount, buy_lock_id)
    }

    #[allow(clippy::too_many_arguments)]
    fn do_lock_sell(
        &self,
        sender: Principal,
        token: TokenId,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
        stash_asset: AssetTag,
        amount: Amount,
        buy_lock_id: LockId,
    ) -> Result<LockId, SwapError> {
        let _guard = self.op_guard.lock();
        if amount.is_zero() {
            return Err(SwapError::ZeroValue);
        }
        let id = lock_id(token, sender, recipient, hashed_secret, timeout);
        if self.db.get_lock(&id)?.is_some() {
            return Err(SwapError::LockAlreadyExists(id));
        }
        StashBook::new(&self.db).remove(token, &stash_asset, &sender, amount)?;
        LockStore::new(&self.db).create(&id, amount)?;
        self.emit(SwapEvent::SellLock {
            token,
            sender,
            recipient,
            hashed_secret,
            timeout,
            amount,
            lock_id: id,
            buy_asset: stash_asset,
            buy_lock_id,
        })?;
        Ok(id)
    }

    /// Native sell lock funded directly from the caller's balance instead of
    /// a stash.
    #[allow(clippy::too_many_arguments)]
    pub fn lock_sell_direct(
        &self,
        caller: Principal,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
        buy_asset: AssetTag,
        amount: Amount,
        buy_lock_id: LockId,
    ) -> Result<LockId, SwapError> {
        let _guard = self.op_guard.lock();
        if amount.is_zero() {
            return Err(SwapError::ZeroValue);
        }
        let token = TokenId::Native;
        let id = lock_id(token, caller, recipient, hashed_secret, timeout);
        if self.db.get_lock(&id)?.is_some() {
            return Err(SwapError::LockAlreadyExists(id));
        }
        self.ingress(token, caller, amount)?;
        LockStore::new(&self.db).create(&id, amount)?;
        self.emit(SwapEvent::SellLock {
            token,
            sender: caller,
            recipient,
            hashed_secret,
            timeout,
            amount,
            lock_id: id,
            buy_asset,
            buy_lock_id,
        })?;
        Ok(id)
    }

    // ── Lock resolution ───────────────────────────────────────────────────────

    /// Counterparty-initiated cancellation: the declared recipient returns
    /// the locked value to the sender. No preimage, no timeout check.
    pub fn decline_by_recipient(
        &self,
        caller: Principal,
        token: TokenId,
        sender: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
    ) -> Result<(), SwapError> {
        let _guard = self.op_guard.lock();
        let id = lock_id(token, sender, caller, hashed_secret, timeout);
        let amount = LockStore::new(&self.db).claim(&id)?;
        if let Err(err) = self.egress(token, sender, amount) {
            self.db.put_lock(&id, amount)?;
            return Err(err);
        }
        self.emit(SwapEvent::DeclineByRecipient { token, sender, recipient: caller, lock_id: id })?;
        Ok(())
    }

    /// The sender proves the preimage before timeout; value goes to the
    /// declared recipient.
    pub fn unlock_by_sender(
        &self,
        caller: Principal,
        token: TokenId,
        recipient: Principal,
        secret: Secret,
        timeout: Timestamp,
    ) -> Result<(), SwapError> {
        let _guard = self.op_guard.lock();
        let now = self.clock.now();
        let hs = hashed_secret(&secret);
        let id = lock_id(token, caller, recipient, hs, timeout);
        if now >= timeout {
            return Err(SwapError::LockTimedOut(id));
        }
        let amount = LockStore::new(&self.db).claim(&id)?;
        if let Err(err) = self.egress(token, recipient, amount) {
            self.db.put_lock(&id, amount)?;
            return Err(err);
        }
        self.emit(SwapEvent::UnlockBySender {
            token,
            sender: caller,
            recipient,
            lock_id: id,
            secret,
        })?;
        Ok(())
    }

    /// The recipient proves the preimage before timeout and collects the
    /// value.
    pub fn unlock_by_recipient(
        &self,
        caller: Principal,
        token: TokenId,
        sender: Principal,
        secret: Secret,
        timeout: Timestamp,
    ) -> Result<(), SwapError> {
        self.do_unlock_by_recipient(caller, token, sender, secret, timeout)
    }

    /// Proxy variant of [`unlock_by_recipient`](Self::unlock_by_recipient):
    /// `account` is the declared recipient and receives the value.
    pub fn unlock_by_recipient_proxy(
        &self,
        caller: Principal,
        account: Principal,
        token: TokenId,
        sender: Principal,
        secret: Secret,
        timeout: Timestamp,
    ) -> Result<(), SwapError> {
        self.require_proxy(account, caller)?;
        self.do_unlock_by_recipient(account, token, sender, secret, timeout)
    }

    fn do_unlock_by_recipient(
        &self,
        recipient: Principal,
        token: TokenId,
        sender: Principal,
        secret: Secret,
        timeout: Timestamp,
    ) -> Result<(), SwapError> {
        let _guard = self.op_guard.lock();
        let now = self.clock.now();
        let hs = hashed_secret(&secret);
        let id = lock_id(token, sender, recipient, hs, timeout);
        if now >= timeout {
            return Err(SwapError::LockTimedOut(id));
        }
        let amount = LockStore::new(&self.db).claim(&id)?;
        if let Err(err) = self.egress(token, recipient, amount) {
            self.db.put_lock(&id, amount)?;
            return Err(err);
        }
        self.emit(SwapEvent::UnlockByRecipient {
            token,
            sender,
            recipient,
            lock_id: id,
            secret,
        })?;
        Ok(())
    }

    /// Reclaim an expired lock back to the sender's balance.
    pub fn timeout_value(
        &self,
        caller: Principal,
        token: TokenId,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
    ) -> Result<(), SwapError> {
        self.do_timeout_value(caller, token, recipient, hashed_secret, timeout)
    }

    /// Proxy variant of [`timeout_value`](Self::timeout_value): `account` is
    /// the declared sender and receives the refund.
    pub fn timeout_value_proxy(
        &self,
        caller: Principal,
        account: Principal,
        token: TokenId,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
    ) -> Result<(), SwapError> {
        self.require_proxy(account, caller)?;
        self.do_timeout_value(account, token, recipient, hashed_secret, timeout)
    }

    fn do_timeout_value(
        &self,
        sender: Principal,
        token: TokenId,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
    ) -> Result<(), SwapError> {
        let _guard = self.op_guard.lock();
        let now = self.clock.now();
        let id = lock_id(token, sender, recipient, hashed_secret, timeout);
        if now < timeout {
            return Err(SwapError::LockNotTimedOut(id));
        }
        let amount = LockStore::new(&self.db).claim(&id)?;
        if let Err(err) = self.egress(token, sender, amount) {
            self.db.put_lock(&id, amount)?;
            return Err(err);
        }
        self.emit(SwapEvent::Timeout { token, sender, recipient, lock_id: id })?;
        Ok(())
    }

    /// Reclaim an expired lock back into the sender's `stash_asset` stash,
    /// re-advertising the liquidity instead of paying it out.
    pub fn timeout_stash(
        &self,
        caller: Principal,
        token: TokenId,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
        stash_asset: AssetTag,
    ) -> Result<(), SwapError> {
        self.do_timeout_stash(caller, token, recipient, hashed_secret, timeout, stash_asset)
    }

    /// Proxy variant of [`timeout_stash`](Self::timeout_stash): `account` is
    /// the declared sender and its stash receives the value.
    #[allow(clippy::too_many_arguments)]
    pub fn timeout_stash_proxy(
        &self,
        caller: Principal,
        account: Principal,
        token: TokenId,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
        stash_asset: AssetTag,
    ) -> Result<(), SwapError> {
        self.require_proxy(account, caller)?;
        self.do_timeout_stash(account, token, recipient, hashed_secret, timeout, stash_asset)
    }

    fn do_timeout_stash(
        &self,
        sender: Principal,
        token: TokenId,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
        stash_asset: AssetTag,
    ) -> Result<(), SwapError> {
        let _guard = self.op_guard.lock();
        let now = self.clock.now();
        let id = lock_id(token, sender, recipient, hashed_secret, timeout);
        if now < timeout {
            return Err(SwapError::LockNotTimedOut(id));
        }
        let amount = LockStore::new(&self.db).claim(&id)?;
        StashBook::new(&self.db).add(token, &stash_asset, &sender, amount)?;
        self.emit(SwapEvent::Timeout { token, sender, recipient, lock_id: id })?;
        Ok(())
    }

    // ── Stash management ──────────────────────────────────────────────────────

    /// Advertise liquidity: pull `amount` from the caller into their
    /// `asset` stash.
    pub fn deposit_stash(
        &self,
        caller: Principal,
        token: TokenId,
        asset: AssetTag,
        amount: Amount,
    ) -> Result<(), SwapError> {
        let _guard = self.op_guard.lock();
        if amount.is_zero() {
            return Err(SwapError::ZeroValue);
        }
        self.ingress(token, caller, amount)?;
        StashBook::new(&self.db).add(token, &asset, &caller, amount)?;
        self.emit(SwapEvent::StashAdd { token, account: caller, asset, amount })?;
        Ok(())
    }

    /// Withdraw part of a stash back to the caller.
    pub fn withdraw_stash(
        &self,
        caller: Principal,
        token: TokenId,
        asset: AssetTag,
        amount: Amount,
    ) -> Result<(), SwapError> {
        let _guard = self.op_guard.lock();
        if amount.is_zero() {
            return Err(SwapError::ZeroValue);
        }
        let book = StashBook::new(&self.db);
        book.remove(token, &asset, &caller, amount)?;
        if let Err(err) = self.egress(token, caller, amount) {
            book.add(token, &asset, &caller, amount)?;
            return Err(err);
        }
        self.emit(SwapEvent::StashRemove { token, account: caller, asset, amount })?;
        Ok(())
    }

    /// Withdraw a whole stash back to the caller. Returns the drained amount.
    pub fn withdraw_stash_all(
        &self,
        caller: Principal,
        token: TokenId,
        asset: AssetTag,
    ) -> Result<Amount, SwapError> {
        let _guard = self.op_guard.lock();
        let book = StashBook::new(&self.db);
        let amount = book.value_of(token, &asset, &caller)?;
        if amount.is_zero() {
            return Err(SwapError::ZeroValue);
        }
        book.remove(token, &asset, &caller, amount)?;
        if let Err(err) = self.egress(token, caller, amount) {
            book.add(token, &asset, &caller, amount)?;
            return Err(err);
        }
        self.emit(SwapEvent::StashRemove { token, account: caller, asset, amount })?;
        Ok(amount)
    }

    /// Re-advertise value from one asset stash to another without it leaving
    /// the engine.
    pub fn move_stash(
        &self,
        caller: Principal,
        token: TokenId,
        from_asset: AssetTag,
        to_asset: AssetTag,
        amount: Amount,
    ) -> Result<(), SwapError> {
        let _guard = self.op_guard.lock();
        if amount.is_zero() {
            return Err(SwapError::ZeroValue);
        }
        let book = StashBook::new(&self.db);
        book.remove(token, &from_asset, &caller, amount)?;
        book.add(token, &to_asset, &caller, amount)?;
        self.emit(SwapEvent::StashRemove { token, account: caller, asset: from_asset, amount })?;
        self.emit(SwapEvent::StashAdd { token, account: caller, asset: to_asset, amount })?;
        Ok(())
    }

    // ── Read surface ──────────────────────────────────────────────────────────

    /// The locked amount under `id`, zero if absent.
    pub fn get_lock_value(&self, id: &LockId) -> Result<Amount, SwapError> {
        LockStore::new(&self.db).peek(id)
    }

    /// Derive the lock-id for a parameter tuple.
    pub fn lock_id_for(
        &self,
        token: TokenId,
        sender: Principal,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
    ) -> LockId {
        lock_id(token, sender, recipient, hashed_secret, timeout)
    }

    /// The locked amount for a parameter tuple, zero if absent.
    pub fn get_lock_value_for(
        &self,
        token: TokenId,
        sender: Principal,
        recipient: Principal,
        hashed_secret: Digest,
        timeout: Timestamp,
    ) -> Result<Amount, SwapError> {
        self.get_lock_value(&lock_id(token, sender, recipient, hashed_secret, timeout))
    }

    pub fn get_stash_value(
        &self,
        token: TokenId,
        asset: &AssetTag,
        owner: &Principal,
    ) -> Result<Amount, SwapError> {
        StashBook::new(&self.db).value_of(token, asset, owner)
    }

    /// Page through an asset's stash list, largest sellers first.
    pub fn get_stashes(
        &self,
        token: TokenId,
        asset: &AssetTag,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(Principal, Amount)>, SwapError> {
        StashBook::new(&self.db).list(token, asset, offset, limit.min(MAX_PAGE_LIMIT))
    }

    /// Native balance held at the engine for `owner`.
    pub fn get_balance(&self, owner: &Principal) -> Result<Amount, SwapError> {
        self.db.get_balance(owner)
    }

    /// Page through the event journal.
    pub fn get_events(&self, from_seq: u64, limit: usize) -> Result<Vec<(u64, SwapEvent)>, SwapError> {
        self.db.get_events(from_seq, limit.min(MAX_PAGE_LIMIT))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
