//! In-process token ledger.
//!
//! Stands in for an external token contract in dev deployments and tests:
//! plain per-(token, holder) balances behind a mutex, with a mint helper for
//! seeding. Faults are modelled as a `false` return, exactly as the engine
//! sees them from a real ledger.

use std::collections::HashMap;

use parking_lot::Mutex;

use swapx_core::traits::TokenLedger;
use swapx_core::types::{Amount, Principal, TokenId};

pub struct MemoryTokenLedger {
    /// The engine's holding principal: `transfer` draws from this account.
    engine: Principal,
    balances: Mutex<HashMap<(TokenId, Principal), Amount>>,
}

impl MemoryTokenLedger {
    pub fn new(engine: Principal) -> Self {
        Self { engine, balances: Mutex::new(HashMap::new()) }
    }

    /// Credit `amount` of `token` to `holder` out of thin air.
    pub fn mint(&self, token: TokenId, holder: Principal, amount: Amount) {
        let mut balances = self.balances.lock();
        let entry = balances.entry((token, holder)).or_insert_with(Amount::zero);
        *entry = *entry + amount;
    }

    pub fn balance_of(&self, token: TokenId, holder: &Principal) -> Amount {
        self.balances
            .lock()
            .get(&(token, *holder))
            .copied()
            .unwrap_or_default()
    }

    fn move_value(&self, token: TokenId, from: Principal, to: Principal, amount: Amount) -> bool {
        let mut balances = self.balances.lock();
        let have = balances.get(&(token, from)).copied().unwrap_or_default();
        if have < amount {
            return false;
        }
        balances.insert((token, from), have - amount);
        let entry = balances.entry((token, to)).or_insert_with(Amount::zero);
        *entry = *entry + amount;
        true
    }
}

impl TokenLedger for MemoryTokenLedger {
    fn transfer_from(
        &self,
        token: TokenId,
        from: Principal,
        to: Principal,
        amount: Amount,
    ) -> bool {
        self.move_value(token, from, to, amount)
    }

    fn transfer(&self, token: TokenId, to: Principal, amount: Amount) -> bool {
        self.move_value(token, self.engine, to, amount)
    }
}
