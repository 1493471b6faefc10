//! Account-proxy directory backed by the state database.
//!
//! Answers "is principal P authorised to act on behalf of account A?" for the
//! engine's proxy operation variants. An account registers at most one proxy;
//! `Principal::ZERO` clears it.

use std::sync::Arc;

use swapx_core::error::SwapError;
use swapx_core::traits::AccountDirectory;
use swapx_core::types::Principal;

use crate::db::StateDb;

pub struct ProxyRegistry {
    db: Arc<StateDb>,
}

impl ProxyRegistry {
    pub fn new(db: Arc<StateDb>) -> Self {
        Self { db }
    }

    /// Record `proxy` as the principal authorised to act for `account`.
    pub fn set_proxy(&self, account: Principal, proxy: Principal) -> Result<(), SwapError> {
        self.db.put_proxy(&account, &proxy)
    }
}

impl AccountDirectory for ProxyRegistry {
    fn proxy_of(&self, account: Principal) -> Principal {
        self.db.get_proxy(&account).unwrap_or(Principal::ZERO)
    }
}
