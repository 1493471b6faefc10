use serde::{Deserialize, Serialize};

use swapx_core::event::SwapEvent;
use swapx_core::types::TokenId;

fn token_str(token: TokenId) -> Option<String> {
    match token {
        TokenId::Native => None,
        TokenId::Token(_) => Some(token.to_string()),
    }
}

/// One stash-list entry returned by `swapx_getStashes`, in descending order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcStashEntry {
    pub owner: String,
    pub value: String,
}

/// JSON-serializable journal entry returned by `swapx_getEvents`.
///
/// `token` is absent for native-asset events. Only the fields carried by the
/// event kind are populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcEvent {
    pub seq: u64,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashed_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_lock_id: Option<String>,
}

impl RpcEvent {
    pub fn from_event(seq: u64, event: &SwapEvent) -> Self {
        let mut out = RpcEvent { seq, kind: event.kind().to_string(), ..Default::default() };
        match event {
            SwapEvent::BuyLock {
                token, sender, recipient, hashed_secret, timeout, amount, lock_id,
                sell_asset, sell_price,
            } => {
                out.token = token_str(*token);
                out.sender = Some(sender.to_hex());
                out.recipient = Some(recipient.to_hex());
                out.hashed_secret = Some(hashed_secret.to_hex());
                out.timeout = Some(*timeout);
                out.amount = Some(amount.to_string());
                out.lock_id = Some(lock_id.to_hex());
                out.asset = Some(sell_asset.to_hex());
                out.sell_price = Some(sell_price.to_string());
            }
            SwapEvent::SellLock {
                token, sender, recipient, hashed_secret, timeout, amount, lock_id,
                buy_asset, buy_lock_id,
            } => {
                out.token = token_str(*token);
                out.sender = Some(sender.to_hex());
                out.recipient = Some(recipient.to_hex());
                out.hashed_secret = Some(hashed_secret.to_hex());
                out.timeout = Some(*timeout);
                out.amount = Some(amount.to_string());
                out.lock_id = Some(lock_id.to_hex());
                out.asset = Some(buy_asset.to_hex());
                out.buy_lock_id = Some(buy_lock_id.to_hex());
            }
            SwapEvent::DeclineByRecipient { token, sender, recipient, lock_id } => {
                out.token = token_str(*token);
                out.sender = Some(sender.to_hex());
                out.recipient = Some(recipient.to_hex());
                out.lock_id = Some(lock_id.to_hex());
            }
            SwapEvent::UnlockBySender { token, sender, recipient, lock_id, secret }
            | SwapEvent::UnlockByRecipient { token, sender, recipient, lock_id, secret } => {
                out.token = token_str(*token);
                out.sender = Some(sender.to_hex());
                out.recipient = Some(recipient.to_hex());
                out.lock_id = Some(lock_id.to_hex());
                out.secret = Some(secret.to_hex());
            }
            SwapEvent::Timeout { token, sender, recipient, lock_id } => {
                out.token = token_str(*token);
                out.sender = Some(sender.to_hex());
                out.recipient = Some(recipient.to_hex());
                out.lock_id = Some(lock_id.to_hex());
            }
            SwapEvent::StashAdd { token, account, asset, amount }
            | SwapEvent::StashRemove { token, account, asset, amount } => {
                out.token = token_str(*token);
                out.account = Some(account.to_hex());
                out.asset = Some(asset.to_hex());
                out.amount = Some(amount.to_string());
            }
        }
        out
    }
}

// ── Operation parameter envelopes ─────────────────────────────────────────────
//
// The node trusts an authenticating front-end to bind each request to a
// principal, so the caller travels as an explicit field. `token` is omitted
// for the native asset. Amount fields are decimal strings.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcLockQuery {
    #[serde(default)]
    pub token: Option<String>,
    pub sender: String,
    pub recipient: String,
    pub hashed_secret: String,
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcLockBuy {
    pub caller: String,
    #[serde(default)]
    pub token: Option<String>,
    pub recipient: String,
    pub hashed_secret: String,
    pub timeout: u64,
    pub sell_asset: String,
    pub sell_price: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcLockSell {
    pub caller: String,
    /// Acting account when called through a registered proxy.
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    pub recipient: String,
    pub hashed_secret: String,
    pub timeout: u64,
    pub stash_asset: String,
    pub amount: String,
    pub buy_lock_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcLockSellDirect {
    pub caller: String,
    pub recipient: String,
    pub hashed_secret: String,
    pub timeout: u64,
    pub buy_asset: String,
    pub amount: String,
    pub buy_lock_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcDecline {
    pub caller: String,
    #[serde(default)]
    pub token: Option<String>,
    pub sender: String,
    pub hashed_secret: String,
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcUnlock {
    pub caller: String,
    /// Acting account when called through a registered proxy
    /// (`swapx_unlockByRecipient` only).
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    /// Declared recipient for `unlockBySender`, declared sender for
    /// `unlockByRecipient`.
    pub counterparty: String,
    pub secret: String,
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcTimeoutValue {
    pub caller: String,
    /// Acting account when called through a registered proxy.
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    pub recipient: String,
    pub hashed_secret: String,
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcTimeoutStash {
    pub caller: String,
    /// Acting account when called through a registered proxy.
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    pub recipient: String,
    pub hashed_secret: String,
    pub timeout: u64,
    pub stash_asset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcDepositStash {
    pub caller: String,
    #[serde(default)]
    pub token: Option<String>,
    pub asset: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcWithdrawStash {
    pub caller: String,
    #[serde(default)]
    pub token: Option<String>,
    pub asset: String,
    /// Omitted = withdraw the whole stash.
    #[serde(default)]
    pub amount: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcMoveStash {
    pub caller: String,
    #[serde(default)]
    pub token: Option<String>,
    pub from_asset: String,
    pub to_asset: String,
    pub amount: String,
}
