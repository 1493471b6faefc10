use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::core::{async_trait, RpcResult};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObject;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use swapx_core::types::{Amount, AssetTag, Digest, LockId, Principal, Secret, TokenId};
use swapx_state::{ProxyRegistry, SwapEngine};

use crate::api::SwapxApiServer;
use crate::types::{
    RpcDecline, RpcDepositStash, RpcEvent, RpcLockBuy, RpcLockQuery, RpcLockSell,
    RpcLockSellDirect, RpcMoveStash, RpcStashEntry, RpcTimeoutStash, RpcTimeoutValue, RpcUnlock,
    RpcWithdrawStash,
};

fn rpc_err(code: i32, msg: impl Into<String>) -> ErrorObject<'static> {
    ErrorObject::owned(code, msg.into(), None::<()>)
}

fn engine_err(e: swapx_core::SwapError) -> ErrorObject<'static> {
    rpc_err(-32000, e.to_string())
}

// ── Parameter parsing ─────────────────────────────────────────────────────────

fn parse_principal(s: &str) -> Result<Principal, ErrorObject<'static>> {
    Principal::from_hex(s).map_err(|e| rpc_err(-32602, format!("invalid principal: {e}")))
}

fn parse_token(t: &Option<String>) -> Result<TokenId, ErrorObject<'static>> {
    match t {
        None => Ok(TokenId::Native),
        Some(s) => TokenId::from_hex(s).map_err(|e| rpc_err(-32602, format!("invalid token: {e}"))),
    }
}

fn parse_asset(s: &str) -> Result<AssetTag, ErrorObject<'static>> {
    AssetTag::from_hex(s).map_err(|e| rpc_err(-32602, format!("invalid asset tag: {e}")))
}

fn parse_digest(s: &str) -> Result<Digest, ErrorObject<'static>> {
    Digest::from_hex(s).map_err(|e| rpc_err(-32602, format!("invalid hashed secret: {e}")))
}

fn parse_secret(s: &str) -> Result<Secret, ErrorObject<'static>> {
    Secret::from_hex(s).map_err(|e| rpc_err(-32602, format!("invalid secret: {e}")))
}

fn parse_lock_id(s: &str) -> Result<LockId, ErrorObject<'static>> {
    LockId::from_hex(s).map_err(|e| rpc_err(-32602, format!("invalid lock id: {e}")))
}

fn parse_amount(s: &str) -> Result<Amount, ErrorObject<'static>> {
    Amount::from_dec_str(s).map_err(|e| rpc_err(-32602, format!("invalid amount: {e}")))
}

// ── Server ────────────────────────────────────────────────────────────────────

/// Shared state passed to the RPC server.
pub struct RpcServerState {
    pub engine: Arc<SwapEngine>,
    pub registry: Arc<ProxyRegistry>,
}

/// The RPC server implementation.
pub struct RpcServer {
    state: Arc<RpcServerState>,
}

impl RpcServer {
    pub fn new(state: Arc<RpcServerState>) -> Self {
        Self { state }
    }

    /// Start the JSON-RPC server on `addr` with permissive CORS headers.
    /// Returns a handle to stop it.
    pub async fn start(self, addr: SocketAddr) -> anyhow::Result<ServerHandle> {
        let cors = CorsLayer::new()
            .allow_methods(Any)
            .allow_origin(Any)
            .allow_headers(Any);

        let server = Server::builder()
            .set_http_middleware(tower::ServiceBuilder::new().layer(cors))
            .build(addr)
            .await?;

        let module = self.into_rpc();
        let handle = server.start(module);
        info!(%addr, "RPC server started");
        Ok(handle)
    }
}

// ── RPC implementation ────────────────────────────────────────────────────────

#[async_trait]
impl SwapxApiServer for RpcServer {
    async fn get_balance(&self, principal: String) -> RpcResult<String> {
        let owner = parse_principal(&principal)?;
        let balance = self.state.engine.get_balance(&owner).map_err(engine_err)?;
        Ok(balance.to_string())
    }

    async fn get_lock_value(&self, lock_id: String) -> RpcResult<String> {
        let id = parse_lock_id(&lock_id)?;
        let value = self.state.engine.get_lock_value(&id).map_err(engine_err)?;
        Ok(value.to_string())
    }

    async fn get_lock_value_by_params(&self, query: RpcLockQuery) -> RpcResult<String> {
        let value = self
            .state
            .engine
            .get_lock_value_for(
                parse_token(&query.token)?,
                parse_principal(&query.sender)?,
                parse_principal(&query.recipient)?,
                parse_digest(&query.hashed_secret)?,
                query.timeout,
            )
            .map_err(engine_err)?;
        Ok(value.to_string())
    }

    async fn derive_lock_id(&self, query: RpcLockQuery) -> RpcResult<String> {
        let id = self.state.engine.lock_id_for(
            parse_token(&query.token)?,
            parse_principal(&query.sender)?,
            parse_principal(&query.recipient)?,
            parse_digest(&query.hashed_secret)?,
            query.timeout,
        );
        Ok(id.to_hex())
    }

    async fn get_stash_value(
        &self,
        token: Option<String>,
        asset: String,
        owner: String,
    ) -> RpcResult<String> {
        let value = self
            .state
            .engine
            .get_stash_value(parse_token(&token)?, &parse_asset(&asset)?, &parse_principal(&owner)?)
            .map_err(engine_err)?;
        Ok(value.to_string())
    }

    async fn get_stashes(
        &self,
        token: Option<String>,
        asset: String,
        offset: usize,
        limit: usize,
    ) -> RpcResult<Vec<RpcStashEntry>> {
        let entries = self
            .state
            .engine
            .get_stashes(parse_token(&token)?, &parse_asset(&asset)?, offset, limit)
            .map_err(engine_err)?;
        Ok(entries
            .into_iter()
            .map(|(owner, value)| RpcStashEntry { owner: owner.to_hex(), value: value.to_string() })
            .collect())
    }

    async fn get_events(&self, from_seq: u64, limit: usize) -> RpcResult<Vec<RpcEvent>> {
        let events = self.state.engine.get_events(from_seq, limit).map_err(engine_err)?;
        Ok(events
            .iter()
            .map(|(seq, event)| RpcEvent::from_event(*seq, event))
            .collect())
    }

    async fn lock_buy(&self, params: RpcLockBuy) -> RpcResult<String> {
        let id = self
            .state
            .engine
            .lock_buy(
                parse_principal(&params.caller)?,
                parse_token(&params.token)?,
                parse_principal(&params.recipient)?,
                parse_digest(&params.hashed_secret)?,
                params.timeout,
                parse_asset(&params.sell_asset)?,
                parse_amount(&params.sell_price)?,
                parse_amount(&params.amount)?,
            )
            .map_err(engine_err)?;
        Ok(id.to_hex())
    }

    async fn lock_sell(&self, params: RpcLockSell) -> RpcResult<String> {
        let caller = parse_principal(&params.caller)?;
        let token = parse_token(&params.token)?;
        let recipient = parse_principal(&params.recipient)?;
        let hs = parse_digest(&params.hashed_secret)?;
        let stash_asset = parse_asset(&params.stash_asset)?;
        let amount = parse_amount(&params.amount)?;
        let buy_lock_id = parse_lock_id(&params.buy_lock_id)?;

        let id = match &params.account {
            Some(account) => self.state.engine.lock_sell_proxy(
                caller,
                parse_principal(account)?,
                token,
                recipient,
                hs,
                params.timeout,
                stash_asset,
                amount,
                buy_lock_id,
            ),
            None => self.state.engine.lock_sell(
                caller,
                token,
                recipient,
                hs,
                params.timeout,
                stash_asset,
                amount,
                buy_lock_id,
            ),
        }
        .map_err(engine_err)?;
        Ok(id.to_hex())
    }

    async fn lock_sell_direct(&self, params: RpcLockSellDirect) -> RpcResult<String> {
        let id = self
            .state
            .engine
            .lock_sell_direct(
                parse_principal(&params.caller)?,
                parse_principal(&params.recipient)?,
                parse_digest(&params.hashed_secret)?,
                params.timeout,
                parse_asset(&params.buy_asset)?,
                parse_amount(&params.amount)?,
                parse_lock_id(&params.buy_lock_id)?,
            )
            .map_err(engine_err)?;
        Ok(id.to_hex())
    }

    async fn decline_by_recipient(&self, params: RpcDecline) -> RpcResult<()> {
        self.state
            .engine
            .decline_by_recipient(
                parse_principal(&params.caller)?,
                parse_token(&params.token)?,
                parse_principal(&params.sender)?,
                parse_digest(&params.hashed_secret)?,
                params.timeout,
            )
            .map_err(engine_err)
    }

    async fn unlock_by_sender(&self, params: RpcUnlock) -> RpcResult<()> {
        self.state
            .engine
            .unlock_by_sender(
                parse_principal(&params.caller)?,
                parse_token(&params.token)?,
                parse_principal(&params.counterparty)?,
                parse_secret(&params.secret)?,
                params.timeout,
            )
            .map_err(engine_err)
    }

    async fn unlock_by_recipient(&self, params: RpcUnlock) -> RpcResult<()> {
        let caller = parse_principal(&params.caller)?;
        let token = parse_token(&params.token)?;
        let sender = parse_principal(&params.counterparty)?;
        let secret = parse_secret(&params.secret)?;

        match &params.account {
            Some(account) => self.state.engine.unlock_by_recipient_proxy(
                caller,
                parse_principal(account)?,
                token,
                sender,
                secret,
                params.timeout,
            ),
            None => self
                .state
                .engine
                .unlock_by_recipient(caller, token, sender, secret, params.timeout),
        }
        .map_err(engine_err)
    }

    async fn timeout_value(&self, params: RpcTimeoutValue) -> RpcResult<()> {
        let caller = parse_principal(&params.caller)?;
        let token = parse_token(&params.token)?;
        let recipient = parse_principal(&params.recipient)?;
        let hs = parse_digest(&params.hashed_secret)?;

        match &params.account {
            Some(account) => self.state.engine.timeout_value_proxy(
                caller,
                parse_principal(account)?,
                token,
                recipient,
                hs,
                params.timeout,
            ),
            None => self
                .state
                .engine
                .timeout_value(caller, token, recipient, hs, params.timeout),
        }
        .map_err(engine_err)
    }

    async fn timeout_stash(&self, params: RpcTimeoutStash) -> RpcResult<()> {
        let caller = parse_principal(&params.caller)?;
        let token = parse_token(&params.token)?;
        let recipient = parse_principal(&params.recipient)?;
        let hs = parse_digest(&params.hashed_secret)?;
        let stash_asset = parse_asset(&params.stash_asset)?;

        match &params.account {
            Some(account) => self.state.engine.timeout_stash_proxy(
                caller,
                parse_principal(account)?,
                token,
                recipient,
                hs,
                params.timeout,
                stash_asset,
            ),
            None => self.state.engine.timeout_stash(
                caller,
                token,
                recipient,
                hs,
                params.timeout,
                stash_asset,
            ),
        }
        .map_err(engine_err)
    }

    async fn deposit_stash(&self, params: RpcDepositStash) -> RpcResult<()> {
        self.state
            .engine
            .deposit_stash(
                parse_principal(&params.caller)?,
                parse_token(&params.token)?,
                parse_asset(&params.asset)?,
                parse_amount(&params.amount)?,
            )
            .map_err(engine_err)
    }

    async fn withdraw_stash(&self, params: RpcWithdrawStash) -> RpcResult<String> {
        let caller = parse_principal(&params.caller)?;
        let token = parse_token(&params.token)?;
        let asset = parse_asset(&params.asset)?;

        let withdrawn = match &params.amount {
            Some(amount) => {
                let amount = parse_amount(amount)?;
                self.state
                    .engine
                    .withdraw_stash(caller, token, asset, amount)
                    .map(|_| amount)
            }
            None => self.state.engine.withdraw_stash_all(caller, token, asset),
        }
        .map_err(engine_err)?;
        Ok(withdrawn.to_string())
    }

    async fn move_stash(&self, params: RpcMoveStash) -> RpcResult<()> {
        self.state
            .engine
            .move_stash(
                parse_principal(&params.caller)?,
                parse_token(&params.token)?,
                parse_asset(&params.from_asset)?,
                parse_asset(&params.to_asset)?,
                parse_amount(&params.amount)?,
            )
            .map_err(engine_err)
    }

    async fn set_proxy(&self, account: String, proxy: String) -> RpcResult<()> {
        self.state
            .registry
            .set_proxy(parse_principal(&account)?, parse_principal(&proxy)?)
            .map_err(engine_err)
    }
}
