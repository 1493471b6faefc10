//! Genesis seeding for dev deployments.
//!
//! On first start the node reads a JSON params file and seeds native account
//! balances plus dev token mints, then records `genesis_applied` so restarts
//! skip it.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use swapx_core::types::{Amount, Principal, TokenId};
use swapx_state::{MemoryTokenLedger, StateDb};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenesisParams {
    /// Native balances credited at the engine.
    #[serde(default)]
    pub native_balances: Vec<GenesisBalance>,
    /// Dev-ledger token mints (ignored when an external ledger is used).
    #[serde(default)]
    pub token_mints: Vec<GenesisMint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub principal: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisMint {
    pub token: String,
    pub principal: String,
    pub amount: String,
}

pub fn load_params(path: &Path) -> anyhow::Result<GenesisParams> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading genesis params {}", path.display()))?;
    serde_json::from_str(&raw).context("parsing genesis params")
}

pub fn apply_genesis(
    db: &StateDb,
    ledger: &MemoryTokenLedger,
    params: &GenesisParams,
) -> anyhow::Result<()> {
    for entry in &params.native_balances {
        let principal = Principal::from_hex(&entry.principal)
            .map_err(|e| anyhow::anyhow!("genesis principal {}: {e}", entry.principal))?;
        let amount = Amount::from_dec_str(&entry.amount)
            .map_err(|e| anyhow::anyhow!("genesis amount {}: {e}", entry.amount))?;
        db.put_balance(&principal, amount)?;
    }
    for entry in &params.token_mints {
        let token = TokenId::from_hex(&entry.token)
            .map_err(|e| anyhow::anyhow!("genesis token {}: {e}", entry.token))?;
        let principal = Principal::from_hex(&entry.principal)
            .map_err(|e| anyhow::anyhow!("genesis principal {}: {e}", entry.principal))?;
        let amount = Amount::from_dec_str(&entry.amount)
            .map_err(|e| anyhow::anyhow!("genesis amount {}: {e}", entry.amount))?;
        ledger.mint(token, principal, amount);
    }
    db.put_meta("genesis_applied", b"1")?;
    db.flush()?;
    Ok(())
}
