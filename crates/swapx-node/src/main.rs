//! swapx-node — the SwapX escrow-engine daemon.
//!
//! Startup sequence:
//!   1. Open (or initialise) the state database
//!   2. Apply genesis if the DB is fresh
//!   3. Start the JSON-RPC 2.0 server
//!   4. Wait for shutdown, then flush state to disk

mod genesis;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use swapx_core::traits::{AccountDirectory, Clock, SystemClock, TokenLedger};
use swapx_core::types::Principal;
use swapx_rpc::{RpcServer, RpcServerState};
use swapx_state::{MemoryTokenLedger, ProxyRegistry, StateDb, SwapEngine};

use genesis::{apply_genesis, load_params, GenesisParams};

#[derive(Parser, Debug)]
#[command(
    name = "swapx-node",
    version,
    about = "SwapX node — hash-timelock atomic-swap escrow engine"
)]
struct Args {
    /// Directory for the persistent state database.
    #[arg(long, default_value = "~/.swapx/data")]
    data_dir: PathBuf,

    /// JSON-RPC listen address.
    #[arg(long, default_value = "127.0.0.1:8656")]
    rpc_addr: SocketAddr,

    /// Path to genesis params JSON (only read on first run).
    #[arg(long)]
    genesis_params: Option<PathBuf>,

    /// The engine's holding principal on external token ledgers.
    #[arg(long, default_value = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee")]
    holding: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,swapx=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("SwapX node starting");

    let holding = Principal::from_hex(&args.holding)
        .map_err(|e| anyhow::anyhow!("invalid holding principal: {e}"))?;

    // ── State database ────────────────────────────────────────────────────────
    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let db = Arc::new(StateDb::open(&data_dir).context("opening state database")?);

    // ── External collaborators ────────────────────────────────────────────────
    let ledger = Arc::new(MemoryTokenLedger::new(holding));
    let registry = Arc::new(ProxyRegistry::new(Arc::clone(&db)));

    // ── Genesis if fresh ──────────────────────────────────────────────────────
    if db.get_meta("genesis_applied")?.is_none() {
        info!("fresh database — applying genesis");
        let params = match args.genesis_params.as_deref() {
            Some(path) => load_params(path)?,
            None => GenesisParams::default(),
        };
        apply_genesis(&db, &ledger, &params).context("applying genesis")?;
    } else {
        info!("existing database found — skipping genesis");
    }

    // ── Engine ────────────────────────────────────────────────────────────────
    let engine = Arc::new(SwapEngine::new(
        Arc::clone(&db),
        Arc::clone(&ledger) as Arc<dyn TokenLedger>,
        Arc::clone(&registry) as Arc<dyn AccountDirectory>,
        Arc::new(SystemClock) as Arc<dyn Clock>,
        holding,
    ));

    // ── RPC server ────────────────────────────────────────────────────────────
    let rpc_state = Arc::new(RpcServerState { engine, registry });
    let _rpc_handle = RpcServer::new(rpc_state)
        .start(args.rpc_addr)
        .await
        .context("starting RPC server")?;

    info!("node ready");
    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    info!("shutting down");
    db.flush()?;
    Ok(())
}

fn expand_tilde(p: &Path) -> PathBuf {
    if let Ok(stripped) = p.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    p.to_path_buf()
}
