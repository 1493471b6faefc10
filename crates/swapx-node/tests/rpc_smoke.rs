//! End-to-end smoke test for the SwapX RPC surface.
//!
//! Builds the engine and JSON-RPC server in-process against a fresh database,
//! drives a stash round trip and a native buy-lock/unlock over HTTP, and
//! asserts state changes are reflected through the read surface.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use swapx_core::traits::{AccountDirectory, Clock, SystemClock, TokenLedger};
use swapx_core::types::{Amount, Principal, Secret};
use swapx_crypto::hash::hashed_secret;
use swapx_rpc::{RpcServer, RpcServerState};
use swapx_state::{MemoryTokenLedger, ProxyRegistry, StateDb, SwapEngine};

/// Find a free TCP port on loopback.
fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

async fn rpc_call(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 1
    });
    let resp = client
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap_or_else(|e| panic!("RPC call {method} failed: {e}"));
    let json: serde_json::Value = resp.json().await.expect("parse RPC JSON");
    if let Some(err) = json.get("error") {
        if !err.is_null() {
            panic!("RPC error from {method}: {err}");
        }
    }
    json["result"].clone()
}

async fn start_test_server(name: &str) -> (String, Arc<StateDb>) {
    let dir = std::env::temp_dir().join(format!("swapx_node_test_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    let db = Arc::new(StateDb::open(&dir).expect("open temp db"));

    let holding = Principal::from_bytes([0xEE; 20]);
    let ledger = Arc::new(MemoryTokenLedger::new(holding));
    let registry = Arc::new(ProxyRegistry::new(Arc::clone(&db)));
    let engine = Arc::new(SwapEngine::new(
        Arc::clone(&db),
        Arc::clone(&ledger) as Arc<dyn TokenLedger>,
        Arc::clone(&registry) as Arc<dyn AccountDirectory>,
        Arc::new(SystemClock) as Arc<dyn Clock>,
        holding,
    ));

    let addr: SocketAddr = format!("127.0.0.1:{}", free_port()).parse().unwrap();
    let state = Arc::new(RpcServerState { engine, registry });
    let handle = RpcServer::new(state).start(addr).await.expect("start RPC server");
    // Keep the server alive for the whole test.
    std::mem::forget(handle);

    (format!("http://{addr}"), db)
}

#[tokio::test]
async fn stash_and_swap_round_trip_over_rpc() {
    let (url, db) = start_test_server("round_trip").await;
    let client = reqwest::Client::new();

    let alice = Principal::from_bytes([0xAA; 20]);
    let bob = Principal::from_bytes([0xBB; 20]);
    db.put_balance(&alice, Amount::from(1_000u64)).unwrap();

    let pair = format!("0x{}", hex::encode([0xA1u8; 32]));

    // ── Stash round trip ──────────────────────────────────────────────────────
    rpc_call(
        &client,
        &url,
        "swapx_depositStash",
        serde_json::json!([{
            "caller": alice.to_hex(),
            "asset": pair,
            "amount": "400",
        }]),
    )
    .await;

    let stashes = rpc_call(
        &client,
        &url,
        "swapx_getStashes",
        serde_json::json!([null, pair, 0, 10]),
    )
    .await;
    assert_eq!(stashes[0]["owner"], alice.to_hex());
    assert_eq!(stashes[0]["value"], "400");

    let withdrawn = rpc_call(
        &client,
        &url,
        "swapx_withdrawStash",
        serde_json::json!([{
            "caller": alice.to_hex(),
            "asset": pair,
        }]),
    )
    .await;
    assert_eq!(withdrawn, "400");

    // ── Native buy lock, then unlock by recipient ─────────────────────────────
    let secret = Secret::from_bytes([0x42; 32]);
    let hs = hashed_secret(&secret);
    let timeout = 4_102_444_800u64; // far enough in the future for a wall clock

    let lock_id = rpc_call(
        &client,
        &url,
        "swapx_lockBuy",
        serde_json::json!([{
            "caller": alice.to_hex(),
            "recipient": bob.to_hex(),
            "hashed_secret": hs.to_hex(),
            "timeout": timeout,
            "sell_asset": pair,
            "sell_price": "1",
            "amount": "500",
        }]),
    )
    .await;

    let value = rpc_call(
        &client,
        &url,
        "swapx_getLockValue",
        serde_json::json!([lock_id]),
    )
    .await;
    assert_eq!(value, "500");

    let derived = rpc_call(
        &client,
        &url,
        "swapx_deriveLockId",
        serde_json::json!([{
            "sender": alice.to_hex(),
            "recipient": bob.to_hex(),
            "hashed_secret": hs.to_hex(),
            "timeout": timeout,
        }]),
    )
    .await;
    assert_eq!(derived, lock_id);

    rpc_call(
        &client,
        &url,
        "swapx_unlockByRecipient",
        serde_json::json!([{
            "caller": bob.to_hex(),
            "counterparty": alice.to_hex(),
            "secret": secret.to_hex(),
            "timeout": timeout,
        }]),
    )
    .await;

    let alice_balance = rpc_call(&client, &url, "swapx_getBalance", serde_json::json!([alice.to_hex()])).await;
    assert_eq!(alice_balance, "500");
    let bob_balance = rpc_call(&client, &url, "swapx_getBalance", serde_json::json!([bob.to_hex()])).await;
    assert_eq!(bob_balance, "500");

    // ── Journal reflects the whole session ────────────────────────────────────
    let events = rpc_call(&client, &url, "swapx_getEvents", serde_json::json!([0, 10])).await;
    let kinds: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["StashAdd", "StashRemove", "BuyLock", "UnlockByRecipient"]);
    assert_eq!(events[3]["secret"], secret.to_hex());
}

#[tokio::test]
async fn invalid_parameters_are_rejected() {
    let (url, _db) = start_test_server("bad_params").await;
    let client = reqwest::Client::new();

    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "method": "swapx_getBalance",
        "params": ["not-hex"],
        "id": 1
    });
    let resp: serde_json::Value = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("json");
    let err = &resp["error"];
    assert_eq!(err["code"], -32602);
}
