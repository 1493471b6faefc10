//! swapx-state
//!
//! Persistent escrow state and the swap engine: the sled-backed `StateDb`,
//! the `LockStore` hash-timelock cells, the ordered `StashBook`, and the
//! `SwapEngine` operation surface that ties them to the external token
//! ledger, proxy directory, and clock.

pub mod db;
pub mod directory;
pub mod engine;
pub mod ledger;
pub mod locks;
pub mod stash;

pub use db::StateDb;
pub use directory::ProxyRegistry;
pub use engine::SwapEngine;
pub use ledger::MemoryTokenLedger;
pub use locks::LockStore;
pub use stash::{StashBook, StashNode};
