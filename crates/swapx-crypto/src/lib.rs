pub mod hash;
pub mod lockid;

pub use hash::{blake3_hash, hashed_secret};
pub use lockid::{encode_lock_params, lock_id};
