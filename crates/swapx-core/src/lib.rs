pub mod constants;
pub mod error;
pub mod event;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::SwapError;
pub use event::SwapEvent;
pub use traits::{AccountDirectory, Clock, SystemClock, TokenLedger};
pub use types::*;
