//! Roulette domain types.
//!
//! Defines bets, vault accounting state and constants used by the execution layer and clients.

mod bet;
mod codec;
mod constants;
mod vault;

pub use bet::*;
pub use codec::{message_encode_size, read_message, truncate_message, write_message};
pub use constants::*;
pub use vault::*;
