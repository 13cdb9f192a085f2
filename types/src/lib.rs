//! Shared types for the wheelhouse roulette table.
//!
//! Everything that is persisted in state or travels between clients and the execution layer lives
//! here and implements the `commonware_codec` traits.

pub mod execution;
pub mod roulette;

pub use execution::{
    transaction_namespace, Account, Event, Instruction, Key, Output, Transaction, Value, NAMESPACE,
};
