//! Game rules. Pure functions only; state and settlement live in [`crate::ledger`].

pub mod roulette;
