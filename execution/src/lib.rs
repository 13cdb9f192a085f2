//! Wheelhouse execution layer.
//!
//! Deterministic execution of European roulette with commit-reveal settlement. A player commits
//! to `sha256(secret)` when placing a wager, then reveals the secret a few blocks later; the
//! pocket is derived from the secret and the hash of the block after the commit, neither of which
//! the other party controlled alone. House liquidity is pooled in a share-based vault that
//! reserves the worst-case payout of every open wager.
//!
//! ## Determinism requirements
//! - Do not use wall-clock time inside execution.
//! - Randomness comes only from the player's secret and a finalized block hash.
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! The primary entrypoint is [`Layer`]; [`state_transition::execute_block`] wraps it for a whole
//! block.
//!
//! ## Minimal execution pipeline (example)
//! ```rust,ignore
//! use wheelhouse_execution::{chain::BlockHistory, config::Config, state_transition::execute_block};
//!
//! let config = Config::from_yaml(&std::fs::read_to_string("wheelhouse.yaml")?)?;
//! let mut history = BlockHistory::new(config.block_hash_retention);
//! let result = execute_block(&mut state, &mut history, &config, &seed, transactions).await?;
//! ```

pub mod casino;
pub mod chain;
pub mod config;
pub mod ledger;
pub mod query;
pub mod rng_pipeline;
pub mod state_transition;
pub mod vault;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod layer;

mod state;

pub use chain::{BlockHashes, BlockHistory};
pub use config::{Config, ConfigError};
pub use layer::{ExecutionError, Layer};
pub use ledger::{BetError, BetLedger, LedgerCapability, LedgerRules, Outcome, Settlement};
pub use query::{
    query_bet_status, query_ledger, query_shares, query_vault, BetStatus, ShareBalance,
    VaultSnapshot,
};
pub use rng_pipeline::{compute_commitment, derive_result, verify_commitment, CommitRevealPair};
pub use state::{
    balance, fund_account, load_bet, load_ledger, load_shares, load_vault, nonce, Adb,
    PrepareError, State, Status,
};
pub use vault::{LedgerAccess, LiquidityVault, VaultError};

#[cfg(any(test, feature = "mocks"))]
pub use state::Memory;
