//! Table and vault parameters.
//!
//! Every field has a default, so an empty YAML document yields the standard table:
//!
//! ```yaml
//! min_stake: 1000
//! min_deposit: 10000
//! min_reveal_delay: 2
//! max_reveal_delay: 250
//! block_hash_retention: 256
//! max_bet_divisor: 100
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wheelhouse_types::roulette::{
    BLOCK_HASH_RETENTION, MAX_BET_DIVISOR, MAX_REVEAL_DELAY, MIN_DEPOSIT, MIN_REVEAL_DELAY,
    MIN_STAKE,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("min_reveal_delay must be >= 2 (got {value})")]
    RevealDelayTooShort { value: u64 },
    #[error("max_reveal_delay must exceed min_reveal_delay (min={min}, max={max})")]
    EmptyRevealWindow { min: u64, max: u64 },
    #[error(
        "reveal window must end inside block hash retention (max_reveal_delay={max_reveal_delay}, block_hash_retention={retention})"
    )]
    WindowExceedsRetention { max_reveal_delay: u64, retention: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_min_stake")]
    pub min_stake: u64,
    #[serde(default = "default_min_deposit")]
    pub min_deposit: u64,
    #[serde(default = "default_min_reveal_delay")]
    pub min_reveal_delay: u64,
    #[serde(default = "default_max_reveal_delay")]
    pub max_reveal_delay: u64,
    #[serde(default = "default_block_hash_retention")]
    pub block_hash_retention: u64,
    #[serde(default = "default_max_bet_divisor")]
    pub max_bet_divisor: u64,
}

fn default_min_stake() -> u64 {
    MIN_STAKE
}

fn default_min_deposit() -> u64 {
    MIN_DEPOSIT
}

fn default_min_reveal_delay() -> u64 {
    MIN_REVEAL_DELAY
}

fn default_max_reveal_delay() -> u64 {
    MAX_REVEAL_DELAY
}

fn default_block_hash_retention() -> u64 {
    BLOCK_HASH_RETENTION
}

fn default_max_bet_divisor() -> u64 {
    MAX_BET_DIVISOR
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_stake: default_min_stake(),
            min_deposit: default_min_deposit(),
            min_reveal_delay: default_min_reveal_delay(),
            max_reveal_delay: default_max_reveal_delay(),
            block_hash_retention: default_block_hash_retention(),
            max_bet_divisor: default_max_bet_divisor(),
        }
    }
}

fn ensure_nonzero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidNonZero { field, value });
    }
    Ok(())
}

impl Config {
    /// Parse and validate a YAML document.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_nonzero("min_stake", self.min_stake)?;
        ensure_nonzero("max_bet_divisor", self.max_bet_divisor)?;
        ensure_nonzero("block_hash_retention", self.block_hash_retention)?;

        // The block after the commit must not exist when the bet is placed.
        if self.min_reveal_delay < MIN_REVEAL_DELAY {
            return Err(ConfigError::RevealDelayTooShort {
                value: self.min_reveal_delay,
            });
        }
        if self.max_reveal_delay <= self.min_reveal_delay {
            return Err(ConfigError::EmptyRevealWindow {
                min: self.min_reveal_delay,
                max: self.max_reveal_delay,
            });
        }
        // A reveal at the deadline reads `commit + 1`, which is `max_reveal_delay - 1` blocks
        // behind the executing block. Keep that strictly inside retention.
        if self.max_reveal_delay.saturating_add(1) >= self.block_hash_retention {
            return Err(ConfigError::WindowExceedsRetention {
                max_reveal_delay: self.max_reveal_delay,
                retention: self.block_hash_retention,
            });
        }
        Ok(())
    }
}
