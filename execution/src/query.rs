//! Read-only views over committed state.
//!
//! ```rust,ignore
//! let status = query_bet_status(&state, &player, history.next_height(), &config).await?;
//! if status.is_some_and(|s| s.can_reveal) { /* submit RevealBet */ }
//! ```

use anyhow::Result;
use commonware_cryptography::ed25519::PublicKey;
use serde::Serialize;
use wheelhouse_types::roulette::{Bet, LedgerState};

use crate::config::Config;
use crate::ledger::LedgerRules;
use crate::state::{load_bet, load_ledger, load_shares, load_vault, State};
use crate::vault::LiquidityVault;

/// A player's bet as seen from `height`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BetStatus {
    pub bet: Bet,
    /// Pending and inside the reveal window.
    pub can_reveal: bool,
    /// Pending and past the deadline; anyone may force-settle it.
    pub is_expired: bool,
    pub reveal_from: u64,
    pub reveal_deadline: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct VaultSnapshot {
    pub total_capital: u64,
    pub reserved: u64,
    pub available: u64,
    pub max_bet: u64,
    pub share_supply: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ShareBalance {
    pub shares: u64,
    /// Capital the shares would redeem for now, ignoring reservations.
    pub assets: u64,
}

/// Status of `player`'s stored bet at `height`, or `None` if they never placed one.
pub async fn query_bet_status<S: State>(
    state: &S,
    player: &PublicKey,
    height: u64,
    config: &Config,
) -> Result<Option<BetStatus>> {
    let Some(bet) = load_bet(state, player).await? else {
        return Ok(None);
    };
    let rules = LedgerRules::from(config);
    let reveal_from = rules.reveal_from(bet.commit_height);
    let reveal_deadline = rules.reveal_deadline(bet.commit_height);
    let pending = bet.is_pending();
    Ok(Some(BetStatus {
        can_reveal: pending && (reveal_from..=reveal_deadline).contains(&height),
        is_expired: pending && height > reveal_deadline,
        reveal_from,
        reveal_deadline,
        bet,
    }))
}

pub async fn query_vault<S: State>(state: &S, config: &Config) -> Result<VaultSnapshot> {
    let vault = LiquidityVault::new(load_vault(state).await?);
    Ok(VaultSnapshot {
        total_capital: vault.total_capital(),
        reserved: vault.reserved(),
        available: vault.available(),
        max_bet: vault.max_bet(config.max_bet_divisor),
        share_supply: vault.share_supply(),
    })
}

pub async fn query_shares<S: State>(state: &S, depositor: &PublicKey) -> Result<ShareBalance> {
    let shares = load_shares(state, depositor).await?;
    let vault = LiquidityVault::new(load_vault(state).await?);
    Ok(ShareBalance {
        shares,
        assets: vault.convert_to_assets(shares).unwrap_or(0),
    })
}

/// Stakes currently held in escrow and the number of open bets.
pub async fn query_ledger<S: State>(state: &S) -> Result<LedgerState> {
    load_ledger(state).await
}
