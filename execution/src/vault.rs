//! Share-based liquidity vault.
//!
//! Liquidity providers deposit capital for shares. The bet ledger reserves a slice of that
//! capital for every open wager, and the rest (`available`) backs new wagers and withdrawals.
//! Share value moves only when settled wagers pay out of, or lose into, the pool.
//!
//! Invariant: `reserved <= total_capital` after every operation.
//!
//! The wager-facing operations are reachable only through [`LedgerAccess`], which needs a
//! [`LedgerCapability`] that only the bet ledger can construct.

use thiserror::Error;
use tracing::debug;
use wheelhouse_types::roulette::{
    VaultState, ERROR_ARITHMETIC_OVERFLOW, ERROR_BELOW_MINIMUM_DEPOSIT,
    ERROR_INSUFFICIENT_LIQUIDITY, ERROR_INSUFFICIENT_SHARES, ERROR_ZERO_ASSETS, ERROR_ZERO_SHARES,
};

pub use crate::ledger::LedgerCapability;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("deposit below minimum (amount={amount}, minimum={minimum})")]
    BelowMinimumDeposit { amount: u64, minimum: u64 },
    #[error("deposit would mint zero shares (amount={amount})")]
    ZeroSharesMinted { amount: u64 },
    #[error("withdrawal of zero shares")]
    ZeroShares,
    #[error("insufficient shares (requested={requested}, held={held})")]
    InsufficientShares { requested: u64, held: u64 },
    #[error("withdrawal redeems zero assets (shares={shares})")]
    ZeroAssets { shares: u64 },
    #[error("insufficient liquidity (requested={requested}, available={available})")]
    InsufficientLiquidity { requested: u64, available: u64 },
    #[error("release exceeds reservation (amount={amount}, reserved={reserved})")]
    ReleaseExceedsReserved { amount: u64, reserved: u64 },
    #[error("arithmetic overflow")]
    Overflow,
}

impl VaultError {
    pub fn code(&self) -> u8 {
        match self {
            Self::BelowMinimumDeposit { .. } => ERROR_BELOW_MINIMUM_DEPOSIT,
            Self::ZeroSharesMinted { .. } | Self::ZeroShares => ERROR_ZERO_SHARES,
            Self::InsufficientShares { .. } => ERROR_INSUFFICIENT_SHARES,
            Self::ZeroAssets { .. } => ERROR_ZERO_ASSETS,
            Self::InsufficientLiquidity { .. } => ERROR_INSUFFICIENT_LIQUIDITY,
            Self::ReleaseExceedsReserved { .. } | Self::Overflow => ERROR_ARITHMETIC_OVERFLOW,
        }
    }
}

/// `value * numerator / denominator` in u128, `None` if the quotient exceeds u64.
fn mul_div(value: u64, numerator: u64, denominator: u64) -> Option<u64> {
    if denominator == 0 {
        return None;
    }
    let result = (value as u128) * (numerator as u128) / (denominator as u128);
    u64::try_from(result).ok()
}

/// In-memory view of the vault, loaded from and written back to [`VaultState`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiquidityVault {
    state: VaultState,
}

impl LiquidityVault {
    pub fn new(state: VaultState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> VaultState {
        self.state
    }

    pub fn total_capital(&self) -> u64 {
        self.state.total_capital
    }

    pub fn reserved(&self) -> u64 {
        self.state.reserved
    }

    pub fn share_supply(&self) -> u64 {
        self.state.share_supply
    }

    /// Capital not backing any open wager.
    pub fn available(&self) -> u64 {
        self.state.available()
    }

    /// Largest stake accepted for a new wager: `available / divisor`.
    pub fn max_bet(&self, divisor: u64) -> u64 {
        self.available().checked_div(divisor).unwrap_or(0)
    }

    /// Shares a deposit of `amount` would mint right now.
    ///
    /// The first deposit (or any deposit into an empty pool) mints 1:1.
    pub fn convert_to_shares(&self, amount: u64) -> Option<u64> {
        if self.state.share_supply == 0 || self.state.total_capital == 0 {
            return Some(amount);
        }
        mul_div(amount, self.state.share_supply, self.state.total_capital)
    }

    /// Capital `shares` would redeem right now.
    pub fn convert_to_assets(&self, shares: u64) -> Option<u64> {
        if self.state.share_supply == 0 {
            return Some(0);
        }
        mul_div(shares, self.state.total_capital, self.state.share_supply)
    }

    /// Add `amount` to the pool and return the shares minted.
    pub fn deposit(&mut self, amount: u64, minimum: u64) -> Result<u64, VaultError> {
        if amount < minimum {
            return Err(VaultError::BelowMinimumDeposit { amount, minimum });
        }
        let shares = self.convert_to_shares(amount).ok_or(VaultError::Overflow)?;
        if shares == 0 {
            return Err(VaultError::ZeroSharesMinted { amount });
        }
        let total_capital = self
            .state
            .total_capital
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        let share_supply = self
            .state
            .share_supply
            .checked_add(shares)
            .ok_or(VaultError::Overflow)?;

        self.state.total_capital = total_capital;
        self.state.share_supply = share_supply;
        debug!(amount, shares, total_capital, share_supply, "vault deposit");
        Ok(shares)
    }

    /// Burn `shares` out of `held` and return the capital redeemed.
    ///
    /// Capital reserved for open wagers cannot be withdrawn.
    pub fn withdraw(&mut self, shares: u64, held: u64) -> Result<u64, VaultError> {
        if shares == 0 {
            return Err(VaultError::ZeroShares);
        }
        if shares > held {
            return Err(VaultError::InsufficientShares {
                requested: shares,
                held,
            });
        }
        let amount = self.convert_to_assets(shares).ok_or(VaultError::Overflow)?;
        if amount == 0 {
            return Err(VaultError::ZeroAssets { shares });
        }
        let available = self.available();
        if amount > available {
            return Err(VaultError::InsufficientLiquidity {
                requested: amount,
                available,
            });
        }

        // shares <= held <= share_supply and amount <= available <= total_capital
        self.state.total_capital -= amount;
        self.state.share_supply -= shares;
        debug!(
            shares,
            amount,
            total_capital = self.state.total_capital,
            share_supply = self.state.share_supply,
            "vault withdraw"
        );
        Ok(amount)
    }

    /// Wager-facing operations, gated on the ledger's capability.
    pub fn ledger_access(&mut self, _capability: &LedgerCapability) -> LedgerAccess<'_> {
        LedgerAccess { vault: self }
    }
}

/// Mutable handle the bet ledger uses to move reservations and settle wagers.
pub struct LedgerAccess<'a> {
    vault: &'a mut LiquidityVault,
}

impl LedgerAccess<'_> {
    /// Hold back `amount` of available capital for an open wager.
    pub fn reserve(&mut self, amount: u64) -> Result<(), VaultError> {
        let available = self.vault.available();
        if amount > available {
            return Err(VaultError::InsufficientLiquidity {
                requested: amount,
                available,
            });
        }
        self.vault.state.reserved += amount;
        Ok(())
    }

    /// Return a reservation to available capital.
    ///
    /// Releasing more than is reserved means the ledger lost track of a wager and is refused.
    pub fn release(&mut self, amount: u64) -> Result<(), VaultError> {
        let reserved = self.vault.state.reserved;
        self.vault.state.reserved = reserved
            .checked_sub(amount)
            .ok_or(VaultError::ReleaseExceedsReserved { amount, reserved })?;
        Ok(())
    }

    /// Pay `amount` out of available capital.
    pub fn payout(&mut self, amount: u64) -> Result<u64, VaultError> {
        let available = self.vault.available();
        if amount > available {
            return Err(VaultError::InsufficientLiquidity {
                requested: amount,
                available,
            });
        }
        self.vault.state.total_capital -= amount;
        Ok(amount)
    }

    /// Take a losing stake into the pool.
    pub fn absorb_loss(&mut self, amount: u64) -> Result<(), VaultError> {
        self.vault.state.total_capital = self
            .vault
            .state
            .total_capital
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MIN: u64 = 10_000;

    fn funded(amount: u64) -> LiquidityVault {
        let mut vault = LiquidityVault::default();
        vault.deposit(amount, MIN).unwrap();
        vault
    }

    #[test]
    fn test_first_deposit_mints_one_to_one() {
        let mut vault = LiquidityVault::default();
        assert_eq!(vault.deposit(50_000, MIN), Ok(50_000));
        assert_eq!(vault.total_capital(), 50_000);
        assert_eq!(vault.share_supply(), 50_000);
    }

    #[test]
    fn test_deposit_below_minimum() {
        let mut vault = LiquidityVault::default();
        assert_eq!(
            vault.deposit(9_999, MIN),
            Err(VaultError::BelowMinimumDeposit {
                amount: 9_999,
                minimum: MIN
            })
        );
        assert_eq!(vault, LiquidityVault::default());
    }

    #[test]
    fn test_deposit_after_gain_mints_fewer_shares() {
        let mut vault = funded(100_000);
        let capability = LedgerCapability::for_tests();
        vault.ledger_access(&capability).absorb_loss(100_000).unwrap();

        // Share price is now 2.
        assert_eq!(vault.deposit(20_000, MIN), Ok(10_000));
        assert_eq!(vault.convert_to_assets(10_000), Some(20_000));
    }

    #[test]
    fn test_deposit_into_drained_pool_mints_one_to_one() {
        let mut vault = LiquidityVault::new(VaultState {
            total_capital: 0,
            reserved: 0,
            share_supply: 500,
        });
        assert_eq!(vault.deposit(10_000, MIN), Ok(10_000));
    }

    #[test]
    fn test_deposit_rounding_to_zero_shares() {
        // Price of one share is far above the deposit.
        let mut vault = LiquidityVault::new(VaultState {
            total_capital: u64::MAX / 2,
            reserved: 0,
            share_supply: 1,
        });
        assert_eq!(
            vault.deposit(MIN, MIN),
            Err(VaultError::ZeroSharesMinted { amount: MIN })
        );
    }

    #[test]
    fn test_withdraw_all() {
        let mut vault = funded(100_000);
        assert_eq!(vault.withdraw(100_000, 100_000), Ok(100_000));
        assert_eq!(vault.state(), VaultState::default());
    }

    #[test]
    fn test_withdraw_errors() {
        let mut vault = funded(100_000);
        assert_eq!(vault.withdraw(0, 100_000), Err(VaultError::ZeroShares));
        assert_eq!(
            vault.withdraw(10, 5),
            Err(VaultError::InsufficientShares {
                requested: 10,
                held: 5
            })
        );

        let capability = LedgerCapability::for_tests();
        vault.ledger_access(&capability).reserve(60_000).unwrap();
        assert_eq!(
            vault.withdraw(50_000, 100_000),
            Err(VaultError::InsufficientLiquidity {
                requested: 50_000,
                available: 40_000
            })
        );
        assert_eq!(vault.withdraw(40_000, 100_000), Ok(40_000));
        assert_eq!(vault.available(), 0);
    }

    #[test]
    fn test_withdraw_zero_assets() {
        let mut vault = LiquidityVault::new(VaultState {
            total_capital: 1,
            reserved: 0,
            share_supply: 1_000,
        });
        assert_eq!(
            vault.withdraw(10, 1_000),
            Err(VaultError::ZeroAssets { shares: 10 })
        );
    }

    #[test]
    fn test_reserve_release_payout() {
        let mut vault = funded(100_000);
        let capability = LedgerCapability::for_tests();
        let mut access = vault.ledger_access(&capability);

        access.reserve(36_000).unwrap();
        assert_eq!(
            access.reserve(64_001),
            Err(VaultError::InsufficientLiquidity {
                requested: 64_001,
                available: 64_000
            })
        );
        access.release(36_000).unwrap();
        assert_eq!(
            access.release(1),
            Err(VaultError::ReleaseExceedsReserved {
                amount: 1,
                reserved: 0
            })
        );
        assert_eq!(access.payout(35_000), Ok(35_000));
        assert_eq!(
            access.payout(65_001),
            Err(VaultError::InsufficientLiquidity {
                requested: 65_001,
                available: 65_000
            })
        );

        assert_eq!(vault.total_capital(), 65_000);
        assert_eq!(vault.reserved(), 0);
    }

    #[test]
    fn test_max_bet() {
        let mut vault = funded(100_000);
        assert_eq!(vault.max_bet(100), 1_000);
        let capability = LedgerCapability::for_tests();
        vault.ledger_access(&capability).reserve(50_000).unwrap();
        assert_eq!(vault.max_bet(100), 500);
        assert_eq!(vault.max_bet(0), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Deposit(u64),
        Withdraw(u64),
        Reserve(u64),
        Release(u64),
        Payout(u64),
        Absorb(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u64..1_000_000).prop_map(Op::Deposit),
            (0u64..1_000_000).prop_map(Op::Withdraw),
            (0u64..1_000_000).prop_map(Op::Reserve),
            (0u64..1_000_000).prop_map(Op::Release),
            (0u64..1_000_000).prop_map(Op::Payout),
            (0u64..1_000_000).prop_map(Op::Absorb),
        ]
    }

    proptest! {
        #[test]
        fn reserved_never_exceeds_capital(ops in prop::collection::vec(op(), 1..64)) {
            let capability = LedgerCapability::for_tests();
            let mut vault = LiquidityVault::default();
            let mut held = 0u64;
            let mut outstanding = 0u64;
            for op in ops {
                let before = vault;
                let result = match op {
                    Op::Deposit(amount) => vault.deposit(amount, MIN).map(|shares| held += shares),
                    Op::Withdraw(shares) => vault.withdraw(shares, held).map(|_| held -= shares),
                    Op::Reserve(amount) => vault
                        .ledger_access(&capability)
                        .reserve(amount)
                        .map(|_| outstanding += amount),
                    Op::Release(amount) => vault
                        .ledger_access(&capability)
                        .release(amount)
                        .map(|_| outstanding -= amount),
                    Op::Payout(amount) => vault.ledger_access(&capability).payout(amount).map(|_| ()),
                    Op::Absorb(amount) => vault.ledger_access(&capability).absorb_loss(amount),
                };
                if result.is_err() {
                    prop_assert_eq!(vault, before);
                }
                prop_assert!(vault.reserved() <= vault.total_capital());
                prop_assert_eq!(vault.reserved(), outstanding);
                prop_assert_eq!(vault.share_supply(), held);
            }
        }

        #[test]
        fn withdraw_never_beats_deposit(first in MIN..10_000_000u64, second in MIN..10_000_000u64) {
            let mut vault = funded(first);
            let shares = vault.deposit(second, MIN).unwrap();
            let redeemed = vault.withdraw(shares, shares).unwrap();
            prop_assert!(redeemed <= second);
        }
    }
}
