//! Bet lifecycle: `Empty -> Pending -> Settled`.
//!
//! A settled bet behaves like an empty slot for the next placement. The ledger is pure: callers
//! load the player's bet, the vault and the ledger totals, hand them in, and persist whatever
//! comes back. Every operation either returns `Ok` with all its mutations applied or `Err` with
//! none of them.

use thiserror::Error;
use wheelhouse_types::roulette::{
    Bet, BetType, LedgerState, COMMITMENT_LEN, ERROR_ALREADY_SETTLED, ERROR_ARITHMETIC_OVERFLOW,
    ERROR_COMMITMENT_MISMATCH, ERROR_EXPIRED, ERROR_INVALID_BET_DATA, ERROR_INVALID_BET_TYPE,
    ERROR_NOT_YET_EXPIRED, ERROR_NO_BET, ERROR_PENDING_BET_EXISTS, ERROR_RANDOMNESS_UNAVAILABLE,
    ERROR_STAKE_TOO_LARGE, ERROR_STAKE_TOO_SMALL, ERROR_TOO_EARLY, ERROR_ZERO_COMMITMENT,
};

use crate::casino::roulette;
use crate::chain::BlockHashes;
use crate::config::Config;
use crate::rng_pipeline::{derive_result, verify_commitment};
use crate::vault::{LiquidityVault, VaultError};

/// Proof of being the bet ledger. Required to reserve, release, pay out or absorb vault capital.
#[derive(Debug)]
pub struct LedgerCapability {
    _private: (),
}

impl LedgerCapability {
    fn issue() -> Self {
        Self { _private: () }
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::issue()
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BetError {
    #[error("player already has a pending bet")]
    PendingBetExists,
    #[error("commitment must be non-zero")]
    ZeroCommitment,
    #[error("stake too small (amount={amount}, minimum={minimum})")]
    StakeTooSmall { amount: u64, minimum: u64 },
    #[error("stake too large (amount={amount}, maximum={maximum})")]
    StakeTooLarge { amount: u64, maximum: u64 },
    #[error("unknown bet type: {0}")]
    InvalidBetType(u8),
    #[error("invalid bet data (bet_type={bet_type:?}, bet_data={bet_data})")]
    InvalidBetData { bet_type: BetType, bet_data: u16 },
    #[error("no bet found")]
    NoBet,
    #[error("bet already settled")]
    AlreadySettled,
    #[error("reveal too early (height={height}, reveal_from={reveal_from})")]
    TooEarly { height: u64, reveal_from: u64 },
    #[error("reveal window expired (height={height}, deadline={deadline})")]
    Expired { height: u64, deadline: u64 },
    #[error("reveal window still open (height={height}, deadline={deadline})")]
    NotYetExpired { height: u64, deadline: u64 },
    #[error("secret does not match commitment")]
    CommitmentMismatch,
    #[error("block hash unavailable (height={height})")]
    RandomnessUnavailable { height: u64 },
    #[error("arithmetic overflow")]
    Overflow,
    #[error(transparent)]
    Vault(#[from] VaultError),
}

impl BetError {
    pub fn code(&self) -> u8 {
        match self {
            Self::PendingBetExists => ERROR_PENDING_BET_EXISTS,
            Self::ZeroCommitment => ERROR_ZERO_COMMITMENT,
            Self::StakeTooSmall { .. } => ERROR_STAKE_TOO_SMALL,
            Self::StakeTooLarge { .. } => ERROR_STAKE_TOO_LARGE,
            Self::InvalidBetType(_) => ERROR_INVALID_BET_TYPE,
            Self::InvalidBetData { .. } => ERROR_INVALID_BET_DATA,
            Self::NoBet => ERROR_NO_BET,
            Self::AlreadySettled => ERROR_ALREADY_SETTLED,
            Self::TooEarly { .. } => ERROR_TOO_EARLY,
            Self::Expired { .. } => ERROR_EXPIRED,
            Self::NotYetExpired { .. } => ERROR_NOT_YET_EXPIRED,
            Self::CommitmentMismatch => ERROR_COMMITMENT_MISMATCH,
            Self::RandomnessUnavailable { .. } => ERROR_RANDOMNESS_UNAVAILABLE,
            Self::Overflow => ERROR_ARITHMETIC_OVERFLOW,
            Self::Vault(e) => e.code(),
        }
    }
}

/// Parameters the ledger enforces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerRules {
    pub min_stake: u64,
    pub min_reveal_delay: u64,
    pub max_reveal_delay: u64,
    pub max_bet_divisor: u64,
}

impl From<&Config> for LedgerRules {
    fn from(config: &Config) -> Self {
        Self {
            min_stake: config.min_stake,
            min_reveal_delay: config.min_reveal_delay,
            max_reveal_delay: config.max_reveal_delay,
            max_bet_divisor: config.max_bet_divisor,
        }
    }
}

impl Default for LedgerRules {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl LedgerRules {
    /// First height at which a bet committed at `commit_height` may be revealed.
    pub fn reveal_from(&self, commit_height: u64) -> u64 {
        commit_height.saturating_add(self.min_reveal_delay)
    }

    /// Last height at which a bet committed at `commit_height` may be revealed.
    pub fn reveal_deadline(&self, commit_height: u64) -> u64 {
        commit_height.saturating_add(self.max_reveal_delay)
    }
}

/// How a settled bet ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Revealed { result: u8, won: bool },
    Forfeited,
}

/// A settled bet and what it moved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub bet: Bet,
    pub outcome: Outcome,
    /// Owed to the player: stake plus winnings on a win, zero otherwise.
    pub payout: u64,
}

/// The bet state machine. Holds the only [`LedgerCapability`].
pub struct BetLedger {
    rules: LedgerRules,
    capability: LedgerCapability,
}

impl BetLedger {
    pub fn new(rules: LedgerRules) -> Self {
        Self {
            rules,
            capability: LedgerCapability::issue(),
        }
    }

    pub fn rules(&self) -> &LedgerRules {
        &self.rules
    }

    /// Open a new bet at `height`.
    ///
    /// The stake moves into ledger escrow and `stake * (1 + multiplier)` of vault capital is
    /// reserved against the worst case.
    #[allow(clippy::too_many_arguments)]
    pub fn place(
        &self,
        existing: Option<&Bet>,
        vault: &mut LiquidityVault,
        totals: &mut LedgerState,
        commitment: [u8; COMMITMENT_LEN],
        bet_type: u8,
        bet_data: u16,
        amount: u64,
        height: u64,
    ) -> Result<Bet, BetError> {
        if existing.is_some_and(Bet::is_pending) {
            return Err(BetError::PendingBetExists);
        }
        if commitment == [0u8; COMMITMENT_LEN] {
            return Err(BetError::ZeroCommitment);
        }
        if amount < self.rules.min_stake {
            return Err(BetError::StakeTooSmall {
                amount,
                minimum: self.rules.min_stake,
            });
        }
        let maximum = vault.max_bet(self.rules.max_bet_divisor);
        if amount > maximum {
            return Err(BetError::StakeTooLarge { amount, maximum });
        }
        let bet_type = BetType::try_from(bet_type).map_err(|e| BetError::InvalidBetType(e.0))?;
        if !roulette::is_valid_bet_data(bet_type, bet_data) {
            return Err(BetError::InvalidBetData { bet_type, bet_data });
        }

        let reserved_payout =
            roulette::total_payout(bet_type, amount).ok_or(BetError::Overflow)?;
        let next_totals = LedgerState {
            escrowed: totals.escrowed.checked_add(amount).ok_or(BetError::Overflow)?,
            pending_bets: totals.pending_bets + 1,
        };
        vault
            .ledger_access(&self.capability)
            .reserve(reserved_payout)?;
        *totals = next_totals;

        Ok(Bet {
            commitment,
            amount,
            bet_type,
            bet_data,
            commit_height: height,
            reserved_payout,
            settled: false,
            result: None,
            payout: 0,
        })
    }

    /// Settle a bet by revealing its secret at `height`.
    ///
    /// The pocket comes from the hash of block `commit_height + 1`.
    pub fn reveal(
        &self,
        bet: Option<Bet>,
        vault: &mut LiquidityVault,
        totals: &mut LedgerState,
        secret: &[u8; COMMITMENT_LEN],
        height: u64,
        hashes: &impl BlockHashes,
    ) -> Result<Settlement, BetError> {
        let mut bet = bet.ok_or(BetError::NoBet)?;
        if bet.settled {
            return Err(BetError::AlreadySettled);
        }
        let reveal_from = self.rules.reveal_from(bet.commit_height);
        if height < reveal_from {
            return Err(BetError::TooEarly {
                height,
                reveal_from,
            });
        }
        let deadline = self.rules.reveal_deadline(bet.commit_height);
        if height > deadline {
            return Err(BetError::Expired { height, deadline });
        }
        if !verify_commitment(&bet.commitment, secret) {
            return Err(BetError::CommitmentMismatch);
        }
        let source = bet.commit_height + 1;
        let block_hash = hashes
            .block_hash(source)
            .ok_or(BetError::RandomnessUnavailable { height: source })?;

        let result = derive_result(secret, &block_hash);
        let won = roulette::is_winner(result, bet.bet_type, bet.bet_data);

        let mut next_vault = *vault;
        let next_totals = release_escrow(totals, bet.amount)?;
        let payout = {
            let mut access = next_vault.ledger_access(&self.capability);
            access.release(bet.reserved_payout)?;
            if won {
                // The stake comes back out of escrow; only the winnings leave the vault.
                let winnings = bet.reserved_payout - bet.amount;
                access.payout(winnings)?;
                bet.reserved_payout
            } else {
                access.absorb_loss(bet.amount)?;
                0
            }
        };

        *vault = next_vault;
        *totals = next_totals;
        bet.settled = true;
        bet.result = Some(result);
        bet.payout = payout;

        Ok(Settlement {
            bet,
            outcome: Outcome::Revealed { result, won },
            payout,
        })
    }

    /// Forfeit a bet whose reveal window closed. Anyone may call this.
    pub fn force_settle(
        &self,
        bet: Option<Bet>,
        vault: &mut LiquidityVault,
        totals: &mut LedgerState,
        height: u64,
    ) -> Result<Settlement, BetError> {
        let mut bet = bet.ok_or(BetError::NoBet)?;
        if bet.settled {
            return Err(BetError::AlreadySettled);
        }
        let deadline = self.rules.reveal_deadline(bet.commit_height);
        if height <= deadline {
            return Err(BetError::NotYetExpired { height, deadline });
        }

        let mut next_vault = *vault;
        let next_totals = release_escrow(totals, bet.amount)?;
        {
            let mut access = next_vault.ledger_access(&self.capability);
            access.release(bet.reserved_payout)?;
            access.absorb_loss(bet.amount)?;
        }

        *vault = next_vault;
        *totals = next_totals;
        bet.settled = true;
        bet.payout = 0;

        Ok(Settlement {
            bet,
            outcome: Outcome::Forfeited,
            payout: 0,
        })
    }
}

fn release_escrow(totals: &LedgerState, amount: u64) -> Result<LedgerState, BetError> {
    Ok(LedgerState {
        escrowed: totals.escrowed.checked_sub(amount).ok_or(BetError::Overflow)?,
        pending_bets: totals.pending_bets.checked_sub(1).ok_or(BetError::Overflow)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::BlockHistory;
    use crate::rng_pipeline::compute_commitment;
    use commonware_cryptography::{sha256::Sha256, Hasher};
    use proptest::prelude::*;
    use wheelhouse_types::roulette::{split_data, ERROR_INSUFFICIENT_LIQUIDITY, MIN_DEPOSIT};

    const SECRET: [u8; 32] = [42u8; 32];

    struct Fixture {
        ledger: BetLedger,
        vault: LiquidityVault,
        totals: LedgerState,
        history: BlockHistory,
    }

    impl Fixture {
        fn new(capital: u64) -> Self {
            let mut vault = LiquidityVault::default();
            vault.deposit(capital, MIN_DEPOSIT).unwrap();
            Self {
                ledger: BetLedger::new(LedgerRules::default()),
                vault,
                totals: LedgerState::default(),
                history: BlockHistory::default(),
            }
        }

        fn height(&self) -> u64 {
            self.history.next_height()
        }

        fn advance(&mut self, blocks: u64) {
            for _ in 0..blocks {
                let height = self.history.next_height();
                self.history.push(Sha256::hash(&height.to_be_bytes()));
            }
        }

        fn place(&mut self, bet_type: BetType, bet_data: u16, amount: u64) -> Result<Bet, BetError> {
            let height = self.height();
            self.ledger.place(
                None,
                &mut self.vault,
                &mut self.totals,
                compute_commitment(&SECRET),
                bet_type as u8,
                bet_data,
                amount,
                height,
            )
        }

        fn reveal(&mut self, bet: Bet, secret: &[u8; 32]) -> Result<Settlement, BetError> {
            let height = self.height();
            self.ledger.reveal(
                Some(bet),
                &mut self.vault,
                &mut self.totals,
                secret,
                height,
                &self.history,
            )
        }
    }

    #[test]
    fn test_place_reserves_worst_case() {
        let mut fixture = Fixture::new(1_000_000);
        let bet = fixture.place(BetType::Straight, 17, 1_000).unwrap();
        assert_eq!(bet.reserved_payout, 36_000);
        assert_eq!(bet.commit_height, 1);
        assert!(bet.is_pending());
        assert_eq!(fixture.vault.reserved(), 36_000);
        assert_eq!(fixture.vault.total_capital(), 1_000_000);
        assert_eq!(
            fixture.totals,
            LedgerState {
                escrowed: 1_000,
                pending_bets: 1
            }
        );
    }

    #[test]
    fn test_place_precondition_order() {
        let mut fixture = Fixture::new(1_000_000);
        let pending = fixture.place(BetType::Red, 0, 1_000).unwrap();
        let ledger = &fixture.ledger;
        let vault = &mut fixture.vault;
        let totals = &mut fixture.totals;

        // Pending bet wins over every other problem.
        assert_eq!(
            ledger.place(Some(&pending), vault, totals, [0u8; 32], 99, 999, 0, 1),
            Err(BetError::PendingBetExists)
        );
        assert_eq!(
            ledger.place(None, vault, totals, [0u8; 32], 99, 999, 0, 1),
            Err(BetError::ZeroCommitment)
        );
        assert_eq!(
            ledger.place(None, vault, totals, [1u8; 32], 99, 999, 999, 1),
            Err(BetError::StakeTooSmall {
                amount: 999,
                minimum: 1_000
            })
        );
        let maximum = vault.max_bet(100);
        assert_eq!(
            ledger.place(None, vault, totals, [1u8; 32], 99, 999, maximum + 1, 1),
            Err(BetError::StakeTooLarge {
                amount: maximum + 1,
                maximum
            })
        );
        assert_eq!(
            ledger.place(None, vault, totals, [1u8; 32], 99, 999, 1_000, 1),
            Err(BetError::InvalidBetType(99))
        );
        assert_eq!(
            ledger.place(None, vault, totals, [1u8; 32], 0, 999, 1_000, 1),
            Err(BetError::InvalidBetData {
                bet_type: BetType::Straight,
                bet_data: 999
            })
        );
    }

    #[test]
    fn test_settled_slot_accepts_new_bet() {
        let mut fixture = Fixture::new(1_000_000);
        let bet = fixture.place(BetType::Red, 0, 1_000).unwrap();
        fixture.advance(2);
        let settlement = fixture.reveal(bet, &SECRET).unwrap();
        let height = fixture.height();
        let next = fixture.ledger.place(
            Some(&settlement.bet),
            &mut fixture.vault,
            &mut fixture.totals,
            [9u8; 32],
            BetType::Black as u8,
            0,
            1_000,
            height,
        );
        assert!(next.is_ok());
    }

    #[test]
    fn test_insufficient_liquidity_leaves_state() {
        // Max bet allows the stake but the straight-up reservation does not fit.
        let mut fixture = Fixture::new(MIN_DEPOSIT * 10);
        let capability = LedgerCapability::issue();
        fixture
            .vault
            .ledger_access(&capability)
            .reserve(MIN_DEPOSIT * 10 - 30_000)
            .unwrap();
        let before = (fixture.vault, fixture.totals);
        let rules = LedgerRules {
            max_bet_divisor: 1,
            ..LedgerRules::default()
        };
        let ledger = BetLedger::new(rules);
        let result = ledger.place(
            None,
            &mut fixture.vault,
            &mut fixture.totals,
            [1u8; 32],
            BetType::Straight as u8,
            17,
            1_000,
            1,
        );
        assert_eq!(
            result,
            Err(BetError::Vault(VaultError::InsufficientLiquidity {
                requested: 36_000,
                available: 30_000
            }))
        );
        assert_eq!(result.unwrap_err().code(), ERROR_INSUFFICIENT_LIQUIDITY);
        assert_eq!((fixture.vault, fixture.totals), before);
    }

    #[test]
    fn test_reveal_straight_seventeen() {
        let mut fixture = Fixture::new(1_000_000);
        let bet = fixture.place(BetType::Straight, 17, 1_000).unwrap();
        fixture.advance(3);

        let settlement = fixture.reveal(bet, &SECRET).unwrap();
        let Outcome::Revealed { result, won } = settlement.outcome else {
            panic!("expected a revealed outcome");
        };
        let block_hash = fixture.history.block_hash(2).unwrap();
        assert_eq!(result, derive_result(&SECRET, &block_hash));
        assert_eq!(won, result == 17);
        assert!(settlement.bet.settled);
        assert_eq!(settlement.bet.result, Some(result));
        assert_eq!(fixture.vault.reserved(), 0);
        assert_eq!(fixture.totals, LedgerState::default());
        if won {
            assert_eq!(settlement.payout, 36_000);
            assert_eq!(fixture.vault.total_capital(), 1_000_000 - 35_000);
        } else {
            assert_eq!(settlement.payout, 0);
            assert_eq!(fixture.vault.total_capital(), 1_001_000);
        }
    }

    #[test]
    fn test_reveal_win_and_loss_accounting() {
        // Cover every pocket with one straight bet each on a fresh fixture sharing block hashes:
        // exactly one of them wins.
        let mut outcomes = Vec::new();
        for number in 0..=36u16 {
            let mut fixture = Fixture::new(10_000_000);
            let bet = fixture.place(BetType::Straight, number, 1_000).unwrap();
            fixture.advance(2);
            let settlement = fixture.reveal(bet, &SECRET).unwrap();
            let capital = fixture.vault.total_capital();
            match settlement.outcome {
                Outcome::Revealed { won: true, .. } => {
                    assert_eq!(settlement.payout, 36_000);
                    assert_eq!(capital, 10_000_000 - 35_000);
                }
                Outcome::Revealed { won: false, .. } => {
                    assert_eq!(settlement.payout, 0);
                    assert_eq!(capital, 10_000_000 + 1_000);
                }
                Outcome::Forfeited => panic!("unexpected forfeit"),
            }
            outcomes.push(settlement.payout > 0);
        }
        assert_eq!(outcomes.iter().filter(|won| **won).count(), 1);
    }

    #[test]
    fn test_reveal_too_early() {
        let mut fixture = Fixture::new(1_000_000);
        let bet = fixture.place(BetType::Red, 0, 1_000).unwrap();
        fixture.advance(1);
        assert_eq!(
            fixture.reveal(bet, &SECRET),
            Err(BetError::TooEarly {
                height: 2,
                reveal_from: 3
            })
        );
    }

    #[test]
    fn test_reveal_expired_then_force_settle() {
        let mut fixture = Fixture::new(1_000_000);
        let bet = fixture.place(BetType::Red, 0, 1_000).unwrap();
        fixture.advance(251);
        assert_eq!(
            fixture.reveal(bet.clone(), &SECRET),
            Err(BetError::Expired {
                height: 252,
                deadline: 251
            })
        );

        let settlement = fixture
            .ledger
            .force_settle(Some(bet), &mut fixture.vault, &mut fixture.totals, 252)
            .unwrap();
        assert_eq!(settlement.outcome, Outcome::Forfeited);
        assert!(settlement.bet.settled);
        assert_eq!(settlement.bet.result, None);
        assert_eq!(fixture.vault.reserved(), 0);
        assert_eq!(fixture.vault.total_capital(), 1_001_000);
        assert_eq!(fixture.totals, LedgerState::default());
    }

    #[test]
    fn test_reveal_at_deadline() {
        let mut fixture = Fixture::new(1_000_000);
        let bet = fixture.place(BetType::Red, 0, 1_000).unwrap();
        fixture.advance(250);
        assert_eq!(fixture.height(), 251);
        assert!(fixture.reveal(bet, &SECRET).is_ok());
    }

    #[test]
    fn test_force_settle_errors() {
        let mut fixture = Fixture::new(1_000_000);
        let ledger = &fixture.ledger;
        assert_eq!(
            ledger.force_settle(None, &mut fixture.vault, &mut fixture.totals, 10),
            Err(BetError::NoBet)
        );
        let bet = fixture.place(BetType::Red, 0, 1_000).unwrap();
        assert_eq!(
            fixture
                .ledger
                .force_settle(Some(bet.clone()), &mut fixture.vault, &mut fixture.totals, 251),
            Err(BetError::NotYetExpired {
                height: 251,
                deadline: 251
            })
        );
        let settled = Bet {
            settled: true,
            ..bet
        };
        assert_eq!(
            fixture
                .ledger
                .force_settle(Some(settled), &mut fixture.vault, &mut fixture.totals, 300),
            Err(BetError::AlreadySettled)
        );
    }

    #[test]
    fn test_reveal_mismatch_leaves_state() {
        let mut fixture = Fixture::new(1_000_000);
        let bet = fixture.place(BetType::Red, 0, 1_000).unwrap();
        fixture.advance(3);
        let before = (fixture.vault, fixture.totals);
        assert_eq!(
            fixture.reveal(bet, &[7u8; 32]),
            Err(BetError::CommitmentMismatch)
        );
        assert_eq!((fixture.vault, fixture.totals), before);
    }

    #[test]
    fn test_reveal_without_bet() {
        let mut fixture = Fixture::new(1_000_000);
        let height = fixture.height();
        assert_eq!(
            fixture.ledger.reveal(
                None,
                &mut fixture.vault,
                &mut fixture.totals,
                &SECRET,
                height,
                &fixture.history
            ),
            Err(BetError::NoBet)
        );
    }

    #[test]
    fn test_reveal_randomness_unavailable() {
        // A history that retains too little to cover the reveal window.
        let mut fixture = Fixture::new(1_000_000);
        fixture.history = BlockHistory::new(4);
        let bet = fixture.place(BetType::Red, 0, 1_000).unwrap();
        fixture.advance(10);
        assert_eq!(
            fixture.reveal(bet, &SECRET),
            Err(BetError::RandomnessUnavailable { height: 2 })
        );
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            BetError::PendingBetExists,
            BetError::ZeroCommitment,
            BetError::StakeTooSmall {
                amount: 0,
                minimum: 0,
            },
            BetError::StakeTooLarge {
                amount: 0,
                maximum: 0,
            },
            BetError::InvalidBetType(0),
            BetError::InvalidBetData {
                bet_type: BetType::Straight,
                bet_data: 0,
            },
            BetError::NoBet,
            BetError::AlreadySettled,
            BetError::TooEarly {
                height: 0,
                reveal_from: 0,
            },
            BetError::Expired {
                height: 0,
                deadline: 0,
            },
            BetError::NotYetExpired {
                height: 0,
                deadline: 0,
            },
            BetError::CommitmentMismatch,
            BetError::RandomnessUnavailable { height: 0 },
        ];
        let codes: std::collections::BTreeSet<u8> = errors.iter().map(BetError::code).collect();
        assert_eq!(codes.len(), errors.len());
    }

    fn assert_matches_open_bets(fixture: &Fixture, slots: &[Option<Bet>]) {
        let open: Vec<&Bet> = slots.iter().flatten().filter(|bet| bet.is_pending()).collect();
        assert_eq!(
            fixture.vault.reserved(),
            open.iter().map(|bet| bet.reserved_payout).sum::<u64>()
        );
        assert_eq!(
            fixture.totals.escrowed,
            open.iter().map(|bet| bet.amount).sum::<u64>()
        );
        assert_eq!(fixture.totals.pending_bets, open.len() as u64);
    }

    #[test]
    fn test_concurrent_bets_reserve_their_sum() {
        let mut fixture = Fixture::new(10_000_000);
        let mut slots = vec![
            Some(fixture.place(BetType::Straight, 17, 1_000).unwrap()),
            Some(fixture.place(BetType::Split, split_data(0, 3), 1_333).unwrap()),
            Some(fixture.place(BetType::Corner, 5, 2_000).unwrap()),
            Some(fixture.place(BetType::Dozen, 2, 7_000).unwrap()),
        ];
        assert_eq!(fixture.vault.reserved(), 36_000 + 23_994 + 18_000 + 21_000);
        assert_matches_open_bets(&fixture, &slots);

        fixture.advance(2);
        let settlement = fixture.reveal(slots[1].clone().unwrap(), &SECRET).unwrap();
        slots[1] = Some(settlement.bet);
        assert_matches_open_bets(&fixture, &slots);

        fixture.advance(250);
        let height = fixture.height();
        for slot in [0, 2] {
            let settlement = fixture
                .ledger
                .force_settle(
                    slots[slot].clone(),
                    &mut fixture.vault,
                    &mut fixture.totals,
                    height,
                )
                .unwrap();
            slots[slot] = Some(settlement.bet);
            assert_matches_open_bets(&fixture, &slots);
        }
        assert_eq!(fixture.vault.reserved(), 21_000);
    }

    #[test]
    fn test_release_mismatch_is_refused() {
        let mut fixture = Fixture::new(1_000_000);
        let mut bet = fixture.place(BetType::Red, 0, 1_000).unwrap();
        fixture.advance(2);
        let (vault, totals) = (fixture.vault, fixture.totals);

        bet.reserved_payout += 1;
        assert_eq!(
            fixture.reveal(bet, &SECRET),
            Err(BetError::Vault(VaultError::ReleaseExceedsReserved {
                amount: 2_001,
                reserved: 2_000
            }))
        );
        assert_eq!(fixture.vault, vault);
        assert_eq!(fixture.totals, totals);
    }

    #[derive(Debug, Clone)]
    enum Step {
        Place {
            slot: usize,
            bet_type: BetType,
            bet_data: u16,
            amount: u64,
        },
        Reveal(usize),
        ForceSettle(usize),
        Advance(u64),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0usize..4, 0usize..13, 0u16..=36, 1_000u64..20_000).prop_map(
                |(slot, index, bet_data, amount)| Step::Place {
                    slot,
                    bet_type: BetType::ALL[index],
                    bet_data,
                    amount,
                }
            ),
            (0usize..4).prop_map(Step::Reveal),
            (0usize..4).prop_map(Step::ForceSettle),
            (1u64..130).prop_map(Step::Advance),
        ]
    }

    proptest! {
        #[test]
        fn reserved_tracks_open_bets(steps in prop::collection::vec(step(), 1..48)) {
            let mut fixture = Fixture::new(10_000_000);
            let mut slots: Vec<Option<Bet>> = vec![None; 4];
            for step in steps {
                let height = fixture.height();
                let before = (fixture.vault, fixture.totals);
                let result = match step {
                    Step::Place { slot, bet_type, bet_data, amount } => fixture
                        .ledger
                        .place(
                            slots[slot].as_ref(),
                            &mut fixture.vault,
                            &mut fixture.totals,
                            compute_commitment(&SECRET),
                            bet_type as u8,
                            bet_data,
                            amount,
                            height,
                        )
                        .map(|bet| slots[slot] = Some(bet)),
                    Step::Reveal(slot) => fixture
                        .ledger
                        .reveal(
                            slots[slot].clone(),
                            &mut fixture.vault,
                            &mut fixture.totals,
                            &SECRET,
                            height,
                            &fixture.history,
                        )
                        .map(|settlement| slots[slot] = Some(settlement.bet)),
                    Step::ForceSettle(slot) => fixture
                        .ledger
                        .force_settle(
                            slots[slot].clone(),
                            &mut fixture.vault,
                            &mut fixture.totals,
                            height,
                        )
                        .map(|settlement| slots[slot] = Some(settlement.bet)),
                    Step::Advance(blocks) => {
                        fixture.advance(blocks);
                        Ok(())
                    }
                };
                if result.is_err() {
                    prop_assert_eq!((fixture.vault, fixture.totals), before);
                }

                let open: Vec<&Bet> = slots.iter().flatten().filter(|bet| bet.is_pending()).collect();
                prop_assert_eq!(
                    fixture.vault.reserved(),
                    open.iter().map(|bet| bet.reserved_payout).sum::<u64>()
                );
                prop_assert_eq!(
                    fixture.totals.escrowed,
                    open.iter().map(|bet| bet.amount).sum::<u64>()
                );
                prop_assert_eq!(fixture.totals.pending_bets, open.len() as u64);
                prop_assert!(fixture.vault.reserved() <= fixture.vault.total_capital());
            }
        }
    }
}
