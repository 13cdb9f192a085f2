use anyhow::{Context as _, Result};
use commonware_cryptography::ed25519::PublicKey;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};
use wheelhouse_types::{
    execution::{Event, Instruction, Key, Output, Transaction, Value},
    roulette::{
        truncate_message, ERROR_ARITHMETIC_OVERFLOW, ERROR_INSUFFICIENT_FUNDS, ERROR_REENTRANT_CALL,
    },
};

use crate::chain::BlockHashes;
use crate::config::{Config, ConfigError};
use crate::ledger::{BetError, BetLedger, LedgerRules};
use crate::state::{load_account, validate_and_increment_nonce, PrepareError, State, Status};
use crate::vault::VaultError;

mod handlers;

/// Why an instruction did not apply.
///
/// Everything except [`ExecutionError::State`] is a rejection: the transaction is still
/// included (and its nonce consumed) but none of its effects are.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Bet(#[from] BetError),
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error("insufficient funds (needed={needed}, balance={balance})")]
    InsufficientFunds { needed: u64, balance: u64 },
    #[error("reentrant call rejected")]
    Reentrant,
    #[error("balance overflow")]
    Overflow,
    #[error("state error: {0:#}")]
    State(#[from] anyhow::Error),
}

impl ExecutionError {
    /// Code carried by the rejection event. `None` for storage failures, which abort the block.
    pub fn code(&self) -> Option<u8> {
        match self {
            Self::Bet(e) => Some(e.code()),
            Self::Vault(e) => Some(e.code()),
            Self::InsufficientFunds { .. } => Some(ERROR_INSUFFICIENT_FUNDS),
            Self::Reentrant => Some(ERROR_REENTRANT_CALL),
            Self::Overflow => Some(ERROR_ARITHMETIC_OVERFLOW),
            Self::State(_) => None,
        }
    }
}

fn rejection_message(error: &ExecutionError) -> String {
    truncate_message(&error.to_string()).to_string()
}

/// Executes the transactions of one block on top of `state`.
///
/// Writes are staged in memory and handed back by [`Layer::commit`].
pub struct Layer<'a, S: State, H: BlockHashes> {
    state: &'a S,
    hashes: &'a H,
    pending: BTreeMap<Key, Status>,

    config: Config,
    ledger: BetLedger,
    height: u64,
    entered: bool,
}

impl<'a, S: State, H: BlockHashes> Layer<'a, S, H> {
    /// Create a layer executing the block after `hashes.height()`.
    ///
    /// Fails if `config` is invalid or its reveal window outlives the hashes `hashes` retains.
    pub fn new(state: &'a S, hashes: &'a H, config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let retention = hashes.retention();
        if config.max_reveal_delay.saturating_add(1) >= retention {
            return Err(ConfigError::WindowExceedsRetention {
                max_reveal_delay: config.max_reveal_delay,
                retention,
            });
        }

        Ok(Self {
            state,
            hashes,
            pending: BTreeMap::new(),

            config: config.clone(),
            ledger: BetLedger::new(LedgerRules::from(config)),
            height: hashes.height() + 1,
            entered: false,
        })
    }

    /// Height of the block being executed.
    pub fn height(&self) -> u64 {
        self.height
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    fn remove(&mut self, key: Key) {
        self.pending.insert(key, Status::Delete);
    }

    async fn prepare(&mut self, transaction: &Transaction) -> Result<(), PrepareError> {
        let mut account = load_account(self, &transaction.public)
            .await
            .map_err(PrepareError::State)?;
        validate_and_increment_nonce(&mut account, transaction.nonce)?;
        self.insert(
            Key::Account(transaction.public.clone()),
            Value::Account(account),
        );

        Ok(())
    }

    /// Apply one instruction as an indivisible unit.
    ///
    /// On error every write staged by the instruction is discarded.
    pub async fn apply(
        &mut self,
        public: &PublicKey,
        instruction: &Instruction,
    ) -> Result<Vec<Event>, ExecutionError> {
        if self.entered {
            return Err(ExecutionError::Reentrant);
        }
        self.entered = true;
        let checkpoint = self.pending.clone();

        let result = self.dispatch(public, instruction).await;
        if result.is_err() {
            self.pending = checkpoint;
        }

        self.entered = false;
        result
    }

    async fn dispatch(
        &mut self,
        public: &PublicKey,
        instruction: &Instruction,
    ) -> Result<Vec<Event>, ExecutionError> {
        match instruction {
            Instruction::PlaceBet {
                commitment,
                bet_type,
                bet_data,
                amount,
            } => {
                self.handle_place_bet(public, *commitment, *bet_type, *bet_data, *amount)
                    .await
            }
            Instruction::RevealBet { secret } => self.handle_reveal_bet(public, secret).await,
            Instruction::ForceSettle { player } => self.handle_force_settle(public, player).await,
            Instruction::Deposit { amount } => self.handle_deposit(public, *amount).await,
            Instruction::Withdraw { shares } => self.handle_withdraw(public, *shares).await,
        }
    }

    async fn debit(&mut self, public: &PublicKey, amount: u64) -> Result<(), ExecutionError> {
        let mut account = load_account(self, public).await?;
        if account.balance < amount {
            return Err(ExecutionError::InsufficientFunds {
                needed: amount,
                balance: account.balance,
            });
        }
        account.balance -= amount;
        self.insert(Key::Account(public.clone()), Value::Account(account));
        Ok(())
    }

    async fn credit(&mut self, public: &PublicKey, amount: u64) -> Result<(), ExecutionError> {
        let mut account = load_account(self, public).await?;
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(ExecutionError::Overflow)?;
        self.insert(Key::Account(public.clone()), Value::Account(account));
        Ok(())
    }

    /// Execute `transactions` in order.
    ///
    /// Transactions with a bad signature or nonce are dropped. Rejected instructions still
    /// consume their nonce and emit [`Event::InstructionRejected`].
    pub async fn execute(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> Result<(Vec<Output>, BTreeMap<PublicKey, u64>)> {
        let mut processed_nonces = BTreeMap::new();
        let mut outputs = Vec::new();

        for tx in transactions {
            if !tx.verify() {
                debug!(public = ?tx.public, nonce = tx.nonce, "invalid signature; dropping transaction");
                continue;
            }
            match self.prepare(&tx).await {
                Ok(()) => {}
                Err(PrepareError::NonceMismatch { expected, got }) => {
                    debug!(
                        public = ?tx.public,
                        expected,
                        got,
                        "nonce mismatch; dropping transaction"
                    );
                    continue;
                }
                Err(PrepareError::State(err)) => {
                    return Err(err).context("state error during prepare");
                }
            }
            processed_nonces.insert(tx.public.clone(), tx.nonce.saturating_add(1));

            match self.apply(&tx.public, &tx.instruction).await {
                Ok(events) => outputs.extend(events.into_iter().map(Output::Event)),
                Err(ExecutionError::State(err)) => {
                    return Err(err).context("state error during apply");
                }
                Err(err) => {
                    let code = err.code().unwrap_or_default();
                    warn!(player = ?tx.public, code, error = %err, "instruction rejected");
                    outputs.push(Output::Event(Event::InstructionRejected {
                        player: tx.public.clone(),
                        code,
                        message: rejection_message(&err),
                    }));
                }
            }
            outputs.push(Output::Transaction(tx));
        }

        Ok((outputs, processed_nonces))
    }

    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

impl<'a, S: State, H: BlockHashes> State for Layer<'a, S, H> {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await?,
        })
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.pending.insert(key, Status::Update(value));
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.pending.insert(key.clone(), Status::Delete);
        Ok(())
    }
}
