use anyhow::{Context as _, Result};
use bytes::{Buf, BufMut};
use commonware_codec::{Encode, EncodeSize, Error, Read, ReadExt, Write};
use commonware_cryptography::{
    ed25519::PublicKey,
    sha256::{Digest, Sha256},
    Hasher,
};
use commonware_runtime::{Clock, Metrics, Spawner, Storage};
use commonware_storage::qmdb::any::unordered::variable::Db as AnyAdb;
use commonware_storage::translator::Translator;
use std::future::Future;
use thiserror::Error as ThisError;
use tracing::info;
use wheelhouse_types::{
    execution::{Account, Key, Value},
    roulette::{Bet, LedgerState, VaultState},
};

#[cfg(any(test, feature = "mocks"))]
use std::collections::HashMap;

/// Authenticated store keyed by `sha256(key)`.
pub type Adb<E, T> = AnyAdb<E, Digest, Value, Sha256, T>;

#[derive(Debug, ThisError)]
pub enum PrepareError {
    #[error("nonce mismatch (expected={expected}, got={got})")]
    NonceMismatch { expected: u64, got: u64 },
    #[error(transparent)]
    State(anyhow::Error),
}

pub trait State {
    fn get(&self, key: &Key) -> impl Future<Output = Result<Option<Value>>>;
    fn insert(&mut self, key: Key, value: Value) -> impl Future<Output = Result<()>>;
    fn delete(&mut self, key: &Key) -> impl Future<Output = Result<()>>;

    fn apply(&mut self, changes: Vec<(Key, Status)>) -> impl Future<Output = Result<()>> {
        async {
            for (key, status) in changes {
                match status {
                    Status::Update(value) => self.insert(key, value).await?,
                    Status::Delete => self.delete(&key).await?,
                }
            }
            Ok(())
        }
    }
}

impl<E: Spawner + Metrics + Clock + Storage, T: Translator> State for Adb<E, T> {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        let key_hash = Sha256::hash(&key.encode());
        AnyAdb::get(self, &key_hash).await.context("adb get")
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        let key_hash = Sha256::hash(&key.encode());
        self.update(key_hash, value).await.context("adb update")?;
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        let key_hash = Sha256::hash(&key.encode());
        AnyAdb::delete(self, key_hash).await.context("adb delete")?;
        Ok(())
    }
}

/// Unauthenticated in-memory store for tests and simulations.
#[cfg(any(test, feature = "mocks"))]
#[derive(Default)]
pub struct Memory {
    state: HashMap<Key, Value>,
}

#[cfg(any(test, feature = "mocks"))]
impl Memory {
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

#[cfg(any(test, feature = "mocks"))]
impl State for Memory {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(self.state.get(key).cloned())
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.state.insert(key, value);
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.state.remove(key);
        Ok(())
    }
}

/// A pending change to a key.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum Status {
    Update(Value),
    Delete,
}

impl Write for Status {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Status::Update(value) => {
                0u8.write(writer);
                value.write(writer);
            }
            Status::Delete => 1u8.write(writer),
        }
    }
}

impl Read for Status {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Status::Update(Value::read(reader)?)),
            1 => Ok(Status::Delete),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Status {
    fn encode_size(&self) -> usize {
        1 + match self {
            Status::Update(value) => value.encode_size(),
            Status::Delete => 0,
        }
    }
}

/// Next nonce expected from `public`.
pub async fn nonce<S: State>(state: &S, public: &PublicKey) -> Result<u64> {
    Ok(load_account(state, public).await?.nonce)
}

/// Spendable balance of `public`.
pub async fn balance<S: State>(state: &S, public: &PublicKey) -> Result<u64> {
    Ok(load_account(state, public).await?.balance)
}

pub(crate) async fn load_account<S: State>(state: &S, public: &PublicKey) -> Result<Account> {
    Ok(match state.get(&Key::Account(public.clone())).await? {
        Some(Value::Account(account)) => account,
        _ => Account::default(),
    })
}

/// Stored bet of `public`, pending or settled.
pub async fn load_bet<S: State>(state: &S, public: &PublicKey) -> Result<Option<Bet>> {
    Ok(match state.get(&Key::Bet(public.clone())).await? {
        Some(Value::Bet(bet)) => Some(bet),
        _ => None,
    })
}

pub async fn load_vault<S: State>(state: &S) -> Result<VaultState> {
    Ok(match state.get(&Key::Vault).await? {
        Some(Value::Vault(vault)) => vault,
        _ => VaultState::default(),
    })
}

pub async fn load_ledger<S: State>(state: &S) -> Result<LedgerState> {
    Ok(match state.get(&Key::Ledger).await? {
        Some(Value::Ledger(ledger)) => ledger,
        _ => LedgerState::default(),
    })
}

/// Vault shares held by `public`.
pub async fn load_shares<S: State>(state: &S, public: &PublicKey) -> Result<u64> {
    Ok(match state.get(&Key::Shares(public.clone())).await? {
        Some(Value::Shares(shares)) => shares,
        _ => 0,
    })
}

pub(crate) fn validate_and_increment_nonce(
    account: &mut Account,
    provided_nonce: u64,
) -> Result<(), PrepareError> {
    if account.nonce != provided_nonce {
        return Err(PrepareError::NonceMismatch {
            expected: account.nonce,
            got: provided_nonce,
        });
    }
    account.nonce += 1;
    Ok(())
}

/// Credit `amount` to `public` outside of any transaction (genesis allocation).
pub async fn fund_account<S: State>(state: &mut S, public: &PublicKey, amount: u64) -> Result<u64> {
    let mut account = load_account(state, public).await?;
    account.balance = account
        .balance
        .checked_add(amount)
        .context("balance overflow")?;
    let balance = account.balance;
    state
        .insert(Key::Account(public.clone()), Value::Account(account))
        .await?;
    info!(player = ?public, amount, balance, "funded account");
    Ok(balance)
}
