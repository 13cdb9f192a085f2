use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{
    ed25519::{self, PublicKey},
    sha256::Digest,
    Signer, Verifier,
};
use commonware_utils::union;

use crate::roulette::{
    message_encode_size, read_message, write_message, Bet, BetType, LedgerState, VaultState,
    COMMITMENT_LEN,
};

pub const NAMESPACE: &[u8] = b"_WHEELHOUSE";
pub const TRANSACTION_SUFFIX: &[u8] = b"_TX";

#[inline]
pub fn transaction_namespace(namespace: &[u8]) -> Vec<u8> {
    union(namespace, TRANSACTION_SUFFIX)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub instruction: Instruction,

    pub public: ed25519::PublicKey,
    pub signature: ed25519::Signature,
}

impl Transaction {
    fn payload(nonce: &u64, instruction: &Instruction) -> Vec<u8> {
        let mut payload = Vec::new();
        nonce.write(&mut payload);
        instruction.write(&mut payload);

        payload
    }

    pub fn sign(private: &ed25519::PrivateKey, nonce: u64, instruction: Instruction) -> Self {
        let signature = private.sign(
            &transaction_namespace(NAMESPACE),
            &Self::payload(&nonce, &instruction),
        );

        Self {
            nonce,
            instruction,
            public: private.public_key(),
            signature,
        }
    }

    pub fn verify(&self) -> bool {
        self.public.verify(
            &transaction_namespace(NAMESPACE),
            &Self::payload(&self.nonce, &self.instruction),
            &self.signature,
        )
    }
}

impl Write for Transaction {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
        self.instruction.write(writer);
        self.public.write(writer);
        self.signature.write(writer);
    }
}

impl Read for Transaction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let nonce = u64::read(reader)?;
        let instruction = Instruction::read(reader)?;
        let public = ed25519::PublicKey::read(reader)?;
        let signature = ed25519::Signature::read(reader)?;

        Ok(Self {
            nonce,
            instruction,
            public,
            signature,
        })
    }
}

impl EncodeSize for Transaction {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
            + self.instruction.encode_size()
            + self.public.encode_size()
            + self.signature.encode_size()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Commit to a secret and stake on a roulette selection.
    /// Binary: [0] [commitment:32] [betType:u8] [betData:u16 BE] [amount:u64 BE]
    ///
    /// `bet_type` stays raw so an unknown category is rejected by the ledger, not the decoder.
    PlaceBet {
        commitment: [u8; COMMITMENT_LEN],
        bet_type: u8,
        bet_data: u16,
        amount: u64,
    },

    /// Reveal the secret behind the caller's pending bet.
    /// Binary: [1] [secret:32]
    RevealBet { secret: [u8; COMMITMENT_LEN] },

    /// Forfeit another player's bet once its reveal window has closed.
    /// Binary: [2] [player:PublicKey]
    ForceSettle { player: PublicKey },

    /// Deposit capital into the vault in exchange for shares.
    /// Binary: [3] [amount:u64 BE]
    Deposit { amount: u64 },

    /// Redeem vault shares for capital.
    /// Binary: [4] [shares:u64 BE]
    Withdraw { shares: u64 },
}

impl Write for Instruction {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::PlaceBet {
                commitment,
                bet_type,
                bet_data,
                amount,
            } => {
                0u8.write(writer);
                commitment.write(writer);
                bet_type.write(writer);
                bet_data.write(writer);
                amount.write(writer);
            }
            Self::RevealBet { secret } => {
                1u8.write(writer);
                secret.write(writer);
            }
            Self::ForceSettle { player } => {
                2u8.write(writer);
                player.write(writer);
            }
            Self::Deposit { amount } => {
                3u8.write(writer);
                amount.write(writer);
            }
            Self::Withdraw { shares } => {
                4u8.write(writer);
                shares.write(writer);
            }
        }
    }
}

impl Read for Instruction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        let instruction = match kind {
            0 => Self::PlaceBet {
                commitment: <[u8; COMMITMENT_LEN]>::read(reader)?,
                bet_type: u8::read(reader)?,
                bet_data: u16::read(reader)?,
                amount: u64::read(reader)?,
            },
            1 => Self::RevealBet {
                secret: <[u8; COMMITMENT_LEN]>::read(reader)?,
            },
            2 => Self::ForceSettle {
                player: PublicKey::read(reader)?,
            },
            3 => Self::Deposit {
                amount: u64::read(reader)?,
            },
            4 => Self::Withdraw {
                shares: u64::read(reader)?,
            },
            _ => return Err(Error::InvalidEnum(kind)),
        };

        Ok(instruction)
    }
}

impl EncodeSize for Instruction {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::PlaceBet { .. } => COMMITMENT_LEN + u8::SIZE + u16::SIZE + u64::SIZE,
                Self::RevealBet { .. } => COMMITMENT_LEN,
                Self::ForceSettle { player } => player.encode_size(),
                Self::Deposit { .. } | Self::Withdraw { .. } => u64::SIZE,
            }
    }
}

/// Per-identity account: replay protection and spendable balance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    pub nonce: u64,
    pub balance: u64,
}

impl Write for Account {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
        self.balance.write(writer);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            nonce: u64::read(reader)?,
            balance: u64::read(reader)?,
        })
    }
}

impl FixedSize for Account {
    const SIZE: usize = u64::SIZE * 2;
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    Account(PublicKey),
    Bet(PublicKey),
    Vault,
    Shares(PublicKey),
    Ledger,
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(pk) => {
                0u8.write(writer);
                pk.write(writer);
            }
            Self::Bet(pk) => {
                1u8.write(writer);
                pk.write(writer);
            }
            Self::Vault => 2u8.write(writer),
            Self::Shares(pk) => {
                3u8.write(writer);
                pk.write(writer);
            }
            Self::Ledger => 4u8.write(writer),
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        let key = match kind {
            0 => Self::Account(PublicKey::read(reader)?),
            1 => Self::Bet(PublicKey::read(reader)?),
            2 => Self::Vault,
            3 => Self::Shares(PublicKey::read(reader)?),
            4 => Self::Ledger,
            _ => return Err(Error::InvalidEnum(kind)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(pk) | Self::Bet(pk) | Self::Shares(pk) => pk.encode_size(),
                Self::Vault | Self::Ledger => 0,
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Value {
    Account(Account),
    Bet(Bet),
    Vault(VaultState),
    Shares(u64),
    Ledger(LedgerState),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(account) => {
                0u8.write(writer);
                account.write(writer);
            }
            Self::Bet(bet) => {
                1u8.write(writer);
                bet.write(writer);
            }
            Self::Vault(vault) => {
                2u8.write(writer);
                vault.write(writer);
            }
            Self::Shares(shares) => {
                3u8.write(writer);
                shares.write(writer);
            }
            Self::Ledger(ledger) => {
                4u8.write(writer);
                ledger.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        let value = match kind {
            0 => Self::Account(Account::read(reader)?),
            1 => Self::Bet(Bet::read(reader)?),
            2 => Self::Vault(VaultState::read(reader)?),
            3 => Self::Shares(u64::read(reader)?),
            4 => Self::Ledger(LedgerState::read(reader)?),
            _ => return Err(Error::InvalidEnum(kind)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(account) => account.encode_size(),
                Self::Bet(bet) => bet.encode_size(),
                Self::Vault(vault) => vault.encode_size(),
                Self::Shares(shares) => shares.encode_size(),
                Self::Ledger(ledger) => ledger.encode_size(),
            }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    BetPlaced {
        player: PublicKey,
        commitment: [u8; COMMITMENT_LEN],
        bet_type: BetType,
        bet_data: u16,
        amount: u64,
        reserved_payout: u64,
        commit_height: u64,
    },
    BetRevealed {
        player: PublicKey,
        commitment: [u8; COMMITMENT_LEN],
        result: u8,
        won: bool,
        payout: u64,
    },
    BetForfeited {
        player: PublicKey,
        commitment: [u8; COMMITMENT_LEN],
        caller: PublicKey,
        amount: u64,
    },
    LiquidityDeposited {
        depositor: PublicKey,
        amount: u64,
        shares_minted: u64,
        share_supply: u64,
        total_capital: u64,
    },
    LiquidityWithdrawn {
        depositor: PublicKey,
        shares_burned: u64,
        amount: u64,
        share_supply: u64,
        total_capital: u64,
    },
    InstructionRejected {
        player: PublicKey,
        code: u8,
        message: String,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::BetPlaced {
                player,
                commitment,
                bet_type,
                bet_data,
                amount,
                reserved_payout,
                commit_height,
            } => {
                10u8.write(writer);
                player.write(writer);
                commitment.write(writer);
                bet_type.write(writer);
                bet_data.write(writer);
                amount.write(writer);
                reserved_payout.write(writer);
                commit_height.write(writer);
            }
            Self::BetRevealed {
                player,
                commitment,
                result,
                won,
                payout,
            } => {
                11u8.write(writer);
                player.write(writer);
                commitment.write(writer);
                result.write(writer);
                won.write(writer);
                payout.write(writer);
            }
            Self::BetForfeited {
                player,
                commitment,
                caller,
                amount,
            } => {
                12u8.write(writer);
                player.write(writer);
                commitment.write(writer);
                caller.write(writer);
                amount.write(writer);
            }
            Self::LiquidityDeposited {
                depositor,
                amount,
                shares_minted,
                share_supply,
                total_capital,
            } => {
                13u8.write(writer);
                depositor.write(writer);
                amount.write(writer);
                shares_minted.write(writer);
                share_supply.write(writer);
                total_capital.write(writer);
            }
            Self::LiquidityWithdrawn {
                depositor,
                shares_burned,
                amount,
                share_supply,
                total_capital,
            } => {
                14u8.write(writer);
                depositor.write(writer);
                shares_burned.write(writer);
                amount.write(writer);
                share_supply.write(writer);
                total_capital.write(writer);
            }
            Self::InstructionRejected {
                player,
                code,
                message,
            } => {
                15u8.write(writer);
                player.write(writer);
                code.write(writer);
                write_message(message, writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        let event = match kind {
            10 => Self::BetPlaced {
                player: PublicKey::read(reader)?,
                commitment: <[u8; COMMITMENT_LEN]>::read(reader)?,
                bet_type: BetType::read(reader)?,
                bet_data: u16::read(reader)?,
                amount: u64::read(reader)?,
                reserved_payout: u64::read(reader)?,
                commit_height: u64::read(reader)?,
            },
            11 => Self::BetRevealed {
                player: PublicKey::read(reader)?,
                commitment: <[u8; COMMITMENT_LEN]>::read(reader)?,
                result: u8::read(reader)?,
                won: bool::read(reader)?,
                payout: u64::read(reader)?,
            },
            12 => Self::BetForfeited {
                player: PublicKey::read(reader)?,
                commitment: <[u8; COMMITMENT_LEN]>::read(reader)?,
                caller: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            13 => Self::LiquidityDeposited {
                depositor: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
                shares_minted: u64::read(reader)?,
                share_supply: u64::read(reader)?,
                total_capital: u64::read(reader)?,
            },
            14 => Self::LiquidityWithdrawn {
                depositor: PublicKey::read(reader)?,
                shares_burned: u64::read(reader)?,
                amount: u64::read(reader)?,
                share_supply: u64::read(reader)?,
                total_capital: u64::read(reader)?,
            },
            15 => Self::InstructionRejected {
                player: PublicKey::read(reader)?,
                code: u8::read(reader)?,
                message: read_message(reader)?,
            },
            _ => return Err(Error::InvalidEnum(kind)),
        };

        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::BetPlaced { player, .. } => {
                    player.encode_size()
                        + COMMITMENT_LEN
                        + BetType::SIZE
                        + u16::SIZE
                        + u64::SIZE * 3
                }
                Self::BetRevealed { player, .. } => {
                    player.encode_size() + COMMITMENT_LEN + u8::SIZE + bool::SIZE + u64::SIZE
                }
                Self::BetForfeited { player, caller, .. } => {
                    player.encode_size() + COMMITMENT_LEN + caller.encode_size() + u64::SIZE
                }
                Self::LiquidityDeposited { depositor, .. }
                | Self::LiquidityWithdrawn { depositor, .. } => {
                    depositor.encode_size() + u64::SIZE * 4
                }
                Self::InstructionRejected {
                    player, message, ..
                } => player.encode_size() + u8::SIZE + message_encode_size(message),
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Event(Event),
    Transaction(Transaction),
    Commit { height: u64, block_hash: Digest },
}

impl Write for Output {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Event(event) => {
                0u8.write(writer);
                event.write(writer);
            }
            Self::Transaction(transaction) => {
                1u8.write(writer);
                transaction.write(writer);
            }
            Self::Commit { height, block_hash } => {
                2u8.write(writer);
                height.write(writer);
                block_hash.write(writer);
            }
        }
    }
}

impl Read for Output {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Self::Event(Event::read(reader)?)),
            1 => Ok(Self::Transaction(Transaction::read(reader)?)),
            2 => Ok(Self::Commit {
                height: u64::read(reader)?,
                block_hash: Digest::read(reader)?,
            }),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Output {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Event(event) => event.encode_size(),
                Self::Transaction(transaction) => transaction.encode_size(),
                Self::Commit { .. } => u64::SIZE + Digest::SIZE,
            }
    }
}
