use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use thiserror::Error as ThisError;

use super::COMMITMENT_LEN;

#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
#[error("unknown bet type: {0}")]
pub struct UnknownBetType(pub u8);

/// Roulette wager categories.
///
/// `bet_data` layout per category:
/// - Straight: the number (0-36)
/// - Split: `(low << 8) | high`, see [split_data]
/// - Street / SixLine / Corner: the first (top-left) number
/// - Column / Dozen: index 0-2
/// - Outside bets ignore it
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BetType {
    Straight = 0, // 35:1
    Split = 1,    // 17:1
    Street = 2,   // 11:1
    Corner = 3,   // 8:1
    SixLine = 4,  // 5:1
    Column = 5,   // 2:1
    Dozen = 6,    // 2:1
    Red = 7,      // 1:1
    Black = 8,    // 1:1
    Odd = 9,      // 1:1
    Even = 10,    // 1:1
    Low = 11,     // 1-18, 1:1
    High = 12,    // 19-36, 1:1
}

impl BetType {
    pub const ALL: [BetType; 13] = [
        BetType::Straight,
        BetType::Split,
        BetType::Street,
        BetType::Corner,
        BetType::SixLine,
        BetType::Column,
        BetType::Dozen,
        BetType::Red,
        BetType::Black,
        BetType::Odd,
        BetType::Even,
        BetType::Low,
        BetType::High,
    ];

    /// Outside bets lose on zero and ignore their data.
    pub fn is_outside(&self) -> bool {
        matches!(
            self,
            BetType::Red
                | BetType::Black
                | BetType::Odd
                | BetType::Even
                | BetType::Low
                | BetType::High
        )
    }
}

impl TryFrom<u8> for BetType {
    type Error = UnknownBetType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BetType::Straight),
            1 => Ok(BetType::Split),
            2 => Ok(BetType::Street),
            3 => Ok(BetType::Corner),
            4 => Ok(BetType::SixLine),
            5 => Ok(BetType::Column),
            6 => Ok(BetType::Dozen),
            7 => Ok(BetType::Red),
            8 => Ok(BetType::Black),
            9 => Ok(BetType::Odd),
            10 => Ok(BetType::Even),
            11 => Ok(BetType::Low),
            12 => Ok(BetType::High),
            other => Err(UnknownBetType(other)),
        }
    }
}

impl Write for BetType {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for BetType {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        BetType::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl FixedSize for BetType {
    const SIZE: usize = 1;
}

/// Encode a split between two numbers as `bet_data`.
pub fn split_data(low: u8, high: u8) -> u16 {
    ((low as u16) << 8) | high as u16
}

/// Decode split `bet_data` into its two endpoints.
pub fn split_endpoints(bet_data: u16) -> (u8, u8) {
    ((bet_data >> 8) as u8, (bet_data & 0xff) as u8)
}

/// A player's wager, from commitment to settlement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bet {
    pub commitment: [u8; COMMITMENT_LEN],
    pub amount: u64,
    pub bet_type: BetType,
    pub bet_data: u16,
    pub commit_height: u64,
    pub reserved_payout: u64,
    pub settled: bool,

    // Filled in on settlement. A forced settlement never learns a result.
    pub result: Option<u8>,
    pub payout: u64,
}

impl Bet {
    pub fn is_pending(&self) -> bool {
        !self.settled
    }
}

impl Write for Bet {
    fn write(&self, writer: &mut impl BufMut) {
        self.commitment.write(writer);
        self.amount.write(writer);
        self.bet_type.write(writer);
        self.bet_data.write(writer);
        self.commit_height.write(writer);
        self.reserved_payout.write(writer);
        self.settled.write(writer);
        match self.result {
            Some(result) => {
                true.write(writer);
                result.write(writer);
            }
            None => false.write(writer),
        }
        self.payout.write(writer);
    }
}

impl Read for Bet {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let commitment = <[u8; COMMITMENT_LEN]>::read(reader)?;
        let amount = u64::read(reader)?;
        let bet_type = BetType::read(reader)?;
        let bet_data = u16::read(reader)?;
        let commit_height = u64::read(reader)?;
        let reserved_payout = u64::read(reader)?;
        let settled = bool::read(reader)?;
        let result = if bool::read(reader)? {
            Some(u8::read(reader)?)
        } else {
            None
        };
        let payout = u64::read(reader)?;

        Ok(Self {
            commitment,
            amount,
            bet_type,
            bet_data,
            commit_height,
            reserved_payout,
            settled,
            result,
            payout,
        })
    }
}

impl EncodeSize for Bet {
    fn encode_size(&self) -> usize {
        COMMITMENT_LEN
            + u64::SIZE
            + BetType::SIZE
            + u16::SIZE
            + u64::SIZE
            + u64::SIZE
            + bool::SIZE
            + bool::SIZE
            + if self.result.is_some() { u8::SIZE } else { 0 }
            + u64::SIZE
    }
}

/// Aggregate ledger bookkeeping.
///
/// `escrowed` is the sum of the stakes of every pending bet; it is held outside the vault until
/// the bet settles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub escrowed: u64,
    pub pending_bets: u64,
}

impl Write for LedgerState {
    fn write(&self, writer: &mut impl BufMut) {
        self.escrowed.write(writer);
        self.pending_bets.write(writer);
    }
}

impl Read for LedgerState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            escrowed: u64::read(reader)?,
            pending_bets: u64::read(reader)?,
        })
    }
}

impl FixedSize for LedgerState {
    const SIZE: usize = u64::SIZE * 2;
}
