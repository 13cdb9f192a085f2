//! Roulette rule engine.
//!
//! Pure functions over a wager category and its encoded data. Nothing here touches state.
//!
//! Table layout (rows of three, columns of twelve):
//! ```text
//!  1  2  3
//!  4  5  6
//!  ...
//! 34 35 36
//! ```
//! Zero sits outside the grid. It wins only a straight bet on zero and loses every other
//! wager, which is where the house edge comes from.

use wheelhouse_types::roulette::{split_endpoints, BetType, MAX_NUMBER, RED_NUMBERS};

/// A validated wager: one payload shape per category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Straight(u8),
    Split(u8, u8),
    Street(u8),
    Corner(u8),
    SixLine(u8),
    Column(u8),
    Dozen(u8),
    Red,
    Black,
    Odd,
    Even,
    Low,
    High,
}

impl Selection {
    /// Decode and validate `bet_data` for `bet_type`.
    pub fn parse(bet_type: BetType, bet_data: u16) -> Option<Self> {
        // Every inside bet except a split carries a single byte.
        let number = u8::try_from(bet_data).ok();
        match bet_type {
            BetType::Straight => number.filter(|n| *n <= MAX_NUMBER).map(Self::Straight),
            BetType::Split => {
                let (low, high) = split_endpoints(bet_data);
                is_adjacent_pair(low, high).then_some(Self::Split(low, high))
            }
            BetType::Street => number.filter(|s| is_row_start(*s, 34)).map(Self::Street),
            BetType::SixLine => number.filter(|s| is_row_start(*s, 31)).map(Self::SixLine),
            BetType::Corner => number
                .filter(|s| (1..=32).contains(s) && s % 3 != 0)
                .map(Self::Corner),
            BetType::Column => number.filter(|c| *c <= 2).map(Self::Column),
            BetType::Dozen => number.filter(|d| *d <= 2).map(Self::Dozen),
            BetType::Red => Some(Self::Red),
            BetType::Black => Some(Self::Black),
            BetType::Odd => Some(Self::Odd),
            BetType::Even => Some(Self::Even),
            BetType::Low => Some(Self::Low),
            BetType::High => Some(Self::High),
        }
    }

    pub fn bet_type(&self) -> BetType {
        match self {
            Self::Straight(_) => BetType::Straight,
            Self::Split(..) => BetType::Split,
            Self::Street(_) => BetType::Street,
            Self::Corner(_) => BetType::Corner,
            Self::SixLine(_) => BetType::SixLine,
            Self::Column(_) => BetType::Column,
            Self::Dozen(_) => BetType::Dozen,
            Self::Red => BetType::Red,
            Self::Black => BetType::Black,
            Self::Odd => BetType::Odd,
            Self::Even => BetType::Even,
            Self::Low => BetType::Low,
            Self::High => BetType::High,
        }
    }

    /// Whether a spin landing on `result` wins this selection.
    pub fn wins(&self, result: u8) -> bool {
        if result > MAX_NUMBER {
            return false;
        }
        if result == 0 {
            return matches!(self, Self::Straight(0));
        }

        match *self {
            Self::Straight(number) => number == result,
            Self::Split(low, high) => result == low || result == high,
            Self::Street(start) => (start..start + 3).contains(&result),
            Self::Corner(start) => {
                result == start || result == start + 1 || result == start + 3 || result == start + 4
            }
            Self::SixLine(start) => (start..start + 6).contains(&result),
            Self::Column(index) => result % 3 == column_residue(index),
            Self::Dozen(index) => (result - 1) / 12 == index,
            Self::Red => is_red(result),
            Self::Black => !is_red(result),
            Self::Odd => result % 2 == 1,
            Self::Even => result % 2 == 0,
            Self::Low => result <= 18,
            Self::High => result >= 19,
        }
    }
}

/// Check if a number is red. Zero is neither red nor black.
pub fn is_red(number: u8) -> bool {
    RED_NUMBERS.contains(&number)
}

/// Check if a number is black.
pub fn is_black(number: u8) -> bool {
    (1..=MAX_NUMBER).contains(&number) && !is_red(number)
}

// Column 0: 1, 4, ..., 34 / column 1: 2, 5, ..., 35 / column 2: 3, 6, ..., 36
fn column_residue(index: u8) -> u8 {
    match index {
        0 => 1,
        1 => 2,
        _ => 0,
    }
}

fn is_row_start(start: u8, max_start: u8) -> bool {
    (1..=max_start).contains(&start) && (start - 1) % 3 == 0
}

// Horizontal neighbours share a row, so the lower one cannot be a row end (multiple of 3).
// Vertical neighbours are three apart.
fn is_adjacent_pair(low: u8, high: u8) -> bool {
    if high > MAX_NUMBER || low >= high {
        return false;
    }
    match high - low {
        1 => low % 3 != 0,
        3 => true,
        _ => false,
    }
}

/// Get the payout multiplier for a bet type (excludes the returned stake).
pub fn payout_multiplier(bet_type: BetType) -> u64 {
    match bet_type {
        BetType::Straight => 35,
        BetType::Split => 17,
        BetType::Street => 11,
        BetType::Corner => 8,
        BetType::SixLine => 5,
        BetType::Column | BetType::Dozen => 2,
        BetType::Red
        | BetType::Black
        | BetType::Odd
        | BetType::Even
        | BetType::Low
        | BetType::High => 1,
    }
}

/// Whether `bet_data` is legal for `bet_type`.
pub fn is_valid_bet_data(bet_type: BetType, bet_data: u16) -> bool {
    Selection::parse(bet_type, bet_data).is_some()
}

/// Whether `result` wins the wager. Invalid data never wins.
pub fn is_winner(result: u8, bet_type: BetType, bet_data: u16) -> bool {
    Selection::parse(bet_type, bet_data).is_some_and(|selection| selection.wins(result))
}

/// Stake plus winnings for a winning bet, `None` on overflow.
pub fn total_payout(bet_type: BetType, stake: u64) -> Option<u64> {
    stake
        .checked_mul(payout_multiplier(bet_type))
        .and_then(|winnings| winnings.checked_add(stake))
}
