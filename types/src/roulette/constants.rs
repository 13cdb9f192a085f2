/// Number of pockets on a European wheel (0 through 36).
pub const WHEEL_POCKETS: u8 = 37;

/// Highest number on the wheel.
pub const MAX_NUMBER: u8 = 36;

/// Red numbers on a European wheel.
pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Length of commitments and secrets in bytes.
pub const COMMITMENT_LEN: usize = 32;

/// Blocks that must pass after a commit before the bet can be revealed.
///
/// The hash of `commit_height + 1` must not exist when the commitment is made.
pub const MIN_REVEAL_DELAY: u64 = 2;

/// Last block (relative to the commit) in which a bet can still be revealed.
pub const MAX_REVEAL_DELAY: u64 = 250;

/// Number of recent block hashes the host keeps queryable.
pub const BLOCK_HASH_RETENTION: u64 = 256;

/// Smallest accepted stake.
pub const MIN_STAKE: u64 = 1_000;

/// Smallest accepted vault deposit.
pub const MIN_DEPOSIT: u64 = 10_000;

/// A single bet may risk at most `available / MAX_BET_DIVISOR` of vault liquidity.
pub const MAX_BET_DIVISOR: u64 = 100;

/// Error codes carried by `InstructionRejected` events.
pub const ERROR_PENDING_BET_EXISTS: u8 = 1;
pub const ERROR_ZERO_COMMITMENT: u8 = 2;
pub const ERROR_STAKE_TOO_SMALL: u8 = 3;
pub const ERROR_STAKE_TOO_LARGE: u8 = 4;
pub const ERROR_INVALID_BET_TYPE: u8 = 5;
pub const ERROR_INVALID_BET_DATA: u8 = 6;
pub const ERROR_INSUFFICIENT_LIQUIDITY: u8 = 7;
pub const ERROR_NO_BET: u8 = 8;
pub const ERROR_ALREADY_SETTLED: u8 = 9;
pub const ERROR_TOO_EARLY: u8 = 10;
pub const ERROR_EXPIRED: u8 = 11;
pub const ERROR_NOT_YET_EXPIRED: u8 = 12;
pub const ERROR_COMMITMENT_MISMATCH: u8 = 13;
pub const ERROR_RANDOMNESS_UNAVAILABLE: u8 = 14;
pub const ERROR_BELOW_MINIMUM_DEPOSIT: u8 = 15;
pub const ERROR_ZERO_SHARES: u8 = 16;
pub const ERROR_ZERO_ASSETS: u8 = 17;
pub const ERROR_INSUFFICIENT_SHARES: u8 = 18;
pub const ERROR_INSUFFICIENT_FUNDS: u8 = 19;
pub const ERROR_REENTRANT_CALL: u8 = 20;
pub const ERROR_ARITHMETIC_OVERFLOW: u8 = 21;

/// Maximum length of a rejection message carried in events.
pub const MAX_MESSAGE_LENGTH: usize = 256;
