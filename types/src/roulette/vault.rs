use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};

/// Pooled liquidity backing every open bet.
///
/// `reserved` is the sum of the `reserved_payout` of every pending bet and never exceeds
/// `total_capital`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VaultState {
    pub total_capital: u64,
    pub reserved: u64,
    pub share_supply: u64,
}

impl VaultState {
    /// Capital not committed to any open bet.
    pub fn available(&self) -> u64 {
        self.total_capital.saturating_sub(self.reserved)
    }
}

impl Write for VaultState {
    fn write(&self, writer: &mut impl BufMut) {
        self.total_capital.write(writer);
        self.reserved.write(writer);
        self.share_supply.write(writer);
    }
}

impl Read for VaultState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let total_capital = u64::read(reader)?;
        let reserved = u64::read(reader)?;
        let share_supply = u64::read(reader)?;
        if reserved > total_capital {
            return Err(Error::Invalid("VaultState", "reserved exceeds total capital"));
        }
        Ok(Self {
            total_capital,
            reserved,
            share_supply,
        })
    }
}

impl FixedSize for VaultState {
    const SIZE: usize = u64::SIZE * 3;
}
