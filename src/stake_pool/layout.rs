//! Byte layouts read out of raw Solana account data.

use byteorder::{ByteOrder, LittleEndian};

use super::error::StakePoolError;

/// SPL stake pool account data: the first of three consecutive little-endian u64 fields
/// (`total_lamports`, `pool_token_supply`, `last_update_epoch`) starts at byte 258.
pub const FIRST_FIELD_BYTE_IDX: u64 = 258;
pub const SIZE_OF_U64: u64 = 8;

/// Slice requested when the clock sysvar is queried alongside the pool.
///
/// `getMultipleAccounts` only takes one data slice for all accounts, so the slice starts at 0 to
/// keep the clock fields and runs far enough to cover all three stake pool fields. The clock
/// comes back truncated to its real size.
pub const DATA_SLICE_OFFSET: u64 = 0;
pub const DATA_SLICE_LENGTH: u64 = FIRST_FIELD_BYTE_IDX + SIZE_OF_U64 * 3;

/// Slice requested when only the pool is queried: exactly the stake and supply fields.
pub const TWO_FIELD_SLICE_OFFSET: u64 = FIRST_FIELD_BYTE_IDX;
pub const TWO_FIELD_SLICE_LENGTH: u64 = SIZE_OF_U64 * 2;

/// Clock sysvar data: slot, epoch_start_timestamp, epoch, leader_schedule_epoch, unix_timestamp.
pub const CLOCK_SLOT_IDX: usize = 0;
pub const CLOCK_EPOCH_START_TIMESTAMP_IDX: usize = 8;
pub const CLOCK_EPOCH_IDX: usize = 16;
pub const CLOCK_LEADER_SCHEDULE_EPOCH_IDX: usize = 24;
pub const CLOCK_UNIX_TIMESTAMP_IDX: usize = 32;
pub const CLOCK_SIZE: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakePoolFields {
    pub total_active_stake: u64,
    pub pool_token_supply: u64,
    /// Only present when the returned slice covers the third field.
    pub last_update_epoch: Option<u64>,
}

impl StakePoolFields {
    /// Decodes the fields from `data`, which starts `slice_offset` bytes into the account.
    pub fn decode(data: &[u8], slice_offset: u64) -> Result<Self, StakePoolError> {
        if slice_offset > FIRST_FIELD_BYTE_IDX {
            return Err(StakePoolError::SliceAfterFields(slice_offset));
        }
        let start = (FIRST_FIELD_BYTE_IDX - slice_offset) as usize;
        let width = SIZE_OF_U64 as usize;
        let needed = start + 2 * width;
        if data.len() < needed {
            return Err(StakePoolError::DataTooShort {
                needed,
                actual: data.len(),
            });
        }
        let last_update_epoch = data
            .get(start + 2 * width..start + 3 * width)
            .map(LittleEndian::read_u64);
        Ok(Self {
            total_active_stake: LittleEndian::read_u64(&data[start..start + width]),
            pool_token_supply: LittleEndian::read_u64(&data[start + width..start + 2 * width]),
            last_update_epoch,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFields {
    pub slot: u64,
    pub epoch_start_timestamp: i64,
    pub epoch: u64,
    pub leader_schedule_epoch: u64,
    pub unix_timestamp: i64,
}

impl ClockFields {
    /// Decodes a clock sysvar that was fetched with a slice starting at 0.
    pub fn decode(data: &[u8]) -> Result<Self, StakePoolError> {
        if data.len() < CLOCK_SIZE {
            return Err(StakePoolError::DataTooShort {
                needed: CLOCK_SIZE,
                actual: data.len(),
            });
        }
        Ok(Self {
            slot: LittleEndian::read_u64(&data[CLOCK_SLOT_IDX..]),
            epoch_start_timestamp: LittleEndian::read_i64(&data[CLOCK_EPOCH_START_TIMESTAMP_IDX..]),
            epoch: LittleEndian::read_u64(&data[CLOCK_EPOCH_IDX..]),
            leader_schedule_epoch: LittleEndian::read_u64(&data[CLOCK_LEADER_SCHEDULE_EPOCH_IDX..]),
            unix_timestamp: LittleEndian::read_i64(&data[CLOCK_UNIX_TIMESTAMP_IDX..]),
        })
    }
}
