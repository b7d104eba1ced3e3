use std::fmt;

use alloy_primitives::U256;
use solana_sdk::sysvar;

use super::{exchange_rate, ClockFields, StakePoolError, StakePoolFields};
use crate::common::typedefs::{
    block_time::BlockTime, hash::Hash, hex_bytes::HexBytes,
    serializable_pubkey::SerializablePubkey,
};
use crate::query::QueryResponse;

/// Everything a stake pool query response says about the pool, decoded once.
#[derive(Debug, Clone, PartialEq)]
pub struct StakePoolReport {
    pub account: SerializablePubkey,
    pub slot_number: u64,
    pub block_time: BlockTime,
    pub block_hash: Hash,
    pub owner: SerializablePubkey,
    pub data: Vec<u8>,
    pub fields: StakePoolFields,
    /// Present when the clock sysvar was part of the query.
    pub clock: Option<ClockFields>,
}

impl StakePoolReport {
    /// Decodes the hex response bytes returned by a query proxy.
    pub fn from_response_hex(response_hex: &str) -> Result<Self, StakePoolError> {
        let bytes = HexBytes::from_hex(response_hex)
            .map_err(|e| StakePoolError::InvalidHex(e.to_string()))?;
        Self::from_response_bytes(bytes.as_slice())
    }

    pub fn from_response_bytes(bytes: &[u8]) -> Result<Self, StakePoolError> {
        Self::from_response(&QueryResponse::from_bytes(bytes)?)
    }

    /// Reads the first per-chain response, which must be a Solana account query whose first
    /// account is the stake pool.
    pub fn from_response(response: &QueryResponse) -> Result<Self, StakePoolError> {
        let (query, sol_response) = response
            .solana_account(0)
            .ok_or(StakePoolError::MissingSolanaResponse)?;
        if sol_response.results.len() != query.accounts.len() {
            return Err(StakePoolError::MissingAccountResult {
                expected: query.accounts.len(),
                actual: sol_response.results.len(),
            });
        }
        let pool_result = &sol_response.results[0];
        let fields = StakePoolFields::decode(&pool_result.data, query.data_slice_offset)?;

        let clock_index = query
            .accounts
            .iter()
            .position(|account| account.0 == sysvar::clock::ID);
        let clock = match clock_index {
            Some(index) if query.data_slice_offset == 0 => {
                Some(ClockFields::decode(&sol_response.results[index].data)?)
            }
            _ => None,
        };

        Ok(Self {
            account: query.accounts[0],
            slot_number: sol_response.slot_number,
            block_time: BlockTime(sol_response.block_time_us),
            block_hash: Hash(sol_response.block_hash),
            owner: pool_result.owner,
            data: pool_result.data.clone(),
            fields,
            clock,
        })
    }

    /// Pool token value in SOL, as a float. Only for display.
    pub fn pool_token_value(&self) -> f64 {
        self.fields.total_active_stake as f64 / self.fields.pool_token_supply as f64
    }

    pub fn exchange_rate(&self) -> Result<U256, StakePoolError> {
        exchange_rate(self.fields.total_active_stake, self.fields.pool_token_supply)
    }

    pub fn clock_epoch(&self) -> Option<u64> {
        self.clock.map(|clock| clock.epoch)
    }
}

impl fmt::Display for StakePoolReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<19}{}", "account (base58)", self.account.to_base58())?;
        writeln!(f, "{:<19}{}", "account (hex)", self.account.to_hex())?;
        writeln!(f, "{:<19}{}", "slot number", self.slot_number)?;
        writeln!(f, "{:<19}{}", "block time", self.block_time)?;
        writeln!(f, "{:<19}{}", "block hash", self.block_hash)?;
        writeln!(f, "{:<19}{}", "owner (base58)", self.owner.to_base58())?;
        writeln!(f, "{:<19}{}", "owner (hex)", self.owner.to_hex())?;
        writeln!(f, "{:<19}{}", "data", hex::encode(&self.data))?;
        writeln!(f, "{:<19}{}", "total active stake", self.fields.total_active_stake)?;
        writeln!(f, "{:<19}{}", "pool token supply", self.fields.pool_token_supply)?;
        if let Some(epoch) = self.fields.last_update_epoch {
            writeln!(f, "{:<19}{}", "last update epoch", epoch)?;
        }
        if let Some(clock) = &self.clock {
            writeln!(f, "{:<19}{}", "clock epoch", clock.epoch)?;
        }
        write!(f, "{:<19}{}", "pool token value", self.pool_token_value())
    }
}
