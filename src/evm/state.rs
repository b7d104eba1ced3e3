use std::fmt;

use alloy_primitives::U256;
use thiserror::Error;

use crate::stake_pool::{StakePoolError, StakePoolReport};

/// Pool state as stored by the rate contract after `updatePool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnChainPoolState {
    pub slot: u64,
    /// Microseconds, as carried in the query response.
    pub block_time: u64,
    pub total_active_stake: u64,
    pub pool_token_supply: u64,
    pub rate: U256,
}

impl OnChainPoolState {
    /// The state the contract should hold after accepting the response behind `report`.
    pub fn expected_from_report(report: &StakePoolReport) -> Result<Self, StakePoolError> {
        Ok(Self {
            slot: report.slot_number,
            block_time: report.block_time.as_micros(),
            total_active_stake: report.fields.total_active_stake,
            pool_token_supply: report.fields.pool_token_supply,
            rate: report.exchange_rate()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("On-chain state does not match the query response: {}", render_mismatches(.mismatches))]
pub struct ConsistencyError {
    pub mismatches: Vec<FieldMismatch>,
}

fn render_mismatches(mismatches: &[FieldMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Compares every field and reports all mismatches at once.
pub fn verify_on_chain_state(
    expected: &OnChainPoolState,
    actual: &OnChainPoolState,
) -> Result<(), ConsistencyError> {
    let mut mismatches = Vec::new();
    let mut check = |field: &'static str, expected: String, actual: String| {
        if expected != actual {
            mismatches.push(FieldMismatch {
                field,
                expected,
                actual,
            });
        }
    };
    check(
        "lastUpdateSlotNumber",
        expected.slot.to_string(),
        actual.slot.to_string(),
    );
    check(
        "lastUpdateBlockTime",
        expected.block_time.to_string(),
        actual.block_time.to_string(),
    );
    check(
        "totalActiveStake",
        expected.total_active_stake.to_string(),
        actual.total_active_stake.to_string(),
    );
    check(
        "poolTokenSupply",
        expected.pool_token_supply.to_string(),
        actual.pool_token_supply.to_string(),
    );
    check("getRate", expected.rate.to_string(), actual.rate.to_string());

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(ConsistencyError { mismatches })
    }
}
