use thiserror::Error;

use crate::query::QueryError;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StakePoolError {
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
    #[error("Invalid response hex: {0}")]
    InvalidHex(String),
    #[error("Response does not contain a Solana account query")]
    MissingSolanaResponse,
    #[error("Response has {actual} account results, expected {expected}")]
    MissingAccountResult { expected: usize, actual: usize },
    #[error("Account data too short: need {needed} bytes, got {actual}")]
    DataTooShort { needed: usize, actual: usize },
    #[error("Data slice starts at byte {0}, after the first stake pool field")]
    SliceAfterFields(u64),
    #[error("Response does not include the clock sysvar")]
    MissingClock,
    #[error("Pool token supply is zero")]
    ZeroPoolTokenSupply,
}
