use alloy_primitives::U256;
use solana_sdk::sysvar;

use crate::common::typedefs::serializable_pubkey::SerializablePubkey;
use crate::query::solana_account::FINALIZED_COMMITMENT;
use crate::query::{PerChainQueryRequest, QueryError, QueryRequest, SolanaAccountQueryRequest};

pub mod error;
pub mod fixture;
pub mod layout;
pub mod report;

pub use error::StakePoolError;
pub use layout::{ClockFields, StakePoolFields};
pub use report::StakePoolReport;

pub const DEFAULT_NONCE: u32 = 42;
/// Jito liquid staking pool on mainnet.
pub const JITO_SOL_POOL: &str = "Jito4APyf642JPZPx3hGc6WWJ8zPKtRbRs4P815Awbb";
/// SPL stake pool deployed on devnet, as listed by `spl-stake-pool list-all`.
pub const DEVNET_STAKE_POOL: &str = "DBEr3Z4vdR9WH2jv1hY8Xh1KYQWnBGFjUubvLGdRSvZw";
/// The SPL stake pool program, owner of both pools above.
pub const SPL_STAKE_POOL_PROGRAM: &str = "SPoo1Ku8WFXoNDMHPsrGSTSG1Y47rzgn41SLUNakuHy";

pub const SOLANA_MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";
pub const SOLANA_DEVNET_RPC: &str = "https://api.devnet.solana.com";
pub const TESTNET_QUERY_URL: &str = "https://testnet.query.wormhole.com/v1/query";

pub const THIRTY_MINUTES: u64 = 60 * 30;

/// Fixed-point scale of the exchange rate stored by the rate contract.
pub const RATE_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Parameters of the query sent for a stake pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakePoolQueryConfig {
    pub nonce: u32,
    pub stake_pool: SerializablePubkey,
    pub include_clock: bool,
    pub min_context_slot: Option<u64>,
    pub data_slice_offset: u64,
    pub data_slice_length: u64,
}

impl StakePoolQueryConfig {
    /// Queries only the pool account, sliced down to total stake and pool token supply.
    pub fn two_field(stake_pool: SerializablePubkey) -> Self {
        Self {
            nonce: DEFAULT_NONCE,
            stake_pool,
            include_clock: false,
            min_context_slot: None,
            data_slice_offset: layout::TWO_FIELD_SLICE_OFFSET,
            data_slice_length: layout::TWO_FIELD_SLICE_LENGTH,
        }
    }

    /// Queries the pool and the clock sysvar, covering all three pool fields and the clock epoch.
    pub fn with_clock(stake_pool: SerializablePubkey) -> Self {
        Self {
            nonce: DEFAULT_NONCE,
            stake_pool,
            include_clock: true,
            min_context_slot: None,
            data_slice_offset: layout::DATA_SLICE_OFFSET,
            data_slice_length: layout::DATA_SLICE_LENGTH,
        }
    }

    pub fn with_min_context_slot(mut self, min_context_slot: u64) -> Self {
        self.min_context_slot = Some(min_context_slot);
        self
    }

    pub fn accounts(&self) -> Vec<SerializablePubkey> {
        let mut accounts = vec![self.stake_pool];
        if self.include_clock {
            accounts.push(SerializablePubkey(sysvar::clock::ID));
        }
        accounts
    }

    pub fn build_query_request(&self) -> Result<QueryRequest, QueryError> {
        let query = SolanaAccountQueryRequest::new(
            FINALIZED_COMMITMENT,
            self.accounts(),
            self.min_context_slot,
            self.data_slice_offset,
            self.data_slice_length,
        )?;
        QueryRequest::new(self.nonce, vec![PerChainQueryRequest::solana_account(query)])
    }
}

/// `total_active_stake * 10^18 / pool_token_supply`, the rate the contract stores.
pub fn exchange_rate(
    total_active_stake: u64,
    pool_token_supply: u64,
) -> Result<U256, StakePoolError> {
    if pool_token_supply == 0 {
        return Err(StakePoolError::ZeroPoolTokenSupply);
    }
    let scaled = U256::from(total_active_stake) * U256::from(RATE_PRECISION);
    Ok(scaled / U256::from(pool_token_supply))
}
