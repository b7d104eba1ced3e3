use std::{
    collections::HashMap,
    env,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use stake_pool_query::{
    common::typedefs::{
        block_time::BlockTime, hash::Hash, serializable_pubkey::SerializablePubkey,
    },
    proxy::{ProxyError, QueryProxyMock, SolanaAccountSource, SolanaAccountsAtSlot, SolanaBlock},
    query::{
        signature::GuardianSigner, SolanaAccountQueryRequest, SolanaAccountResult,
        CHAIN_ID_SOLANA,
    },
    stake_pool::{layout::FIRST_FIELD_BYTE_IDX, JITO_SOL_POOL, SPL_STAKE_POOL_PROGRAM},
};

pub use rstest::rstest;

static INIT: Lazy<Mutex<Option<()>>> = Lazy::new(|| Mutex::new(None));

pub fn setup_logging() {
    let mut init = INIT.lock().unwrap();
    if init.is_none() {
        let env_filter = env::var("RUST_LOG").unwrap_or("info".to_string());
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(env_filter)
            .init();
        *init = Some(())
    }
}

pub fn jito_pool() -> SerializablePubkey {
    SerializablePubkey::try_from(JITO_SOL_POOL).unwrap()
}

/// Mock proxy signing with the devnet guardian, answering from a [`FakeSolanaNode`] that holds
/// the Jito pool.
pub fn mock_proxy() -> QueryProxyMock {
    setup_logging();
    QueryProxyMock::new(GuardianSigner::devnet().unwrap()).with_source(
        CHAIN_ID_SOLANA,
        Arc::new(FakeSolanaNode::with_stake_pool(jito_pool())),
    )
}

pub const NODE_SLOT: u64 = 251_234_567;
/// 2024-02-08T18:30:04Z
pub const NODE_BLOCK_TIME_SECONDS: i64 = 1_707_417_004;
pub const POOL_TOTAL_ACTIVE_STAKE: u64 = 11_573_046_202_543_513;
pub const POOL_TOKEN_SUPPLY: u64 = 10_533_214_337_180_367;
pub const POOL_LAST_UPDATE_EPOCH: u64 = 577;
pub const CLOCK_EPOCH: u64 = 578;

/// Stake pool account data with the three tracked fields at their real offsets, followed by
/// unrelated bytes.
pub fn stake_pool_account_data() -> Vec<u8> {
    let mut data = vec![0x5a; FIRST_FIELD_BYTE_IDX as usize];
    data.extend_from_slice(&POOL_TOTAL_ACTIVE_STAKE.to_le_bytes());
    data.extend_from_slice(&POOL_TOKEN_SUPPLY.to_le_bytes());
    data.extend_from_slice(&POOL_LAST_UPDATE_EPOCH.to_le_bytes());
    data.extend_from_slice(&[0xc3; 329]);
    data
}

pub fn clock_account_data() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&NODE_SLOT.to_le_bytes());
    data.extend_from_slice(&1_707_000_000i64.to_le_bytes());
    data.extend_from_slice(&CLOCK_EPOCH.to_le_bytes());
    data.extend_from_slice(&(CLOCK_EPOCH + 1).to_le_bytes());
    data.extend_from_slice(&NODE_BLOCK_TIME_SECONDS.to_le_bytes());
    data
}

/// A Solana node frozen at one finalized slot, serving a fixed set of accounts.
pub struct FakeSolanaNode {
    pub slot: u64,
    pub block_time: BlockTime,
    pub block_hash: Hash,
    pub accounts: HashMap<SerializablePubkey, SolanaAccountResult>,
}

impl FakeSolanaNode {
    pub fn with_stake_pool(stake_pool: SerializablePubkey) -> Self {
        let mut accounts = HashMap::new();
        accounts.insert(
            stake_pool,
            SolanaAccountResult {
                lamports: 2_039_280,
                rent_epoch: u64::MAX,
                executable: false,
                owner: SerializablePubkey::try_from(SPL_STAKE_POOL_PROGRAM).unwrap(),
                data: stake_pool_account_data(),
            },
        );
        accounts.insert(
            SerializablePubkey(solana_sdk::sysvar::clock::ID),
            SolanaAccountResult {
                lamports: 1_169_280,
                rent_epoch: 0,
                executable: false,
                owner: SerializablePubkey(solana_sdk::sysvar::ID),
                data: clock_account_data(),
            },
        );
        Self {
            slot: NODE_SLOT,
            block_time: BlockTime::from_unix_seconds(NODE_BLOCK_TIME_SECONDS).unwrap(),
            block_hash: Hash([0x42; 32]),
            accounts,
        }
    }
}

fn apply_data_slice(data: &[u8], offset: u64, length: u64) -> Vec<u8> {
    if length == 0 {
        return data.to_vec();
    }
    let start = (offset as usize).min(data.len());
    let end = (offset.saturating_add(length) as usize).min(data.len());
    data[start..end].to_vec()
}

#[async_trait]
impl SolanaAccountSource for FakeSolanaNode {
    async fn get_multiple_accounts(
        &self,
        query: &SolanaAccountQueryRequest,
    ) -> Result<SolanaAccountsAtSlot, ProxyError> {
        if let Some(min_context_slot) = query.min_context_slot() {
            if min_context_slot > self.slot {
                return Err(ProxyError::Rpc(format!(
                    "Minimum context slot has not been reached: {}",
                    self.slot
                )));
            }
        }
        let accounts = query
            .accounts
            .iter()
            .map(|account| {
                self.accounts.get(account).map(|result| SolanaAccountResult {
                    data: apply_data_slice(
                        &result.data,
                        query.data_slice_offset,
                        query.data_slice_length,
                    ),
                    ..result.clone()
                })
            })
            .collect();
        Ok(SolanaAccountsAtSlot {
            slot: self.slot,
            accounts,
        })
    }

    async fn get_block(&self, slot: u64) -> Result<SolanaBlock, ProxyError> {
        assert_eq!(slot, self.slot);
        Ok(SolanaBlock {
            block_time: self.block_time,
            block_hash: self.block_hash,
        })
    }
}
