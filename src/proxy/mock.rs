//! An in-process stand-in for the query proxy.
//!
//! Answers Solana account queries straight from an RPC node and signs the result with a known
//! guardian key, so contracts deployed against a devnet guardian set accept it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use solana_account_decoder::{UiAccountEncoding, UiDataSliceConfig};
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcBlockConfig};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_transaction_status::TransactionDetails;

use super::{ProxyError, QueryProxy, QueryProxyResponse};
use crate::common::typedefs::block_time::BlockTime;
use crate::common::typedefs::hash::Hash;
use crate::common::typedefs::hex_bytes::HexBytes;
use crate::common::typedefs::rpc_client_with_uri::RpcClientWithUri;
use crate::query::signature::GuardianSigner;
use crate::query::{
    ChainQuery, ChainQueryResponse, PerChainQueryResponse, QueryRequest, QueryResponse,
    SolanaAccountQueryRequest, SolanaAccountQueryResponse, SolanaAccountResult, CHAIN_ID_SOLANA,
};

/// Accounts read at a single context slot, in request order. `None` for accounts that do not
/// exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolanaAccountsAtSlot {
    pub slot: u64,
    pub accounts: Vec<Option<SolanaAccountResult>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolanaBlock {
    pub block_time: BlockTime,
    pub block_hash: Hash,
}

/// The two Solana RPC calls the mock needs to answer an account query.
#[async_trait]
pub trait SolanaAccountSource: Send + Sync {
    async fn get_multiple_accounts(
        &self,
        query: &SolanaAccountQueryRequest,
    ) -> Result<SolanaAccountsAtSlot, ProxyError>;

    async fn get_block(&self, slot: u64) -> Result<SolanaBlock, ProxyError>;
}

#[async_trait]
impl SolanaAccountSource for RpcClientWithUri {
    async fn get_multiple_accounts(
        &self,
        query: &SolanaAccountQueryRequest,
    ) -> Result<SolanaAccountsAtSlot, ProxyError> {
        let pubkeys: Vec<_> = query.accounts.iter().map(|account| account.0).collect();
        let data_slice = (query.data_slice_length > 0).then(|| UiDataSliceConfig {
            offset: query.data_slice_offset as usize,
            length: query.data_slice_length as usize,
        });
        let config = RpcAccountInfoConfig {
            encoding: Some(UiAccountEncoding::Base64),
            data_slice,
            commitment: Some(CommitmentConfig::finalized()),
            min_context_slot: query.min_context_slot(),
        };
        let response = self
            .client
            .get_multiple_accounts_with_config(&pubkeys, config)
            .await
            .map_err(|e| ProxyError::Rpc(format!("getMultipleAccounts on {}: {}", self.uri, e)))?;

        let accounts = response
            .value
            .into_iter()
            .map(|account| {
                account.map(|account| SolanaAccountResult {
                    lamports: account.lamports,
                    rent_epoch: account.rent_epoch,
                    executable: account.executable,
                    owner: account.owner.into(),
                    data: account.data,
                })
            })
            .collect();
        Ok(SolanaAccountsAtSlot {
            slot: response.context.slot,
            accounts,
        })
    }

    async fn get_block(&self, slot: u64) -> Result<SolanaBlock, ProxyError> {
        let config = RpcBlockConfig {
            encoding: None,
            transaction_details: Some(TransactionDetails::None),
            rewards: Some(false),
            commitment: Some(CommitmentConfig::finalized()),
            max_supported_transaction_version: Some(0),
        };
        let block = self
            .client
            .get_block_with_config(slot, config)
            .await
            .map_err(|e| ProxyError::Rpc(format!("getBlock {} on {}: {}", slot, self.uri, e)))?;

        let block_time = block
            .block_time
            .and_then(BlockTime::from_unix_seconds)
            .ok_or(ProxyError::MissingBlockTime { slot })?;
        let block_hash = Hash::try_from(block.blockhash.as_str())
            .map_err(|e| ProxyError::Rpc(format!("invalid blockhash {}: {}", block.blockhash, e)))?;
        Ok(SolanaBlock {
            block_time,
            block_hash,
        })
    }
}

pub struct QueryProxyMock {
    sources: HashMap<u16, Arc<dyn SolanaAccountSource>>,
    signer: GuardianSigner,
}

impl QueryProxyMock {
    pub fn new(signer: GuardianSigner) -> Self {
        Self {
            sources: HashMap::new(),
            signer,
        }
    }

    /// A mock answering Solana queries from `rpc_url`, signed by the devnet guardian.
    pub fn solana(rpc_url: String) -> Result<Self, ProxyError> {
        let signer = GuardianSigner::devnet()?;
        Ok(Self::new(signer).with_source(CHAIN_ID_SOLANA, Arc::new(RpcClientWithUri::new(rpc_url))))
    }

    pub fn with_source(mut self, chain_id: u16, source: Arc<dyn SolanaAccountSource>) -> Self {
        self.sources.insert(chain_id, source);
        self
    }

    async fn answer_solana_account(
        &self,
        source: &dyn SolanaAccountSource,
        query: &SolanaAccountQueryRequest,
    ) -> Result<SolanaAccountQueryResponse, ProxyError> {
        let fetched = source.get_multiple_accounts(query).await?;
        if fetched.accounts.len() != query.accounts.len() {
            return Err(ProxyError::Rpc(format!(
                "requested {} accounts, got {}",
                query.accounts.len(),
                fetched.accounts.len()
            )));
        }
        let results = fetched
            .accounts
            .into_iter()
            .zip(query.accounts.iter())
            .map(|(result, account)| {
                result.ok_or_else(|| ProxyError::MissingAccount {
                    account: account.to_base58(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let block = source.get_block(fetched.slot).await?;
        debug!(
            "Read {} accounts at slot {} ({})",
            results.len(),
            fetched.slot,
            block.block_time
        );
        Ok(SolanaAccountQueryResponse {
            slot_number: fetched.slot,
            block_time_us: block.block_time.as_micros(),
            block_hash: block.block_hash.0,
            results,
        })
    }
}

#[async_trait]
impl QueryProxy for QueryProxyMock {
    async fn query(&self, request: &QueryRequest) -> Result<QueryProxyResponse, ProxyError> {
        let mut responses = Vec::with_capacity(request.requests.len());
        for per_chain in &request.requests {
            let source = self
                .sources
                .get(&per_chain.chain_id)
                .ok_or(ProxyError::UnknownChain(per_chain.chain_id))?;
            let response = match &per_chain.query {
                ChainQuery::SolanaAccount(query) => ChainQueryResponse::SolanaAccount(
                    self.answer_solana_account(source.as_ref(), query).await?,
                ),
            };
            responses.push(PerChainQueryResponse {
                chain_id: per_chain.chain_id,
                response,
            });
        }

        let bytes = QueryResponse::off_chain(request.clone(), responses)?.serialize()?;
        let signature = self.signer.sign_response(&bytes);
        info!(
            "Mock proxy signed {} byte response as guardian {}",
            bytes.len(),
            signature.guardian_index
        );
        Ok(QueryProxyResponse {
            signatures: vec![signature],
            bytes: HexBytes(bytes),
        })
    }
}
