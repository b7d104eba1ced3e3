use std::fs;
use std::path::Path;

use alloy_primitives::{Address, Bytes, U256};
use alloy_rpc_types::TransactionReceipt;
use alloy_sol_types::{SolCall, SolConstructor};
use log::info;

use super::client::{call_request, deploy_request, EvmClient};
use super::state::OnChainPoolState;
use super::{EvmError, Signature, StakePoolRate};
use crate::common::typedefs::serializable_pubkey::SerializablePubkey;
use crate::query::signature::EvmSignature;

/// Constructor arguments of the rate contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakePoolRateConfig {
    /// Wormhole core contract holding the guardian set.
    pub wormhole: Address,
    pub stake_pool: SerializablePubkey,
    pub stake_pool_owner: SerializablePubkey,
    /// Oldest block time, in seconds, an update may carry.
    pub allowed_update_staleness: u64,
}

impl StakePoolRateConfig {
    fn encode_constructor(&self) -> Vec<u8> {
        StakePoolRate::constructorCall {
            wormhole: self.wormhole,
            stakePoolAccount: self.stake_pool.to_bytes().into(),
            stakePoolOwner: self.stake_pool_owner.to_bytes().into(),
            allowedUpdateStaleness: self.allowed_update_staleness,
        }
        .abi_encode()
    }
}

pub struct StakePoolRateContract {
    client: EvmClient,
    address: Address,
    sender: Address,
}

impl StakePoolRateContract {
    pub fn attach(client: EvmClient, address: Address, sender: Address) -> Self {
        Self {
            client,
            address,
            sender,
        }
    }

    /// Deploys `bytecode` with `config` from the node's first unlocked account.
    pub async fn deploy(
        client: EvmClient,
        bytecode: &[u8],
        config: &StakePoolRateConfig,
    ) -> Result<Self, EvmError> {
        let sender = client.default_sender().await?;
        let mut data = bytecode.to_vec();
        data.extend_from_slice(&config.encode_constructor());
        let receipt = client.send_and_confirm(&deploy_request(sender, data)).await?;
        let address = receipt
            .contract_address
            .ok_or_else(|| EvmError::MissingContractAddress {
                hash: receipt.transaction_hash.to_string(),
            })?;
        info!("Deployed stake pool rate contract at {}", address);
        Ok(Self::attach(client, address, sender))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn update_pool(
        &self,
        response: &[u8],
        signatures: &[EvmSignature],
    ) -> Result<TransactionReceipt, EvmError> {
        let call = StakePoolRate::updatePoolCall {
            response: Bytes::copy_from_slice(response),
            signatures: signatures.iter().copied().map(Signature::from).collect(),
        };
        let tx = call_request(Some(self.sender), self.address, call.abi_encode());
        let receipt = self.client.send_and_confirm(&tx).await?;
        info!(
            "updatePool mined in {} ({} signatures)",
            receipt.transaction_hash,
            signatures.len()
        );
        Ok(receipt)
    }

    async fn view<C: SolCall>(&self, call: C) -> Result<C::Return, EvmError> {
        let output = self.client.call(self.address, call.abi_encode()).await?;
        Ok(C::abi_decode_returns(&output, true)?)
    }

    pub async fn read_state(&self) -> Result<OnChainPoolState, EvmError> {
        let slot = self
            .view(StakePoolRate::lastUpdateSlotNumberCall {})
            .await?
            ._0;
        let block_time = self
            .view(StakePoolRate::lastUpdateBlockTimeCall {})
            .await?
            ._0;
        let total_active_stake = self.view(StakePoolRate::totalActiveStakeCall {}).await?._0;
        let pool_token_supply = self.view(StakePoolRate::poolTokenSupplyCall {}).await?._0;
        let rate: U256 = self.view(StakePoolRate::getRateCall {}).await?._0;
        Ok(OnChainPoolState {
            slot,
            block_time,
            total_active_stake,
            pool_token_supply,
            rate,
        })
    }
}

/// Reads contract creation code from a Foundry/Hardhat artifact or a plain hex file.
pub fn load_contract_bytecode(path: &Path) -> Result<Vec<u8>, EvmError> {
    let contents = fs::read_to_string(path)?;
    let trimmed = contents.trim();
    let hex_code = if trimmed.starts_with('{') {
        let artifact: serde_json::Value = serde_json::from_str(trimmed)
            .map_err(|e| EvmError::InvalidBytecode(format!("{}: {}", path.display(), e)))?;
        artifact_bytecode(&artifact)
            .ok_or_else(|| {
                EvmError::InvalidBytecode(format!("{} has no bytecode field", path.display()))
            })?
            .to_string()
    } else {
        trimmed.to_string()
    };
    parse_bytecode(&hex_code)
}

fn artifact_bytecode(artifact: &serde_json::Value) -> Option<&str> {
    let bytecode = artifact.get("bytecode")?;
    bytecode
        .get("object")
        .and_then(|object| object.as_str())
        .or_else(|| bytecode.as_str())
}

fn parse_bytecode(hex_code: &str) -> Result<Vec<u8>, EvmError> {
    let hex_code = hex_code.strip_prefix("0x").unwrap_or(hex_code);
    let bytecode = hex::decode(hex_code).map_err(|e| EvmError::InvalidBytecode(e.to_string()))?;
    if bytecode.is_empty() {
        return Err(EvmError::InvalidBytecode("empty bytecode".to_string()));
    }
    Ok(bytecode)
}
