//! Submitting signed query responses to the stake pool rate contract on an EVM chain.

use alloy_sol_types::sol;
use thiserror::Error;

pub mod client;
pub mod contract;
pub mod state;

pub use client::{call_request, deploy_request, EvmClient};
pub use contract::{load_contract_bytecode, StakePoolRateConfig, StakePoolRateContract};
pub use state::{verify_on_chain_state, ConsistencyError, FieldMismatch, OnChainPoolState};

sol! {
    /// Guardian signature in the layout `parseAndVerifyQueryResponse` takes.
    struct Signature {
        bytes32 r;
        bytes32 s;
        uint8 v;
        uint8 guardianIndex;
    }

    contract StakePoolRate {
        constructor(
            address wormhole,
            bytes32 stakePoolAccount,
            bytes32 stakePoolOwner,
            uint64 allowedUpdateStaleness
        );

        /// @dev Verifies the guardian signatures and stores the decoded pool fields
        function updatePool(bytes memory response, Signature[] memory signatures) external;

        function lastUpdateSlotNumber() external view returns (uint64);

        /// @dev Block time of the last update, in microseconds
        function lastUpdateBlockTime() external view returns (uint64);

        function totalActiveStake() external view returns (uint64);

        function poolTokenSupply() external view returns (uint64);

        /// @dev Returns totalActiveStake * 10 ** 18 / poolTokenSupply
        function getRate() external view returns (uint256);
    }
}

#[derive(Error, Debug)]
pub enum EvmError {
    #[error("EVM RPC error: {0}")]
    Rpc(#[from] jsonrpsee::core::Error),
    #[error("ABI error: {0}")]
    Abi(#[from] alloy_sol_types::Error),
    #[error("Node has no unlocked accounts")]
    NoAccounts,
    #[error("Transaction {hash} not mined after {attempts} attempts")]
    ReceiptTimeout { hash: String, attempts: u32 },
    #[error("Transaction {hash} reverted")]
    Reverted { hash: String },
    #[error("Deployment {hash} did not create a contract")]
    MissingContractAddress { hash: String },
    #[error("Invalid contract bytecode: {0}")]
    InvalidBytecode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::query::signature::EvmSignature> for Signature {
    fn from(signature: crate::query::signature::EvmSignature) -> Self {
        Signature {
            r: signature.r.into(),
            s: signature.s.into(),
            v: signature.v,
            guardianIndex: signature.guardian_index,
        }
    }
}
