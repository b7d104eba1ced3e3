use std::time::Duration;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;

const RPC_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RpcClientWithUri {
    pub client: RpcClient,
    pub uri: String,
}

impl RpcClientWithUri {
    pub fn new(uri: String) -> Self {
        Self::new_with_commitment(uri, CommitmentConfig::finalized())
    }

    pub fn new_with_commitment(uri: String, commitment: CommitmentConfig) -> Self {
        let client =
            RpcClient::new_with_timeout_and_commitment(uri.clone(), RPC_TIMEOUT, commitment);
        Self { client, uri }
    }
}
