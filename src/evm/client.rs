use std::time::Duration;

use alloy_primitives::{Address, Bytes, TxKind, B256};
use alloy_rpc_types::{TransactionInput, TransactionReceipt, TransactionRequest};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use log::debug;
use tokio::time::sleep;

use super::EvmError;

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const MAX_RECEIPT_ATTEMPTS: u32 = 120;

/// Transaction from `from` that deploys `code` as contract creation code.
pub fn deploy_request(from: Address, code: Vec<u8>) -> TransactionRequest {
    TransactionRequest {
        from: Some(from),
        input: TransactionInput::new(code.into()),
        ..Default::default()
    }
}

/// Transaction or call from `from` to the contract at `to`.
pub fn call_request(from: Option<Address>, to: Address, data: Vec<u8>) -> TransactionRequest {
    TransactionRequest {
        from,
        to: Some(TxKind::Call(to)),
        input: TransactionInput::new(data.into()),
        ..Default::default()
    }
}

/// JSON-RPC client for a development EVM node with unlocked accounts, such as anvil.
pub struct EvmClient {
    client: HttpClient,
    url: String,
}

impl EvmClient {
    pub fn new(url: &str) -> Result<Self, EvmError> {
        let client = HttpClientBuilder::default().build(url)?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn accounts(&self) -> Result<Vec<Address>, EvmError> {
        let accounts: Vec<Address> = self.client.request("eth_accounts", rpc_params![]).await?;
        Ok(accounts)
    }

    /// First unlocked account on the node.
    pub async fn default_sender(&self) -> Result<Address, EvmError> {
        self.accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(EvmError::NoAccounts)
    }

    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, EvmError> {
        let hash: B256 = self
            .client
            .request("eth_sendTransaction", rpc_params![tx])
            .await?;
        debug!("Sent transaction {}", hash);
        Ok(hash)
    }

    /// Polls until `hash` is mined. A mined transaction with a failed status is an error.
    pub async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt, EvmError> {
        for _ in 0..MAX_RECEIPT_ATTEMPTS {
            let receipt: Option<TransactionReceipt> = self
                .client
                .request("eth_getTransactionReceipt", rpc_params![hash])
                .await?;
            if let Some(receipt) = receipt {
                if !receipt.status() {
                    return Err(EvmError::Reverted {
                        hash: hash.to_string(),
                    });
                }
                return Ok(receipt);
            }
            sleep(RECEIPT_POLL_INTERVAL).await;
        }
        Err(EvmError::ReceiptTimeout {
            hash: hash.to_string(),
            attempts: MAX_RECEIPT_ATTEMPTS,
        })
    }

    pub async fn send_and_confirm(
        &self,
        tx: &TransactionRequest,
    ) -> Result<TransactionReceipt, EvmError> {
        let hash = self.send_transaction(tx).await?;
        self.wait_for_receipt(hash).await
    }

    /// `eth_call` against the latest block.
    pub async fn call(&self, to: Address, data: Vec<u8>) -> Result<Bytes, EvmError> {
        let tx = call_request(None, to, data);
        let output: Bytes = self
            .client
            .request("eth_call", rpc_params![tx, "latest"])
            .await?;
        Ok(output)
    }
}
