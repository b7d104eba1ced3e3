use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::typedefs::hex_bytes::HexBytes;
use crate::query::signature::GuardianSignature;
use crate::query::{QueryError, QueryRequest, QueryResponse};

pub mod client;
pub mod mock;

pub use client::QueryProxyClient;
pub use mock::{QueryProxyMock, SolanaAccountSource, SolanaAccountsAtSlot, SolanaBlock};

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("API_KEY is required to query {url}")]
    MissingApiKey { url: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Query proxy returned status {status}: {body}")]
    BadStatus { status: u16, body: String },
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
    #[error("Solana RPC error: {0}")]
    Rpc(String),
    #[error("Account {account} not found")]
    MissingAccount { account: String },
    #[error("Block {slot} has no block time")]
    MissingBlockTime { slot: u64 },
    #[error("No account source configured for chain {0}")]
    UnknownChain(u16),
}

/// Signed response returned by a query proxy, in its JSON wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryProxyResponse {
    pub signatures: Vec<GuardianSignature>,
    pub bytes: HexBytes,
}

impl QueryProxyResponse {
    pub fn decode(&self) -> Result<QueryResponse, QueryError> {
        QueryResponse::from_bytes(self.bytes.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryProxyRequest {
    pub bytes: HexBytes,
}

impl QueryProxyRequest {
    pub fn new(request: &QueryRequest) -> Result<Self, QueryError> {
        Ok(Self {
            bytes: HexBytes(request.serialize()?),
        })
    }
}

/// Anything that turns a query request into a guardian-signed response.
#[async_trait]
pub trait QueryProxy: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<QueryProxyResponse, ProxyError>;
}
