//! Encoding and decoding of cross-chain queries (CCQ).
//!
//! A [`QueryRequest`] bundles one query per source chain. The query proxy answers with a
//! [`QueryResponse`] that embeds the original request followed by one response per query, and
//! attaches guardian signatures over the response bytes (see [`signature`]).
//!
//! All integers on this wire are big-endian. Only the Solana account query type has a body
//! codec here; the remaining query types are recognised by id and rejected.

use std::fmt;
use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use num_enum::{IntoPrimitive, TryFromPrimitive};

pub mod error;
pub mod signature;
pub mod solana_account;

pub use error::QueryError;
pub use solana_account::{
    SolanaAccountQueryRequest, SolanaAccountQueryResponse, SolanaAccountResult,
};

pub const QUERY_VERSION: u8 = 1;
/// Wormhole chain id of Solana.
pub const CHAIN_ID_SOLANA: u16 = 1;
/// Off-chain requests are signed by the requester instead of being identified by a chain id.
pub const OFF_CHAIN_REQUEST_CHAIN_ID: u16 = 0;
pub const OFF_CHAIN_SIGNATURE_LENGTH: usize = 65;
pub const ON_CHAIN_REQUEST_ID_LENGTH: usize = 32;
pub const MAX_PER_CHAIN_QUERIES: usize = u8::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ChainQueryType {
    EthCall = 1,
    EthCallByTimestamp = 2,
    EthCallWithFinality = 3,
    SolanaAccount = 4,
    SolanaPda = 5,
}

impl fmt::Display for ChainQueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChainQueryType::EthCall => "eth_call",
            ChainQueryType::EthCallByTimestamp => "eth_call_by_timestamp",
            ChainQueryType::EthCallWithFinality => "eth_call_with_finality",
            ChainQueryType::SolanaAccount => "sol_account",
            ChainQueryType::SolanaPda => "sol_pda",
        };
        write!(f, "{}", name)
    }
}

impl ChainQueryType {
    fn read(reader: &mut &[u8]) -> Result<Self, QueryError> {
        let raw = reader.read_u8()?;
        ChainQueryType::try_from(raw).map_err(|_| QueryError::UnknownQueryType(raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainQuery {
    SolanaAccount(SolanaAccountQueryRequest),
}

impl ChainQuery {
    pub fn query_type(&self) -> ChainQueryType {
        match self {
            ChainQuery::SolanaAccount(_) => ChainQueryType::SolanaAccount,
        }
    }

    fn serialize_body(&self) -> Result<Vec<u8>, QueryError> {
        match self {
            ChainQuery::SolanaAccount(query) => query.serialize(),
        }
    }

    fn from_body(query_type: ChainQueryType, body: &[u8]) -> Result<Self, QueryError> {
        match query_type {
            ChainQueryType::SolanaAccount => Ok(ChainQuery::SolanaAccount(
                SolanaAccountQueryRequest::from_bytes(body)?,
            )),
            other => Err(QueryError::UnsupportedQueryType(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerChainQueryRequest {
    pub chain_id: u16,
    pub query: ChainQuery,
}

impl PerChainQueryRequest {
    pub fn new(chain_id: u16, query: ChainQuery) -> Self {
        Self { chain_id, query }
    }

    pub fn solana_account(query: SolanaAccountQueryRequest) -> Self {
        Self::new(CHAIN_ID_SOLANA, ChainQuery::SolanaAccount(query))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub nonce: u32,
    pub requests: Vec<PerChainQueryRequest>,
}

impl QueryRequest {
    pub fn new(nonce: u32, requests: Vec<PerChainQueryRequest>) -> Result<Self, QueryError> {
        validate_query_count(requests.len())?;
        Ok(Self { nonce, requests })
    }

    pub fn serialize(&self) -> Result<Vec<u8>, QueryError> {
        validate_query_count(self.requests.len())?;
        let mut buf = vec![QUERY_VERSION];
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf.push(self.requests.len() as u8);
        for request in &self.requests {
            buf.extend_from_slice(&request.chain_id.to_be_bytes());
            buf.push(request.query.query_type().into());
            write_length_prefixed(&mut buf, "per-chain query", &request.query.serialize_body()?)?;
        }
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, QueryError> {
        let mut reader = bytes;
        let request = Self::read(&mut reader)?;
        ensure_consumed(reader)?;
        Ok(request)
    }

    fn read(reader: &mut &[u8]) -> Result<Self, QueryError> {
        let version = reader.read_u8()?;
        if version != QUERY_VERSION {
            return Err(QueryError::UnsupportedVersion(version));
        }
        let nonce = reader.read_u32::<BigEndian>()?;
        let num_requests = reader.read_u8()? as usize;
        validate_query_count(num_requests)?;
        let mut requests = Vec::with_capacity(num_requests);
        for _ in 0..num_requests {
            let chain_id = reader.read_u16::<BigEndian>()?;
            let query_type = ChainQueryType::read(reader)?;
            let body = read_length_prefixed(reader)?;
            requests.push(PerChainQueryRequest {
                chain_id,
                query: ChainQuery::from_body(query_type, &body)?,
            });
        }
        Ok(Self { nonce, requests })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainQueryResponse {
    SolanaAccount(SolanaAccountQueryResponse),
}

impl ChainQueryResponse {
    pub fn query_type(&self) -> ChainQueryType {
        match self {
            ChainQueryResponse::SolanaAccount(_) => ChainQueryType::SolanaAccount,
        }
    }

    fn serialize_body(&self) -> Result<Vec<u8>, QueryError> {
        match self {
            ChainQueryResponse::SolanaAccount(response) => response.serialize(),
        }
    }

    fn from_body(query_type: ChainQueryType, body: &[u8]) -> Result<Self, QueryError> {
        match query_type {
            ChainQueryType::SolanaAccount => Ok(ChainQueryResponse::SolanaAccount(
                SolanaAccountQueryResponse::from_bytes(body)?,
            )),
            other => Err(QueryError::UnsupportedQueryType(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerChainQueryResponse {
    pub chain_id: u16,
    pub response: ChainQueryResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    /// Zero for off-chain requests.
    pub request_chain_id: u16,
    /// The requester's 65-byte signature for off-chain requests, otherwise a 32-byte request id.
    pub request_id: Vec<u8>,
    pub request: QueryRequest,
    pub responses: Vec<PerChainQueryResponse>,
}

impl QueryResponse {
    /// Builds the response the proxy returns for an off-chain request.
    pub fn off_chain(
        request: QueryRequest,
        responses: Vec<PerChainQueryResponse>,
    ) -> Result<Self, QueryError> {
        let response = Self {
            request_chain_id: OFF_CHAIN_REQUEST_CHAIN_ID,
            request_id: vec![0u8; OFF_CHAIN_SIGNATURE_LENGTH],
            request,
            responses,
        };
        response.validate()?;
        Ok(response)
    }

    pub fn serialize(&self) -> Result<Vec<u8>, QueryError> {
        self.validate()?;
        let mut buf = vec![QUERY_VERSION];
        buf.extend_from_slice(&self.request_chain_id.to_be_bytes());
        buf.extend_from_slice(&self.request_id);
        write_length_prefixed(&mut buf, "request", &self.request.serialize()?)?;
        buf.push(self.responses.len() as u8);
        for response in &self.responses {
            buf.extend_from_slice(&response.chain_id.to_be_bytes());
            buf.push(response.response.query_type().into());
            write_length_prefixed(
                &mut buf,
                "per-chain response",
                &response.response.serialize_body()?,
            )?;
        }
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, QueryError> {
        let mut reader = bytes;
        let version = reader.read_u8()?;
        if version != QUERY_VERSION {
            return Err(QueryError::UnsupportedVersion(version));
        }
        let request_chain_id = reader.read_u16::<BigEndian>()?;
        let request_id_length = match request_chain_id {
            OFF_CHAIN_REQUEST_CHAIN_ID => OFF_CHAIN_SIGNATURE_LENGTH,
            _ => ON_CHAIN_REQUEST_ID_LENGTH,
        };
        let request_id = read_bytes(&mut reader, request_id_length)?;
        let request = QueryRequest::from_bytes(&read_length_prefixed(&mut reader)?)?;

        let num_responses = reader.read_u8()? as usize;
        let mut responses = Vec::with_capacity(num_responses);
        for _ in 0..num_responses {
            let chain_id = reader.read_u16::<BigEndian>()?;
            let query_type = ChainQueryType::read(&mut reader)?;
            let body = read_length_prefixed(&mut reader)?;
            responses.push(PerChainQueryResponse {
                chain_id,
                response: ChainQueryResponse::from_body(query_type, &body)?,
            });
        }
        ensure_consumed(reader)?;

        let response = Self {
            request_chain_id,
            request_id,
            request,
            responses,
        };
        response.validate()?;
        Ok(response)
    }

    /// Returns the Solana account query and its response at `index`.
    pub fn solana_account(
        &self,
        index: usize,
    ) -> Option<(&SolanaAccountQueryRequest, &SolanaAccountQueryResponse)> {
        let request = self.request.requests.get(index)?;
        let response = self.responses.get(index)?;
        match (&request.query, &response.response) {
            (ChainQuery::SolanaAccount(query), ChainQueryResponse::SolanaAccount(response)) => {
                Some((query, response))
            }
        }
    }

    fn validate(&self) -> Result<(), QueryError> {
        let expected_id_length = match self.request_chain_id {
            OFF_CHAIN_REQUEST_CHAIN_ID => OFF_CHAIN_SIGNATURE_LENGTH,
            _ => ON_CHAIN_REQUEST_ID_LENGTH,
        };
        if self.request_id.len() != expected_id_length {
            return Err(QueryError::ResponseMismatch {
                msg: format!(
                    "request id is {} bytes, expected {}",
                    self.request_id.len(),
                    expected_id_length
                ),
            });
        }
        if self.responses.len() != self.request.requests.len() {
            return Err(QueryError::ResponseMismatch {
                msg: format!(
                    "{} responses for {} requests",
                    self.responses.len(),
                    self.request.requests.len()
                ),
            });
        }
        for (index, (request, response)) in self
            .request
            .requests
            .iter()
            .zip(self.responses.iter())
            .enumerate()
        {
            if request.chain_id != response.chain_id {
                return Err(QueryError::ResponseMismatch {
                    msg: format!(
                        "response {} is for chain {}, request was for chain {}",
                        index, response.chain_id, request.chain_id
                    ),
                });
            }
            if request.query.query_type() != response.response.query_type() {
                return Err(QueryError::ResponseMismatch {
                    msg: format!(
                        "response {} has type {}, request has type {}",
                        index,
                        response.response.query_type(),
                        request.query.query_type()
                    ),
                });
            }
        }
        Ok(())
    }
}

fn validate_query_count(count: usize) -> Result<(), QueryError> {
    if count == 0 || count > MAX_PER_CHAIN_QUERIES {
        return Err(QueryError::InvalidQueryCount(count));
    }
    Ok(())
}

pub(crate) fn read_array<const N: usize>(reader: &mut &[u8]) -> Result<[u8; N], QueryError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

pub(crate) fn read_bytes(reader: &mut &[u8], len: usize) -> Result<Vec<u8>, QueryError> {
    if reader.len() < len {
        return Err(QueryError::UnexpectedEof);
    }
    let (head, tail) = reader.split_at(len);
    *reader = tail;
    Ok(head.to_vec())
}

pub(crate) fn read_length_prefixed(reader: &mut &[u8]) -> Result<Vec<u8>, QueryError> {
    let len = reader.read_u32::<BigEndian>()? as usize;
    read_bytes(reader, len)
}

pub(crate) fn write_length_prefixed(
    buf: &mut Vec<u8>,
    field: &'static str,
    bytes: &[u8],
) -> Result<(), QueryError> {
    let len = u32::try_from(bytes.len()).map_err(|_| QueryError::FieldTooLarge { field })?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

pub(crate) fn ensure_consumed(reader: &[u8]) -> Result<(), QueryError> {
    if !reader.is_empty() {
        return Err(QueryError::TrailingBytes(reader.len()));
    }
    Ok(())
}
