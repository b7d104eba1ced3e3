use thiserror::Error;

use super::ChainQueryType;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(u8),
    #[error("Unknown query type: {0}")]
    UnknownQueryType(u8),
    #[error("Query type {0} is not supported")]
    UnsupportedQueryType(ChainQueryType),
    #[error("Invalid commitment: {0}, only finalized is supported")]
    InvalidCommitment(String),
    #[error("Invalid number of accounts: {0}")]
    InvalidAccountCount(usize),
    #[error("Invalid number of per-chain queries: {0}")]
    InvalidQueryCount(usize),
    #[error("{field} does not fit in its length prefix")]
    FieldTooLarge { field: &'static str },
    #[error("Response does not match request: {msg}")]
    ResponseMismatch { msg: String },
    #[error("Input has {0} trailing bytes")]
    TrailingBytes(usize),
    #[error("Invalid utf-8 in {field}")]
    InvalidUtf8 { field: &'static str },
    #[error("Invalid guardian signature: {0}")]
    InvalidSignature(String),
}

// Reads only ever happen on in-memory slices, where the sole failure is running out of input.
impl From<std::io::Error> for QueryError {
    fn from(_err: std::io::Error) -> Self {
        QueryError::UnexpectedEof
    }
}
