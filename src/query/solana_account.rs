use byteorder::{BigEndian, ReadBytesExt};

use super::{
    ensure_consumed, read_array, read_bytes, read_length_prefixed, write_length_prefixed,
    QueryError,
};
use crate::common::typedefs::serializable_pubkey::SerializablePubkey;

/// The only commitment level guardians will answer Solana queries at.
pub const FINALIZED_COMMITMENT: &str = "finalized";
pub const MAX_ACCOUNTS_PER_QUERY: usize = u8::MAX as usize;

/// Reads a set of Solana accounts at a single slot.
///
/// `data_slice_offset`/`data_slice_length` apply to every account in the query, mirroring the
/// single `dataSlice` of `getMultipleAccounts`. A length of zero requests the full account data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolanaAccountQueryRequest {
    pub commitment: String,
    /// Zero means "no minimum".
    pub min_context_slot: u64,
    pub data_slice_offset: u64,
    pub data_slice_length: u64,
    pub accounts: Vec<SerializablePubkey>,
}

impl SolanaAccountQueryRequest {
    pub fn new(
        commitment: &str,
        accounts: Vec<SerializablePubkey>,
        min_context_slot: Option<u64>,
        data_slice_offset: u64,
        data_slice_length: u64,
    ) -> Result<Self, QueryError> {
        let request = Self {
            commitment: commitment.to_string(),
            min_context_slot: min_context_slot.unwrap_or(0),
            data_slice_offset,
            data_slice_length,
            accounts,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn min_context_slot(&self) -> Option<u64> {
        match self.min_context_slot {
            0 => None,
            slot => Some(slot),
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, QueryError> {
        self.validate()?;
        let mut buf = Vec::with_capacity(4 + self.commitment.len() + 25 + 32 * self.accounts.len());
        write_length_prefixed(&mut buf, "commitment", self.commitment.as_bytes())?;
        buf.extend_from_slice(&self.min_context_slot.to_be_bytes());
        buf.extend_from_slice(&self.data_slice_offset.to_be_bytes());
        buf.extend_from_slice(&self.data_slice_length.to_be_bytes());
        buf.push(self.accounts.len() as u8);
        for account in &self.accounts {
            buf.extend_from_slice(&account.to_bytes());
        }
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, QueryError> {
        let mut reader = bytes;
        let commitment = String::from_utf8(read_length_prefixed(&mut reader)?).map_err(|_| {
            QueryError::InvalidUtf8 {
                field: "commitment",
            }
        })?;
        let min_context_slot = reader.read_u64::<BigEndian>()?;
        let data_slice_offset = reader.read_u64::<BigEndian>()?;
        let data_slice_length = reader.read_u64::<BigEndian>()?;
        let num_accounts = reader.read_u8()? as usize;
        let mut accounts = Vec::with_capacity(num_accounts);
        for _ in 0..num_accounts {
            accounts.push(SerializablePubkey::from(read_array::<32>(&mut reader)?));
        }
        ensure_consumed(reader)?;

        let request = Self {
            commitment,
            min_context_slot,
            data_slice_offset,
            data_slice_length,
            accounts,
        };
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<(), QueryError> {
        if self.commitment != FINALIZED_COMMITMENT {
            return Err(QueryError::InvalidCommitment(self.commitment.clone()));
        }
        if self.accounts.is_empty() || self.accounts.len() > MAX_ACCOUNTS_PER_QUERY {
            return Err(QueryError::InvalidAccountCount(self.accounts.len()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolanaAccountResult {
    pub lamports: u64,
    pub rent_epoch: u64,
    pub executable: bool,
    pub owner: SerializablePubkey,
    /// Account data, already cut down to the requested slice.
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolanaAccountQueryResponse {
    pub slot_number: u64,
    /// Microseconds since the Unix epoch.
    pub block_time_us: u64,
    pub block_hash: [u8; 32],
    /// One entry per requested account, in request order.
    pub results: Vec<SolanaAccountResult>,
}

impl SolanaAccountQueryResponse {
    pub fn serialize(&self) -> Result<Vec<u8>, QueryError> {
        if self.results.len() > MAX_ACCOUNTS_PER_QUERY {
            return Err(QueryError::InvalidAccountCount(self.results.len()));
        }
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.slot_number.to_be_bytes());
        buf.extend_from_slice(&self.block_time_us.to_be_bytes());
        buf.extend_from_slice(&self.block_hash);
        buf.push(self.results.len() as u8);
        for result in &self.results {
            buf.extend_from_slice(&result.lamports.to_be_bytes());
            buf.extend_from_slice(&result.rent_epoch.to_be_bytes());
            buf.push(result.executable as u8);
            buf.extend_from_slice(&result.owner.to_bytes());
            write_length_prefixed(&mut buf, "account data", &result.data)?;
        }
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, QueryError> {
        let mut reader = bytes;
        let slot_number = reader.read_u64::<BigEndian>()?;
        let block_time_us = reader.read_u64::<BigEndian>()?;
        let block_hash = read_array::<32>(&mut reader)?;
        let num_results = reader.read_u8()? as usize;
        let mut results = Vec::with_capacity(num_results);
        for _ in 0..num_results {
            let lamports = reader.read_u64::<BigEndian>()?;
            let rent_epoch = reader.read_u64::<BigEndian>()?;
            let executable = reader.read_u8()? != 0;
            let owner = SerializablePubkey::from(read_array::<32>(&mut reader)?);
            let data_len = reader.read_u32::<BigEndian>()? as usize;
            let data = read_bytes(&mut reader, data_len)?;
            results.push(SolanaAccountResult {
                lamports,
                rent_epoch,
                executable,
                owner,
                data,
            });
        }
        ensure_consumed(reader)?;
        Ok(Self {
            slot_number,
            block_time_us,
            block_hash,
            results,
        })
    }
}
