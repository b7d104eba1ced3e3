//! Guardian signatures over query responses.
//!
//! The proxy returns each signature as 66 hex-encoded bytes: `r || s || recovery_id ||
//! guardian_index`. Contracts take them as a `{r, s, v, guardianIndex}` struct with the
//! Ethereum-style `v = recovery_id + 27`.

use std::fmt;

use serde::{Deserialize, Serialize};
use solana_program::keccak;
use solana_program::secp256k1_recover::secp256k1_recover;

use super::QueryError;

pub const SIGNATURE_LENGTH: usize = 66;
/// Domain separator guardians prepend before signing a query response hash.
pub const QUERY_RESPONSE_PREFIX: &[u8] = b"query_response_0000000000000000000|";
/// Private key of the single guardian in the Wormhole devnet guardian set. Only for mocks.
pub const DEVNET_GUARDIAN_PRIVATE_KEY: &str =
    "cfb12303a19cde580bb4dd771639b0d26bc68353645571a8cff516ab2ee113a0";
pub const DEVNET_GUARDIAN_ADDRESS: &str = "befa429d57cd18b7f8a4d91a2da9ab4af05d0fbe";

const ETHEREUM_RECOVERY_ID_OFFSET: u8 = 27;
const MAX_RECOVERY_ID: u8 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GuardianSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub recovery_id: u8,
    pub guardian_index: u8,
}

impl GuardianSignature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, QueryError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(QueryError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LENGTH,
                bytes.len()
            )));
        }
        if bytes[64] > MAX_RECOVERY_ID {
            return Err(QueryError::InvalidSignature(format!(
                "invalid recovery id {}",
                bytes[64]
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self {
            r,
            s,
            recovery_id: bytes[64],
            guardian_index: bytes[65],
        })
    }

    pub fn from_hex(value: &str) -> Result<Self, QueryError> {
        let value = value.strip_prefix("0x").unwrap_or(value);
        let bytes = hex::decode(value).map_err(|e| QueryError::InvalidSignature(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[0..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.recovery_id;
        bytes[65] = self.guardian_index;
        bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn to_evm_struct(&self) -> EvmSignature {
        EvmSignature {
            r: self.r,
            s: self.s,
            v: self.recovery_id + ETHEREUM_RECOVERY_ID_OFFSET,
            guardian_index: self.guardian_index,
        }
    }

    /// Recovers the 20-byte Ethereum address of the guardian that signed `digest`.
    pub fn recover_address(&self, digest: &[u8; 32]) -> Result<[u8; 20], QueryError> {
        let mut rs = [0u8; 64];
        rs[0..32].copy_from_slice(&self.r);
        rs[32..64].copy_from_slice(&self.s);
        let pubkey = secp256k1_recover(digest, self.recovery_id, &rs)
            .map_err(|e| QueryError::InvalidSignature(format!("recovery failed: {:?}", e)))?;
        let hash = keccak::hash(&pubkey.to_bytes()).to_bytes();
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        Ok(address)
    }
}

impl TryFrom<String> for GuardianSignature {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        GuardianSignature::from_hex(&value)
    }
}

impl From<GuardianSignature> for String {
    fn from(val: GuardianSignature) -> Self {
        val.to_hex()
    }
}

impl fmt::Debug for GuardianSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GuardianSignature({})", self.to_hex())
    }
}

/// The signature layout expected by the Wormhole core contract's `parseAndVerifyQueryResponse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
    pub guardian_index: u8,
}

pub fn signatures_to_evm_structs(signatures: &[GuardianSignature]) -> Vec<EvmSignature> {
    signatures.iter().map(GuardianSignature::to_evm_struct).collect()
}

/// `keccak256(prefix || keccak256(response))`, the digest guardians sign.
pub fn query_response_digest(response: &[u8]) -> [u8; 32] {
    let response_hash = keccak::hash(response).to_bytes();
    keccak::hashv(&[QUERY_RESPONSE_PREFIX, &response_hash[..]]).to_bytes()
}

/// Signs query responses the way a guardian would. Used by the mock proxy.
pub struct GuardianSigner {
    secret_key: libsecp256k1::SecretKey,
    guardian_index: u8,
}

impl GuardianSigner {
    pub fn new(private_key_hex: &str, guardian_index: u8) -> Result<Self, QueryError> {
        let key_bytes = hex::decode(private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex))
            .map_err(|e| QueryError::InvalidSignature(format!("invalid private key: {}", e)))?;
        let secret_key = libsecp256k1::SecretKey::parse_slice(&key_bytes)
            .map_err(|e| QueryError::InvalidSignature(format!("invalid private key: {:?}", e)))?;
        Ok(Self {
            secret_key,
            guardian_index,
        })
    }

    pub fn devnet() -> Result<Self, QueryError> {
        Self::new(DEVNET_GUARDIAN_PRIVATE_KEY, 0)
    }

    pub fn sign_response(&self, response: &[u8]) -> GuardianSignature {
        self.sign_digest(&query_response_digest(response))
    }

    pub fn sign_digest(&self, digest: &[u8; 32]) -> GuardianSignature {
        let message = libsecp256k1::Message::parse(digest);
        let (signature, recovery_id) = libsecp256k1::sign(&message, &self.secret_key);
        let rs = signature.serialize();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&rs[0..32]);
        s.copy_from_slice(&rs[32..64]);
        GuardianSignature {
            r,
            s,
            recovery_id: recovery_id.serialize(),
            guardian_index: self.guardian_index,
        }
    }
}
