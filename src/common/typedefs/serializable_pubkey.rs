use core::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::ser::{Serialize, Serializer};
use serde::{Deserialize, Deserializer};
use solana_sdk::pubkey::{ParsePubkeyError, Pubkey};
use std::convert::TryFrom;

/// A Solana account address that serializes as base58 and renders as hex for EVM tooling.
#[derive(Default, Clone, PartialEq, Eq, Hash, Copy)]
pub struct SerializablePubkey(pub Pubkey);

impl SerializablePubkey {
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }

    pub fn new_unique() -> Self {
        SerializablePubkey(Pubkey::new_unique())
    }
}

impl TryFrom<&str> for SerializablePubkey {
    type Error = ParsePubkeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(SerializablePubkey(Pubkey::from_str(value)?))
    }
}

impl FromStr for SerializablePubkey {
    type Err = ParsePubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SerializablePubkey::try_from(s)
    }
}

impl fmt::Display for SerializablePubkey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", &self.0)
    }
}

impl fmt::Debug for SerializablePubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerializablePubkey({})", self.0)
    }
}

impl From<Pubkey> for SerializablePubkey {
    fn from(pubkey: Pubkey) -> Self {
        SerializablePubkey(pubkey)
    }
}

impl From<[u8; 32]> for SerializablePubkey {
    fn from(bytes: [u8; 32]) -> Self {
        SerializablePubkey(Pubkey::from(bytes))
    }
}

impl From<SerializablePubkey> for [u8; 32] {
    fn from(val: SerializablePubkey) -> Self {
        val.0.to_bytes()
    }
}

struct Base58Visitor;

impl<'de> Visitor<'de> for Base58Visitor {
    type Value = SerializablePubkey;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a base58 encoded string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        SerializablePubkey::try_from(value).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for SerializablePubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(Base58Visitor)
    }
}

impl Serialize for SerializablePubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}
