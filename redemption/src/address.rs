//! # Ledger Addresses
//!
//! Two kinds of address show up in a claim:
//!
//! - the **redemption address**, derived from a redemption key's public key,
//!   which holds the voucher funds; and
//! - the **receiver address**, a wallet address where the funds end up.
//!
//! Both share one binary layout, base58 encoded for display:
//!
//! ```text
//! type (1) | network (1) | root (28) | checksum (4)
//!
//! root     = BLAKE3_derive_key(ADDRESS_ROOT_CONTEXT, type | network | public_key)[..28]
//! checksum = SHA-256(SHA-256(type | network | root))[..4]
//! ```
//!
//! The network tag is part of the hashed input, so the same key yields
//! unrelated addresses on mainnet and testnet. The checksum catches
//! copy-paste damage before an address ever reaches the backend.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{
    Network, ADDRESS_CHECKSUM_LENGTH, ADDRESS_LENGTH, ADDRESS_ROOT_CONTEXT, ADDRESS_ROOT_LENGTH,
    ADDRESS_TYPE_REDEEM, ADDRESS_TYPE_WALLET,
};
use crate::crypto::hash::{double_sha256, domain_separated_hash_multi};
use crate::crypto::keys::RedemptionKey;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while decoding an address.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is not valid base58")]
    Base58,

    #[error("address must be {ADDRESS_LENGTH} bytes, got {0}")]
    Length(usize),

    #[error("unknown address type tag {0:#04x}")]
    UnknownType(u8),

    #[error("unknown network tag {0:#04x}")]
    UnknownNetwork(u8),

    #[error("address checksum mismatch")]
    Checksum,
}

// ---------------------------------------------------------------------------
// AddressKind
// ---------------------------------------------------------------------------

/// Which role an address plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Spendable only by a redemption key.
    Redeem,
    /// An ordinary wallet address.
    Wallet,
}

impl AddressKind {
    fn tag(self) -> u8 {
        match self {
            Self::Redeem => ADDRESS_TYPE_REDEEM,
            Self::Wallet => ADDRESS_TYPE_WALLET,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            ADDRESS_TYPE_REDEEM => Some(Self::Redeem),
            ADDRESS_TYPE_WALLET => Some(Self::Wallet),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A checksummed ledger address.
///
/// Equality is byte equality, which includes the network tag. A mainnet and
/// a testnet address for the same key are never equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    bytes: [u8; ADDRESS_LENGTH],
}

impl Address {
    /// The redemption address owned by `key` on `network`.
    ///
    /// This is a pure function of the key's public half and the network.
    pub fn from_redemption_key(key: &RedemptionKey, network: Network) -> Self {
        Self::from_redemption_key_bytes(&key.public_key_bytes(), network)
    }

    /// The redemption address for a bare public key, as found in a claim
    /// witness.
    pub fn from_redemption_key_bytes(public_key: &[u8; 32], network: Network) -> Self {
        Self::derive(AddressKind::Redeem, network, public_key)
    }

    /// A wallet address for an arbitrary Ed25519 public key.
    pub fn wallet(public_key: &[u8; 32], network: Network) -> Self {
        Self::derive(AddressKind::Wallet, network, public_key)
    }

    fn derive(kind: AddressKind, network: Network, public_key: &[u8; 32]) -> Self {
        let prefix = [kind.tag(), network.tag()];
        let digest = domain_separated_hash_multi(ADDRESS_ROOT_CONTEXT, &[&prefix, public_key]);

        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[..2].copy_from_slice(&prefix);
        bytes[2..2 + ADDRESS_ROOT_LENGTH].copy_from_slice(&digest[..ADDRESS_ROOT_LENGTH]);

        let checksum = double_sha256(&bytes[..2 + ADDRESS_ROOT_LENGTH]);
        bytes[2 + ADDRESS_ROOT_LENGTH..].copy_from_slice(&checksum[..ADDRESS_CHECKSUM_LENGTH]);

        Self { bytes }
    }

    /// Decode and validate a base58 address string.
    pub fn from_base58(encoded: &str) -> Result<Self, AddressError> {
        let decoded = bs58::decode(encoded.trim())
            .into_vec()
            .map_err(|_| AddressError::Base58)?;
        Self::from_slice(&decoded)
    }

    /// Validate raw address bytes.
    pub fn from_slice(raw: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; ADDRESS_LENGTH] = raw
            .try_into()
            .map_err(|_| AddressError::Length(raw.len()))?;

        if AddressKind::from_tag(bytes[0]).is_none() {
            return Err(AddressError::UnknownType(bytes[0]));
        }
        if Network::from_tag(bytes[1]).is_none() {
            return Err(AddressError::UnknownNetwork(bytes[1]));
        }

        let checksum = double_sha256(&bytes[..2 + ADDRESS_ROOT_LENGTH]);
        if checksum[..ADDRESS_CHECKSUM_LENGTH] != bytes[2 + ADDRESS_ROOT_LENGTH..] {
            return Err(AddressError::Checksum);
        }

        Ok(Self { bytes })
    }

    /// The base58 text form.
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.bytes).into_string()
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.bytes
    }

    pub fn kind(&self) -> AddressKind {
        // Tags are validated on every constructor.
        AddressKind::from_tag(self.bytes[0]).unwrap_or(AddressKind::Wallet)
    }

    pub fn network(&self) -> Network {
        Network::from_tag(self.bytes[1]).unwrap_or(Network::Mainnet)
    }

    pub fn is_redeem(&self) -> bool {
        self.kind() == AddressKind::Redeem
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_base58(&encoded).map_err(serde::de::Error::custom)
    }
}
