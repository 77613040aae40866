//! # Redemption Configuration & Constants
//!
//! Every magic number the redemption pipeline depends on lives here. The
//! certificate container, the address layout and the claim transaction all
//! read their sizes and tags from this module, so changing one of these is a
//! format break: old certificates stop opening and old addresses stop
//! resolving. Treat them as frozen once a batch of certificates is printed.
//!
//! Runtime knobs (network selection, UTXO page size) are not globals. They
//! travel in [`ResolverConfig`], which the caller builds once and hands to
//! the resolver at construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Redemption keys are raw Ed25519 seeds. 32 bytes, no more, no less.
pub const REDEMPTION_KEY_LENGTH: usize = 32;

/// Length of the base64 text form of a redemption key (32 bytes, padded).
pub const REDEMPTION_KEY_BASE64_LENGTH: usize = 44;

/// Ed25519 signature length.
pub const SIGNATURE_LENGTH: usize = 64;

/// AES-256-GCM key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes. 96 bits, as GCM intends.
pub const AES_NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const AES_TAG_LENGTH: usize = 16;

// ---------------------------------------------------------------------------
// Mnemonics
// ---------------------------------------------------------------------------

/// Redemption mnemonics are always nine words.
pub const MNEMONIC_WORD_COUNT: usize = 9;

/// Nine 11-bit words carry 96 bits of entropy plus a 3-bit checksum.
pub const MNEMONIC_ENTROPY_LENGTH: usize = 12;

/// Checksum bits appended to the entropy (`entropy_bits / 32`).
pub const MNEMONIC_CHECKSUM_BITS: usize = 3;

// ---------------------------------------------------------------------------
// Key Derivation Contexts
// ---------------------------------------------------------------------------

/// BLAKE3 `derive_key` context for the regular certificate key.
pub const REGULAR_CERTIFICATE_KEY_CONTEXT: &str = "ada-redemption v1 regular certificate key";

/// BLAKE3 `derive_key` context for the paper-vend seed.
pub const PAPER_VEND_SEED_CONTEXT: &str = "ada-redemption v1 paper vend seed";

/// BLAKE3 `derive_key` context for address roots.
pub const ADDRESS_ROOT_CONTEXT: &str = "ada-redemption v1 address root";

/// Prefix mixed into every claim signature so a redemption key can never be
/// tricked into signing something that is not a claim.
pub const CLAIM_SIGNING_TAG: &[u8] = b"ada-redemption v1 claim";

// ---------------------------------------------------------------------------
// Certificate Container
// ---------------------------------------------------------------------------

/// First bytes of every encrypted certificate.
pub const ENCRYPTED_CERTIFICATE_MAGIC: &[u8; 8] = b"ADAREDEM";

/// Current container version.
pub const ENCRYPTED_CERTIFICATE_VERSION: u8 = 0x01;

/// Scheme byte for certificates sealed with a redemption mnemonic.
pub const SCHEME_MNEMONIC: u8 = 0x01;

/// Scheme byte for certificates sealed with force-vended credentials.
pub const SCHEME_COMPOUND: u8 = 0x02;

/// Argon2 salt length for the compound scheme.
pub const KDF_SALT_LENGTH: usize = 16;

/// First line of a plain (unencrypted) certificate.
pub const CERTIFICATE_HEADER: &str = "ADA REDEMPTION CERTIFICATE";

/// Line that introduces the redemption key section.
pub const REDEMPTION_KEY_LABEL: &str = "REDEMPTION KEY";

// ---------------------------------------------------------------------------
// Argon2 Bounds
// ---------------------------------------------------------------------------

/// Memory cost used when sealing force-vended certificates (KiB).
pub const DEFAULT_KDF_MEMORY_KIB: u32 = 65_536;

/// Iteration count used when sealing force-vended certificates.
pub const DEFAULT_KDF_ITERATIONS: u32 = 3;

/// Lanes used when sealing force-vended certificates.
pub const DEFAULT_KDF_PARALLELISM: u32 = 4;

/// Largest memory cost a certificate header may ask for (256 MiB).
/// Headers are attacker-controlled; anything above this is rejected before
/// a single byte is allocated.
pub const MAX_KDF_MEMORY_KIB: u32 = 256 * 1024;

/// Largest iteration count a certificate header may ask for.
pub const MAX_KDF_ITERATIONS: u32 = 10;

/// Largest lane count a certificate header may ask for.
pub const MAX_KDF_PARALLELISM: u32 = 16;

/// Argon2 parameters for the compound certificate scheme.
///
/// These are written into the certificate header at sealing time and read
/// back at decryption time, so issuers can raise the cost without breaking
/// already-printed certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl KdfParams {
    /// Returns `true` if every parameter is non-zero and under the caps.
    pub fn is_within_bounds(&self) -> bool {
        (8..=MAX_KDF_MEMORY_KIB).contains(&self.memory_kib)
            && (1..=MAX_KDF_ITERATIONS).contains(&self.iterations)
            && (1..=MAX_KDF_PARALLELISM).contains(&self.parallelism)
            && self.memory_kib >= 8 * self.parallelism
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_KDF_MEMORY_KIB,
            iterations: DEFAULT_KDF_ITERATIONS,
            parallelism: DEFAULT_KDF_PARALLELISM,
        }
    }
}

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Address type tag for wallet (receiver) addresses.
pub const ADDRESS_TYPE_WALLET: u8 = 0x00;

/// Address type tag for redemption addresses.
pub const ADDRESS_TYPE_REDEEM: u8 = 0x02;

/// Length of the address root (truncated BLAKE3 output).
pub const ADDRESS_ROOT_LENGTH: usize = 28;

/// Length of the address checksum.
pub const ADDRESS_CHECKSUM_LENGTH: usize = 4;

/// Total binary address length: type + network + root + checksum.
pub const ADDRESS_LENGTH: usize = 2 + ADDRESS_ROOT_LENGTH + ADDRESS_CHECKSUM_LENGTH;

/// Network tag embedded in mainnet addresses.
pub const NETWORK_TAG_MAINNET: u8 = 0x01;

/// Network tag embedded in testnet addresses.
pub const NETWORK_TAG_TESTNET: u8 = 0x02;

/// The ledger a redemption targets.
///
/// The tag is baked into every address, so a mainnet key derives a different
/// address on testnet and the two can never be confused by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// The byte written into addresses for this network.
    pub fn tag(self) -> u8 {
        match self {
            Self::Mainnet => NETWORK_TAG_MAINNET,
            Self::Testnet => NETWORK_TAG_TESTNET,
        }
    }

    /// Reverse of [`Network::tag`]. Unknown tags get `None`.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            NETWORK_TAG_MAINNET => Some(Self::Mainnet),
            NETWORK_TAG_TESTNET => Some(Self::Testnet),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// How many addresses go into one UTXO query. Mirrors the wallet backend's
/// request-size limit; larger batches get a 413 from most deployments.
pub const DEFAULT_UTXO_PAGE_SIZE: usize = 50;

/// Backend used by the CLI when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8080";

/// Path of the UTXO lookup endpoint.
pub const UTXO_FOR_ADDRESSES_PATH: &str = "/api/txs/utxoForAddresses";

/// Path of the signed transaction submission endpoint.
pub const SIGNED_TX_PATH: &str = "/api/txs/signed";

/// Explicit configuration for the UTXO resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Network the derived addresses belong to.
    pub network: Network,
    /// Maximum number of addresses per backend query. Zero is treated as one.
    pub utxo_page_size: usize,
}

impl ResolverConfig {
    /// Builds a config for `network` with the default page size.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            utxo_page_size: DEFAULT_UTXO_PAGE_SIZE,
        }
    }

    /// Overrides the page size.
    pub fn with_page_size(mut self, utxo_page_size: usize) -> Self {
        self.utxo_page_size = utxo_page_size;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new(Network::Mainnet)
    }
}
