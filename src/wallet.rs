// src/wallet.rs
//! Wallet identifiers and the hashing used to key them.
//!
//! Wallets are fixed-width 16 byte identifiers compared byte for byte. Every
//! wallet-keyed map in the crate uses [`WalletHasher`], a djb2 fold over the
//! identifier bytes.

use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::str::FromStr;

use crate::error::WalletIdError;

/// Number of bytes in a wallet identifier.
pub const WALLET_ID_LEN: usize = 16;

/// Maximum number of wallet slots carried by one block.
pub const MAX_WALLETS_PER_BLOCK: usize = 100;

/// Position of a transaction inside the ledger.
pub type TxIndex = usize;

/// Fixed-length wallet identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WalletId([u8; WALLET_ID_LEN]);

impl WalletId {
    pub const fn from_bytes(bytes: [u8; WALLET_ID_LEN]) -> Self { Self(bytes) }

    pub fn as_bytes(&self) -> &[u8; WALLET_ID_LEN] { &self.0 }
}

impl Hash for WalletId {
    // Only the raw bytes, no length prefix.
    fn hash<H: Hasher>(&self, state: &mut H) { state.write(&self.0) }
}

impl TryFrom<&[u8]> for WalletId {
    type Error = WalletIdError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; WALLET_ID_LEN] =
            bytes.try_into().map_err(|_| WalletIdError::InvalidLength(bytes.len()))?;
        Ok(Self(bytes))
    }
}

impl FromStr for WalletId {
    type Err = WalletIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::try_from(s.as_bytes()) }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletId({})", self)
    }
}

const DJB2_SEED: u64 = 5381;

/// djb2 hasher (`h = h * 33 + byte`) kept in 64 bits so the high bits of the
/// hash are populated for the map's control bytes.
#[derive(Debug, Clone, Copy)]
pub struct WalletHasher(u64);

impl Default for WalletHasher {
    fn default() -> Self { Self(DJB2_SEED) }
}

impl Hasher for WalletHasher {
    fn finish(&self) -> u64 { self.0 }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = (self.0 << 5).wrapping_add(self.0).wrapping_add(u64::from(byte));
        }
    }
}

pub type WalletBuildHasher = BuildHasherDefault<WalletHasher>;

/// Hash map keyed by wallet identifier.
pub type WalletMap<V> = HashMap<WalletId, V, WalletBuildHasher>;
