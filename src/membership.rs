// src/membership.rs

use crate::block::Block;
use crate::cipher::decrypt;
use crate::wallet::{WalletId, WalletMap};

/// Decrypted wallets of one block with their occurrence counts.
///
/// Every stored count is at least 1; absent wallets weigh 0.
#[derive(Debug, Clone, Default)]
pub struct MembershipSet {
    counts: WalletMap<u32>,
}

impl MembershipSet {
    pub fn new() -> Self { Self::default() }

    /// Decrypts each populated slot of `block` with `key` and counts it.
    pub fn from_block(block: &Block, key: i32) -> Self {
        let mut set = Self::new();
        for encrypted in block.encrypted_wallets() {
            set.insert(decrypt(&encrypted, key));
        }
        set
    }

    pub fn insert(&mut self, wallet: WalletId) {
        *self.counts.entry(wallet).or_insert(0) += 1;
    }

    pub fn weight(&self, wallet: &WalletId) -> u32 { self.counts.get(wallet).copied().unwrap_or(0) }

    pub fn wallets(&self) -> impl Iterator<Item = &WalletId> { self.counts.keys() }

    /// Number of distinct wallets.
    pub fn len(&self) -> usize { self.counts.len() }

    pub fn is_empty(&self) -> bool { self.counts.is_empty() }
}

impl FromIterator<WalletId> for MembershipSet {
    fn from_iter<I: IntoIterator<Item = WalletId>>(iter: I) -> Self {
        let mut set = Self::new();
        for wallet in iter {
            set.insert(wallet);
        }
        set
    }
}
