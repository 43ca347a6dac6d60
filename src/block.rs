// src/block.rs
//! Block records as the controller lays them out in shared memory.

use std::os::raw::c_int;

use crate::wallet::{WalletId, MAX_WALLETS_PER_BLOCK, WALLET_ID_LEN};

/// Bytes per slot: the identifier plus its NUL terminator.
pub const SLOT_LEN: usize = WALLET_ID_LEN + 1;

/// One block of up to 100 encrypted wallet slots.
///
/// The layout matches the controller's C struct, so a shared memory segment
/// can be viewed directly as `[Block]`. `wallet_count` is written by the
/// controller but not trusted; the populated prefix ends at the first empty
/// slot.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Block {
    pub wallet_count: c_int,
    pub wallet_slots: [[u8; SLOT_LEN]; MAX_WALLETS_PER_BLOCK],
}

const _: () = assert!(std::mem::size_of::<Block>() == 4 + SLOT_LEN * MAX_WALLETS_PER_BLOCK);

/// How a single slot is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A 16-byte encrypted identifier
    Wallet(WalletId),
    /// Non-empty but not 16 bytes long; skipped
    Malformed,
    /// Empty string; ends the block
    End,
}

impl Block {
    pub fn empty() -> Self { Self { wallet_count: 0, wallet_slots: [[0; SLOT_LEN]; MAX_WALLETS_PER_BLOCK] } }

    /// Builds a block from encrypted identifiers. Entries longer than a slot
    /// are truncated and entries past the hundredth are dropped.
    pub fn from_slots<S: AsRef<[u8]>>(slots: &[S]) -> Self {
        let mut block = Self::empty();
        for (dst, src) in block.wallet_slots.iter_mut().zip(slots) {
            let src = src.as_ref();
            let n = src.len().min(SLOT_LEN);
            dst[..n].copy_from_slice(&src[..n]);
        }
        block.wallet_count = slots.len().min(MAX_WALLETS_PER_BLOCK) as c_int;
        block
    }

    /// Bytes of slot `i` up to its first NUL, or `None` past the last slot.
    pub fn slot_bytes(&self, i: usize) -> Option<&[u8]> { self.wallet_slots.get(i).map(terminated) }

    /// Interpretation of slot `i`, or `None` past the last slot.
    pub fn slot(&self, i: usize) -> Option<Slot> { self.wallet_slots.get(i).map(classify) }

    /// Encrypted identifiers of the populated prefix, skipping malformed slots.
    pub fn encrypted_wallets(&self) -> impl Iterator<Item = WalletId> + '_ {
        self.wallet_slots
            .iter()
            .map(classify)
            .take_while(|slot| *slot != Slot::End)
            .filter_map(|slot| match slot {
                Slot::Wallet(wallet) => Some(wallet),
                _ => None,
            })
    }
}

fn terminated(raw: &[u8; SLOT_LEN]) -> &[u8] {
    let len = raw.iter().position(|&b| b == 0).unwrap_or(SLOT_LEN);
    &raw[..len]
}

fn classify(raw: &[u8; SLOT_LEN]) -> Slot {
    let bytes = terminated(raw);
    match WalletId::try_from(bytes) {
        Ok(wallet) => Slot::Wallet(wallet),
        Err(_) if bytes.is_empty() => Slot::End,
        Err(_) => Slot::Malformed,
    }
}

impl Default for Block {
    fn default() -> Self { Self::empty() }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("wallet_count", &self.wallet_count)
            .field("wallets", &self.encrypted_wallets().collect::<Vec<_>>())
            .finish()
    }
}
