// src/cipher.rs
//! Rotation cipher applied to wallet identifiers inside a block.
//!
//! The controller encrypts by rotating an identifier left by `key` positions;
//! decryption rotates right by the same amount. Keys are reduced modulo the
//! identifier length, so negative and oversized keys are valid.

use crate::wallet::{WalletId, WALLET_ID_LEN};

/// Reduces `key` into `[0, WALLET_ID_LEN)`.
pub fn normalize_key(key: i32) -> usize {
    // WALLET_ID_LEN fits in i32, and rem_euclid never returns a negative
    key.rem_euclid(WALLET_ID_LEN as i32) as usize
}

/// Recovers the plaintext identifier: output `i` is input `(i - key) mod 16`.
pub fn decrypt(encrypted: &WalletId, key: i32) -> WalletId {
    let shift = normalize_key(key);
    if shift == 0 {
        return *encrypted;
    }
    let input = encrypted.as_bytes();
    let mut output = [0u8; WALLET_ID_LEN];
    for (i, byte) in output.iter_mut().enumerate() {
        *byte = input[(i + WALLET_ID_LEN - shift) % WALLET_ID_LEN];
    }
    WalletId::from_bytes(output)
}

/// Left rotation by `key`; the inverse of [`decrypt`].
pub fn encrypt(plain: &WalletId, key: i32) -> WalletId {
    let mut output = *plain.as_bytes();
    output.rotate_left(normalize_key(key));
    WalletId::from_bytes(output)
}
