// src/ledger/index.rs

use crate::ledger::{Ledger, Transaction};
use crate::wallet::{TxIndex, WalletId, WalletMap};

/// Maps each wallet to the ledger positions where it is sender or receiver.
///
/// Lists are in ledger order and hold no duplicates: a self-transfer is
/// recorded once. The index only grows while the ledger is being loaded.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    lists: WalletMap<Vec<TxIndex>>,
}

impl AdjacencyIndex {
    pub fn new() -> Self { Self::default() }

    /// Builds the index in one pass over an existing ledger.
    pub fn build(ledger: &Ledger) -> Self {
        let mut index = Self::new();
        for (tx_index, tx) in ledger.iter().enumerate() {
            index.register(tx_index, tx);
        }
        index
    }

    pub(crate) fn register(&mut self, tx_index: TxIndex, tx: &Transaction) {
        self.lists.entry(tx.sender).or_default().push(tx_index);
        if !tx.is_self_transfer() {
            self.lists.entry(tx.receiver).or_default().push(tx_index);
        }
    }

    /// Ledger positions touching `wallet`; empty for an unknown wallet.
    pub fn transactions_of(&self, wallet: &WalletId) -> &[TxIndex] {
        self.lists.get(wallet).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct wallets seen in the ledger.
    pub fn wallet_count(&self) -> usize { self.lists.len() }

    pub fn wallets(&self) -> impl Iterator<Item = &WalletId> { self.lists.keys() }
}
