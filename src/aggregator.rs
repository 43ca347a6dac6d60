// src/aggregator.rs
//! Per-block aggregation over the ledger.
//!
//! A block names a multiset of encrypted wallets. After decryption, every
//! ledger transaction touching one of those wallets is visited once; those
//! whose hash has at least `security_threshold` leading zeros add
//! `amount * weight` to the block total, where the weight is the number of
//! times the sender and/or receiver occur in the block.

use std::collections::HashSet;
use std::path::Path;

use crate::block::Block;
use crate::error::SetupError;
use crate::ledger::{AdjacencyIndex, LoadStats, Ledger, Transaction};
use crate::membership::MembershipSet;
use crate::wallet::TxIndex;

/// Computes the total for one block.
pub fn aggregate(
    block: &Block,
    security_threshold: i32,
    decryption_key: i32,
    ledger: &Ledger,
    index: &AdjacencyIndex,
) -> i64 {
    let membership = MembershipSet::from_block(block, decryption_key);
    let candidates = collect_candidates(&membership, index);

    let mut total: i64 = 0;
    let mut eligible = 0usize;
    for tx_index in candidates.iter().copied() {
        let Some(tx) = ledger.get(tx_index) else { continue };
        if i64::from(tx.leading_zero_run) < i64::from(security_threshold) {
            continue;
        }
        eligible += 1;
        total = total.wrapping_add(contribution(tx, &membership));
    }

    tracing::trace!(
        wallets = membership.len(),
        candidates = candidates.len(),
        eligible,
        total,
        "aggregated block"
    );
    total
}

/// Union of the adjacency lists of every wallet in `membership`, each
/// transaction index at most once, in first-seen order.
pub fn collect_candidates(membership: &MembershipSet, index: &AdjacencyIndex) -> Vec<TxIndex> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for wallet in membership.wallets() {
        for &tx_index in index.transactions_of(wallet) {
            if seen.insert(tx_index) {
                candidates.push(tx_index);
            }
        }
    }
    candidates
}

/// Weighted amount contributed by `tx` under `membership`.
pub fn contribution(tx: &Transaction, membership: &MembershipSet) -> i64 {
    let sender_weight = i64::from(membership.weight(&tx.sender));
    let receiver_weight = i64::from(membership.weight(&tx.receiver));

    let weight = match (sender_weight > 0, receiver_weight > 0) {
        // A self-transfer's receiver is the same wallet; count it once.
        (true, true) if tx.is_self_transfer() => sender_weight,
        (true, true) => sender_weight + receiver_weight,
        (true, false) => sender_weight,
        (false, true) => receiver_weight,
        (false, false) => 0,
    };
    tx.amount.wrapping_mul(weight)
}

/// Ledger and adjacency index loaded once and shared by every block.
#[derive(Debug, Clone, Default)]
pub struct BlockAggregator {
    ledger: Ledger,
    index: AdjacencyIndex,
}

impl BlockAggregator {
    pub fn new(ledger: Ledger) -> Self {
        let index = AdjacencyIndex::build(&ledger);
        Self { ledger, index }
    }

    /// Loads the ledger file and indexes it in the same pass.
    pub fn from_ledger_file(path: impl AsRef<Path>) -> Result<(Self, LoadStats), SetupError> {
        let (ledger, index, stats) = Ledger::load(path)?;
        Ok((Self { ledger, index }, stats))
    }

    pub fn aggregate(&self, block: &Block, security_threshold: i32, decryption_key: i32) -> i64 {
        aggregate(block, security_threshold, decryption_key, &self.ledger, &self.index)
    }

    pub fn ledger(&self) -> &Ledger { &self.ledger }

    pub fn index(&self) -> &AdjacencyIndex { &self.index }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::cipher::encrypt;
    use crate::wallet::WalletId;

    const ALICE: &str = "AAAAAAAAAAAAAAAA";
    const BOB: &str = "BBBBBBBBBBBBBBBB";
    const CAROL: &str = "CCCCCCCCCCCCCCCC";

    fn wallet(s: &str) -> WalletId { s.parse().unwrap() }

    fn tx(hash: &str, sender: &str, receiver: &str, amount: i64) -> Transaction {
        Transaction::new(0, hash, wallet(sender), wallet(receiver), amount)
    }

    fn aggregator(txs: Vec<Transaction>) -> BlockAggregator {
        BlockAggregator::new(txs.into_iter().collect())
    }

    #[test]
    fn test_sender_and_receiver_weights_add() {
        let agg = aggregator(vec![tx("00ab", ALICE, BOB, 100)]);
        let block = Block::from_slots(&[ALICE, BOB]);
        assert_eq!(agg.aggregate(&block, 2, 0), 200);
        assert_eq!(agg.aggregate(&block, 3, 0), 0);
    }

    #[test]
    fn test_duplicate_wallet_doubles_weight() {
        let agg = aggregator(vec![tx("00ab", ALICE, BOB, 100)]);
        let block = Block::from_slots(&[ALICE, ALICE]);
        assert_eq!(agg.aggregate(&block, 0, 0), 200);
    }

    #[test]
    fn test_self_transfer_counted_once() {
        let agg = aggregator(vec![tx("0", ALICE, ALICE, 30)]);
        let block = Block::from_slots(&[ALICE, ALICE, ALICE]);
        assert_eq!(agg.aggregate(&block, 1, 0), 90);
    }

    #[test]
    fn test_transaction_touching_two_block_wallets_visited_once() {
        let agg = aggregator(vec![tx("", ALICE, BOB, 10), tx("", BOB, CAROL, 1)]);
        let membership: MembershipSet = [wallet(ALICE), wallet(BOB)].into_iter().collect();
        let mut candidates = collect_candidates(&membership, agg.index());
        candidates.sort_unstable();
        assert_eq!(candidates, vec![0, 1]);

        let block = Block::from_slots(&[ALICE, BOB]);
        assert_eq!(agg.aggregate(&block, 0, 0), 10 * 2 + 1);
    }

    #[test]
    fn test_encrypted_block_is_decrypted_with_key() {
        let agg = aggregator(vec![tx("000", ALICE, "0123456789abcdef", 7)]);
        let key = -3;
        let hidden = encrypt(&wallet("0123456789abcdef"), key).to_string();
        let block = Block::from_slots(&[hidden.as_str()]);
        assert_eq!(agg.aggregate(&block, 3, key), 7);
        assert_eq!(agg.aggregate(&block, 3, key + 1), 0);
    }

    #[test]
    fn test_malformed_slot_skipped_but_empty_slot_terminates() {
        let agg = aggregator(vec![tx("", ALICE, CAROL, 5), tx("", BOB, CAROL, 1000)]);
        let block = Block::from_slots(&["oops", ALICE, "", BOB]);
        assert_eq!(agg.aggregate(&block, 0, 0), 5);
    }

    #[test]
    fn test_negative_amounts_and_threshold() {
        let agg = aggregator(vec![tx("abc", ALICE, BOB, -40)]);
        let block = Block::from_slots(&[BOB]);
        assert_eq!(agg.aggregate(&block, -1, 0), -40);
        assert_eq!(agg.aggregate(&block, 1, 0), 0);
    }

    #[test]
    fn test_wallet_absent_from_ledger_contributes_nothing() {
        let agg = aggregator(vec![tx("00", ALICE, BOB, 10)]);
        let block = Block::from_slots(&[CAROL]);
        assert_eq!(agg.aggregate(&block, 0, 0), 0);
    }

    #[test]
    fn test_contribution_with_no_member_is_zero() {
        let t = tx("00", ALICE, BOB, 10);
        assert_eq!(contribution(&t, &MembershipSet::new()), 0);
    }

    #[test]
    fn test_overflow_wraps() {
        let agg = aggregator(vec![tx("", ALICE, BOB, i64::MAX)]);
        let block = Block::from_slots(&[ALICE, BOB]);
        assert_eq!(agg.aggregate(&block, 0, 0), i64::MAX.wrapping_mul(2));
    }

    fn ledger_strategy() -> impl Strategy<Value = Vec<(u8, u8, u8, i64)>> {
        prop::collection::vec((0u8..6, 0u8..6, 0u8..5, -1_000i64..1_000), 0..40)
    }

    fn letter_wallet(i: u8) -> WalletId {
        WalletId::from_bytes([b'A' + i; crate::wallet::WALLET_ID_LEN])
    }

    proptest! {
        #[test]
        fn raising_threshold_only_removes_transactions(
            entries in ledger_strategy(),
            members in prop::collection::vec(0u8..6, 0..8),
            threshold in 0i32..5,
        ) {
            // Non-negative amounts keep the total monotone in the eligible set.
            let ledger: Ledger = entries
                .iter()
                .map(|&(s, r, zeros, amount)| {
                    let hash = format!("{}f", "0".repeat(zeros as usize));
                    Transaction::new(0, hash, letter_wallet(s), letter_wallet(r), amount.abs())
                })
                .collect();
            let agg = BlockAggregator::new(ledger);
            let slots: Vec<String> = members.iter().map(|&m| letter_wallet(m).to_string()).collect();
            let block = Block::from_slots(&slots);

            let low = agg.aggregate(&block, threshold, 0);
            let high = agg.aggregate(&block, threshold + 1, 0);
            prop_assert!(high <= low);
        }
    }
}
