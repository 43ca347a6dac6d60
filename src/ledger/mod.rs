// src/ledger/mod.rs
//! Transaction ledger loaded once from the flat transactions file.
//!
//! Each line reads `timestamp tx_hash sender receiver amount`. Lines that do
//! not parse are dropped without error. Loading also fills the
//! [`AdjacencyIndex`] in the same pass.

pub mod index;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Index;
use std::path::Path;

pub use index::AdjacencyIndex;

use crate::error::SetupError;
use crate::wallet::{TxIndex, WalletId};

/// A single ledger record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub timestamp: i64,
    pub hash: String,
    pub sender: WalletId,
    pub receiver: WalletId,
    pub amount: i64,
    /// Count of leading `'0'` characters in `hash`.
    pub leading_zero_run: u32,
}

impl Transaction {
    pub fn new(
        timestamp: i64,
        hash: impl Into<String>,
        sender: WalletId,
        receiver: WalletId,
        amount: i64,
    ) -> Self {
        let hash = hash.into();
        let leading_zero_run = leading_zero_run(&hash);
        Self { timestamp, hash, sender, receiver, amount, leading_zero_run }
    }

    pub fn is_self_transfer(&self) -> bool { self.sender == self.receiver }

    /// Parses one ledger line. Tokens after the fifth are ignored.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let timestamp = fields.next()?.parse().ok()?;
        let hash = fields.next()?;
        let sender = fields.next()?.parse().ok()?;
        let receiver = fields.next()?.parse().ok()?;
        let amount = fields.next()?.parse().ok()?;
        Some(Self::new(timestamp, hash, sender, receiver, amount))
    }
}

/// Number of consecutive `'0'` characters at the start of `hash`.
pub fn leading_zero_run(hash: &str) -> u32 {
    hash.bytes().take_while(|&b| b == b'0').count() as u32
}

/// Line counts from one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub parsed: usize,
    pub skipped: usize,
}

/// Append-ordered transaction records. A transaction's position is its
/// [`TxIndex`] and never changes once assigned.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self { Self::default() }

    /// Loads the ledger file at `path` and builds its adjacency index.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, AdjacencyIndex, LoadStats), SetupError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|source| SetupError::Read { path: path.to_path_buf(), source })?;
        let loaded = Self::from_reader(BufReader::new(file))
            .map_err(|source| SetupError::Read { path: path.to_path_buf(), source })?;
        log::info!(
            "Loaded {} transactions from {} ({} lines skipped)",
            loaded.2.parsed,
            path.display(),
            loaded.2.skipped
        );
        Ok(loaded)
    }

    /// Reads ledger lines from any buffered source. Bytes that are not valid
    /// UTF-8 are replaced, so they cost at most the line they appear in.
    pub fn from_reader<R: BufRead>(
        mut reader: R,
    ) -> std::io::Result<(Self, AdjacencyIndex, LoadStats)> {
        let mut ledger = Self::new();
        let mut index = AdjacencyIndex::new();
        let mut stats = LoadStats::default();
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;
            let line = String::from_utf8_lossy(&buf);
            match Transaction::parse_line(&line) {
                Some(tx) => {
                    let tx_index = ledger.push(tx);
                    index.register(tx_index, &ledger[tx_index]);
                    stats.parsed += 1;
                }
                None => {
                    log::trace!("Skipping malformed ledger line {}", line_no);
                    stats.skipped += 1;
                }
            }
        }

        Ok((ledger, index, stats))
    }

    /// Appends a record and returns its index.
    pub fn push(&mut self, tx: Transaction) -> TxIndex {
        self.transactions.push(tx);
        self.transactions.len() - 1
    }

    pub fn get(&self, index: TxIndex) -> Option<&Transaction> { self.transactions.get(index) }

    pub fn len(&self) -> usize { self.transactions.len() }

    pub fn is_empty(&self) -> bool { self.transactions.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> { self.transactions.iter() }
}

impl Index<TxIndex> for Ledger {
    type Output = Transaction;

    fn index(&self, index: TxIndex) -> &Transaction { &self.transactions[index] }
}

impl FromIterator<Transaction> for Ledger {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self { transactions: iter.into_iter().collect() }
    }
}
