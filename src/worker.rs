// src/worker.rs
//! Setup for one test case: read the descriptor, load and index the ledger.

use crate::aggregator::BlockAggregator;
use crate::config::{InputDescriptor, TestCase, WorkerConfig};
use crate::error::Result;
use crate::ledger::LoadStats;

/// Everything needed before attaching to the controller's IPC resources.
#[derive(Debug)]
pub struct PreparedRun {
    pub descriptor: InputDescriptor,
    pub aggregator: BlockAggregator,
    pub stats: LoadStats,
}

pub fn prepare(config: &WorkerConfig, test_case: TestCase) -> Result<PreparedRun> {
    let descriptor = InputDescriptor::load(&test_case.input_path(&config.data_dir))?;
    log::info!(
        "Test case {}: {} blocks, shm key {}, queue key {}",
        test_case.0,
        descriptor.num_blocks,
        descriptor.shared_memory_key,
        descriptor.message_queue_key
    );

    let (aggregator, stats) = BlockAggregator::from_ledger_file(test_case.ledger_path(&config.data_dir))?;
    if aggregator.ledger().is_empty() {
        log::warn!("Ledger for test case {} holds no transactions; every block sums to 0", test_case.0);
    } else if i64::try_from(stats.parsed).ok() != Some(descriptor.total_transaction_count) {
        log::info!(
            "Descriptor lists {} transactions, ledger yielded {}",
            descriptor.total_transaction_count,
            stats.parsed
        );
    }
    log::debug!("Adjacency index covers {} wallets", aggregator.index().wallet_count());

    Ok(PreparedRun { descriptor, aggregator, stats })
}
