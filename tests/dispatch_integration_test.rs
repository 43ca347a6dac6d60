use std::fs;

use anyhow::Result;
use ledger_worker::cipher::encrypt;
use ledger_worker::config::{TestCase, WorkerConfig};
use ledger_worker::dispatch;
use ledger_worker::error::{Error, IpcError};
use ledger_worker::ipc::memory::MemoryChannel;
use ledger_worker::ipc::Request;
use ledger_worker::worker;
use ledger_worker::{Block, StopReason, WalletId};

const ALICE: &str = "AAAAAAAAAAAAAAAA";
const BOB: &str = "BBBBBBBBBBBBBBBB";
const CAROL: &str = "CAROLCAROLCAROL1";
const DAVE: &str = "DAVE0000DAVE0000";

fn write_test_case(dir: &std::path::Path, case: i32, num_blocks: usize) -> Result<()> {
    let ledger = format!(
        "1700000001 00ab {ALICE} {BOB} 100\n\
         1700000002 000c {BOB} {CAROL} 40\n\
         1700000003 0fff {CAROL} {CAROL} 7\n\
         this line is not a transaction\n\
         1700000004 ffff {DAVE} {ALICE} 1000\n\
         1700000005 0000 {CAROL} {DAVE} -5\n"
    );
    fs::write(dir.join(format!("transactions_{case}.txt")), ledger)?;
    fs::write(dir.join(format!("input_{case}.txt")), format!("6 {num_blocks} 4242 4343\n"))?;
    Ok(())
}

fn encrypted_block(wallets: &[&str], key: i32) -> Block {
    let slots: Vec<String> = wallets
        .iter()
        .map(|w| encrypt(&w.parse::<WalletId>().unwrap(), key).to_string())
        .collect();
    Block::from_slots(&slots)
}

#[test]
fn test_e2e_blocks_through_dispatch_loop() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_test_case(dir.path(), 1, 4)?;

    let mut config = WorkerConfig::default();
    config.set_data_dir(dir.path());
    let prepared = worker::prepare(&config, TestCase(1))?;
    assert_eq!(prepared.stats.parsed, 5);
    assert_eq!(prepared.stats.skipped, 1);
    assert_eq!(prepared.descriptor.num_blocks, 4);

    let blocks = vec![
        // Both ends of the first transfer; BOB also pulls in BOB -> CAROL.
        encrypted_block(&[ALICE, BOB], 0),
        // CAROL twice under a rotated key.
        encrypted_block(&[CAROL, CAROL], 11),
        // DAVE's only eligible transfer at threshold 4 is the negative one.
        encrypted_block(&[DAVE, ALICE], -6),
        encrypted_block(&[BOB], 3),
    ];
    let mut channel = MemoryChannel::new([
        Request::new(2, 0),
        Request::new(1, 11),
        Request::new(4, -6),
        Request::new(0, 3),
    ]);

    let outcome = dispatch::run(&prepared.aggregator, &blocks, &mut channel, prepared.descriptor.num_blocks)?;
    assert_eq!(outcome.stop, StopReason::Completed);
    assert_eq!(outcome.blocks_processed, 4);

    // Block 0: 100 * (1 + 1) + 40 * 1.
    // Block 1: 40 * 2 + 7 * 2 + (-5) * 2.
    // Block 2: only the `0000` hash passes; receiver DAVE weighs 1.
    // Block 3: 100 * 1 + 40 * 1.
    assert_eq!(channel.sums(), vec![240, 84, -5, 140]);
    Ok(())
}

#[test]
fn test_e2e_sentinel_ends_run_early() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_test_case(dir.path(), 2, 3)?;

    let mut config = WorkerConfig::default();
    config.set_data_dir(dir.path());
    let prepared = worker::prepare(&config, TestCase(2))?;

    let blocks = vec![encrypted_block(&[ALICE], 5), encrypted_block(&[BOB], 5), Block::empty()];
    let mut channel = MemoryChannel::new([Request::new(2, 5), Request::TERMINATE]);

    let outcome = dispatch::run(&prepared.aggregator, &blocks, &mut channel, 3)?;
    assert_eq!(outcome.stop, StopReason::Terminated);
    assert_eq!(outcome.blocks_processed, 1);
    assert_eq!(channel.sums(), vec![100]);
    Ok(())
}

#[test]
fn test_e2e_raising_threshold_never_adds() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_test_case(dir.path(), 3, 1)?;

    let mut config = WorkerConfig::default();
    config.set_data_dir(dir.path());
    let prepared = worker::prepare(&config, TestCase(3))?;

    let block = encrypted_block(&[ALICE, BOB], 0);
    let totals: Vec<i64> = (0..6).map(|t| prepared.aggregator.aggregate(&block, t, 0)).collect();
    assert_eq!(totals, vec![1240, 240, 240, 40, 0, 0]);
    Ok(())
}

#[test]
fn test_e2e_receive_failure_ends_run_cleanly() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_test_case(dir.path(), 4, 3)?;

    let mut config = WorkerConfig::default();
    config.set_data_dir(dir.path());
    let prepared = worker::prepare(&config, TestCase(4))?;

    let blocks = vec![encrypted_block(&[BOB], 1), encrypted_block(&[ALICE], 1), Block::empty()];
    // The controller delivers two requests and then goes away.
    let mut channel = MemoryChannel::new([Request::new(0, 1), Request::new(2, 1)]);

    let outcome = dispatch::run(&prepared.aggregator, &blocks, &mut channel, prepared.descriptor.num_blocks)?;
    assert_eq!(outcome.stop, StopReason::ReceiveFailed);
    assert_eq!(outcome.blocks_processed, 2);
    assert_eq!(channel.sums(), vec![140, 100]);
    Ok(())
}

#[test]
fn test_e2e_reply_failure_is_fatal() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_test_case(dir.path(), 5, 2)?;

    let mut config = WorkerConfig::default();
    config.set_data_dir(dir.path());
    let prepared = worker::prepare(&config, TestCase(5))?;

    let blocks = vec![encrypted_block(&[ALICE, BOB], 0), encrypted_block(&[BOB], 0)];
    let mut channel = MemoryChannel::new([Request::new(2, 0), Request::new(0, 0)]).failing_replies();

    let err = dispatch::run(&prepared.aggregator, &blocks, &mut channel, 2).unwrap_err();
    assert!(matches!(err, Error::Ipc(IpcError::Send { position: 0, .. })));
    assert!(channel.replies().is_empty());
    Ok(())
}
