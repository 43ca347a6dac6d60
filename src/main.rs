use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use ledger_worker::config::{TestCase, WorkerConfig};
use ledger_worker::logging::{init_logger, parse_level_filter};
use ledger_worker::{dispatch, worker, DispatchOutcome};

/// Computes per-block totals for the controller of one test case.
#[derive(Parser)]
#[command(name = "ledger_worker", version)]
struct Cli {
    /// Test case number; selects input_<T>.txt and transactions_<T>.txt
    #[arg(allow_negative_numbers = true)]
    test_case: i32,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory containing the input files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logger(LevelFilter::Info) {
        eprintln!("Failed to install logger: {}", e);
    }
    match run(cli) {
        Ok(outcome) => {
            log::info!("Worker finished: {:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<DispatchOutcome> {
    let mut config = WorkerConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level.as_deref() {
        config.set_log_level(level);
    }
    if let Some(dir) = cli.data_dir {
        config.set_data_dir(dir);
    }
    log::set_max_level(parse_level_filter(&config.log_level));

    let prepared = worker::prepare(&config, TestCase(cli.test_case))
        .with_context(|| format!("Failed to prepare test case {}", cli.test_case))?;
    serve(&prepared)
}

#[cfg(target_os = "linux")]
fn serve(prepared: &worker::PreparedRun) -> Result<DispatchOutcome> {
    use ledger_worker::ipc::sysv::{MessageQueue, SharedBlocks};

    let descriptor = &prepared.descriptor;
    let blocks = SharedBlocks::attach(descriptor.shared_memory_key, descriptor.num_blocks)
        .context("Failed to attach block segment")?;
    let mut queue = MessageQueue::open(descriptor.message_queue_key).context("Failed to open message queue")?;

    let outcome = dispatch::run(&prepared.aggregator, &blocks, &mut queue, descriptor.num_blocks)?;
    Ok(outcome)
}

#[cfg(not(target_os = "linux"))]
fn serve(_prepared: &worker::PreparedRun) -> Result<DispatchOutcome> {
    Err(ledger_worker::error::IpcError::Unsupported.into())
}
