// src/dispatch.rs
//! The request loop: one receive, one aggregation, one reply per block.

use crate::aggregator::BlockAggregator;
use crate::error::{IpcError, Result};
use crate::ipc::{BlockSource, Reply, RequestChannel};

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every expected block was served.
    Completed,
    /// The controller sent the termination sentinel.
    Terminated,
    /// The channel stopped delivering requests.
    ReceiveFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub blocks_processed: usize,
    pub stop: StopReason,
}

/// Serves up to `num_blocks` requests, using block `i` for the `i`-th one.
///
/// A receive failure or the sentinel ends the loop normally. A failed reply
/// or a missing block is returned as an error.
pub fn run<S, C>(
    aggregator: &BlockAggregator,
    blocks: &S,
    channel: &mut C,
    num_blocks: usize,
) -> Result<DispatchOutcome>
where
    S: BlockSource + ?Sized,
    C: RequestChannel + ?Sized,
{
    for position in 0..num_blocks {
        let request = match channel.receive() {
            Ok(request) => request,
            Err(e) => {
                log::warn!("Stopping after {} blocks: {}", position, e);
                return Ok(DispatchOutcome { blocks_processed: position, stop: StopReason::ReceiveFailed });
            }
        };
        if request.is_termination() {
            log::info!("Termination requested after {} blocks", position);
            return Ok(DispatchOutcome { blocks_processed: position, stop: StopReason::Terminated });
        }

        let _span = tracing::debug_span!("block", position).entered();
        let block = blocks
            .block(position)
            .ok_or(IpcError::BlockOutOfRange { position, len: blocks.len() })?;
        let sum = aggregator.aggregate(block, request.security_threshold, request.decryption_key);
        tracing::debug!(
            security_threshold = request.security_threshold,
            decryption_key = request.decryption_key,
            sum,
            "block processed"
        );

        channel.reply(Reply { sum }).map_err(|e| match e {
            IpcError::Send { message, .. } => IpcError::Send { position, message },
            other => other,
        })?;
    }

    log::info!("Processed all {} blocks", num_blocks);
    Ok(DispatchOutcome { blocks_processed: num_blocks, stop: StopReason::Completed })
}
