// src/ipc/memory.rs
//! In-process stand-in for the controller's message queue.

use std::collections::VecDeque;

use crate::error::IpcError;
use crate::ipc::{Reply, Request, RequestChannel};

/// Serves queued requests and records replies.
///
/// Once the queue is drained, `receive` fails, which the dispatch loop
/// treats as the controller going away.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    requests: VecDeque<Request>,
    replies: Vec<Reply>,
    fail_replies: bool,
}

impl MemoryChannel {
    pub fn new(requests: impl IntoIterator<Item = Request>) -> Self {
        Self { requests: requests.into_iter().collect(), ..Self::default() }
    }

    /// Makes every `reply` call fail.
    pub fn failing_replies(mut self) -> Self {
        self.fail_replies = true;
        self
    }

    pub fn replies(&self) -> &[Reply] { &self.replies }

    pub fn sums(&self) -> Vec<i64> { self.replies.iter().map(|r| r.sum).collect() }

    /// Requests not yet received.
    pub fn pending(&self) -> usize { self.requests.len() }
}

impl RequestChannel for MemoryChannel {
    fn receive(&mut self) -> Result<Request, IpcError> {
        self.requests
            .pop_front()
            .ok_or_else(|| IpcError::Receive("request queue is empty".to_string()))
    }

    fn reply(&mut self, reply: Reply) -> Result<(), IpcError> {
        if self.fail_replies {
            return Err(IpcError::Send {
                position: self.replies.len(),
                message: "reply queue closed".to_string(),
            });
        }
        self.replies.push(reply);
        Ok(())
    }
}
