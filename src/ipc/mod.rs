// src/ipc/mod.rs
//! Capabilities the worker needs from the controller.
//!
//! The dispatch loop only sees a read-only [`BlockSource`] and a
//! request/reply [`RequestChannel`]. The System V segment and queue in
//! [`sysv`] implement them for production; [`memory`] holds in-process fakes.

pub mod memory;
#[cfg(target_os = "linux")]
pub mod sysv;

use crate::block::Block;
use crate::error::IpcError;

/// Message type tag of a reply.
pub const REPLY_MESSAGE_TYPE: i64 = 1;
/// Message type tag of a request.
pub const REQUEST_MESSAGE_TYPE: i64 = 2;

/// Processing parameters for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub security_threshold: i32,
    pub decryption_key: i32,
}

impl Request {
    /// The controller's stop signal.
    pub const TERMINATE: Request = Request { security_threshold: -1, decryption_key: -1 };

    pub fn new(security_threshold: i32, decryption_key: i32) -> Self {
        Self { security_threshold, decryption_key }
    }

    pub fn is_termination(&self) -> bool { *self == Self::TERMINATE }
}

/// Result for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub sum: i64,
}

/// Random-access, read-only view of the blocks.
pub trait BlockSource {
    fn len(&self) -> usize;

    fn block(&self, position: usize) -> Option<&Block>;

    fn is_empty(&self) -> bool { self.len() == 0 }
}

impl BlockSource for [Block] {
    fn len(&self) -> usize { <[Block]>::len(self) }

    fn block(&self, position: usize) -> Option<&Block> { self.get(position) }
}

impl BlockSource for Vec<Block> {
    fn len(&self) -> usize { self.as_slice().len() }

    fn block(&self, position: usize) -> Option<&Block> { self.get(position) }
}

/// Strictly alternating request/reply channel.
pub trait RequestChannel {
    /// Blocks until the next request arrives.
    fn receive(&mut self) -> Result<Request, IpcError>;

    fn reply(&mut self, reply: Reply) -> Result<(), IpcError>;
}

impl<C: RequestChannel + ?Sized> RequestChannel for &mut C {
    fn receive(&mut self) -> Result<Request, IpcError> { (**self).receive() }

    fn reply(&mut self, reply: Reply) -> Result<(), IpcError> { (**self).reply(reply) }
}
