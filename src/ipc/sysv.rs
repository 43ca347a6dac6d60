// src/ipc/sysv.rs
//! System V shared memory and message queue created by the controller.

use std::io;
use std::mem;
use std::os::raw::{c_int, c_long, c_void};
use std::ptr;
use std::slice;

use crate::block::Block;
use crate::error::IpcError;
use crate::ipc::{BlockSource, Reply, Request, RequestChannel, REPLY_MESSAGE_TYPE, REQUEST_MESSAGE_TYPE};

const IPC_PERMISSIONS: c_int = 0o666;

/// Read-only attachment of the controller's block array.
#[derive(Debug)]
pub struct SharedBlocks {
    base: *const Block,
    len: usize,
}

impl SharedBlocks {
    /// Looks up the segment for `key`, sized for `num_blocks` blocks, and
    /// attaches it read-only.
    pub fn attach(key: i32, num_blocks: usize) -> Result<Self, IpcError> {
        let size = mem::size_of::<Block>() * num_blocks;
        let id = unsafe { libc::shmget(key as libc::key_t, size, IPC_PERMISSIONS) };
        if id == -1 {
            return Err(IpcError::SharedMemoryGet { key, source: io::Error::last_os_error() });
        }

        let addr = unsafe { libc::shmat(id, ptr::null(), libc::SHM_RDONLY) };
        if addr as isize == -1 {
            return Err(IpcError::SharedMemoryAttach(io::Error::last_os_error()));
        }

        log::debug!("Attached shared memory id {} ({} bytes)", id, size);
        Ok(Self { base: addr as *const Block, len: num_blocks })
    }

    pub fn as_slice(&self) -> &[Block] {
        if self.len == 0 {
            return &[];
        }
        // The segment holds at least `len` blocks (shmget checked the size),
        // stays mapped until drop, and any byte pattern is a valid `Block`.
        unsafe { slice::from_raw_parts(self.base, self.len) }
    }
}

impl BlockSource for SharedBlocks {
    fn len(&self) -> usize { self.len }

    fn block(&self, position: usize) -> Option<&Block> { self.as_slice().get(position) }
}

impl Drop for SharedBlocks {
    fn drop(&mut self) {
        if unsafe { libc::shmdt(self.base as *const c_void) } == -1 {
            log::warn!("Shared memory detach failed: {}", io::Error::last_os_error());
        }
    }
}

#[repr(C)]
struct RequestMessage {
    mtype: c_long,
    security_threshold: c_int,
    decryption_key: c_int,
}

#[repr(C)]
struct ReplyMessage {
    mtype: c_long,
    sum: c_long,
}

const REQUEST_PAYLOAD_LEN: usize = mem::size_of::<RequestMessage>() - mem::size_of::<c_long>();
const REPLY_PAYLOAD_LEN: usize = mem::size_of::<ReplyMessage>() - mem::size_of::<c_long>();

/// The controller's request/reply queue.
#[derive(Debug)]
pub struct MessageQueue {
    id: c_int,
    replies_sent: usize,
}

impl MessageQueue {
    pub fn open(key: i32) -> Result<Self, IpcError> {
        let id = unsafe { libc::msgget(key as libc::key_t, IPC_PERMISSIONS) };
        if id == -1 {
            return Err(IpcError::QueueOpen { key, source: io::Error::last_os_error() });
        }
        log::debug!("Opened message queue id {}", id);
        Ok(Self { id, replies_sent: 0 })
    }
}

impl RequestChannel for MessageQueue {
    fn receive(&mut self) -> Result<Request, IpcError> {
        let mut message = RequestMessage { mtype: 0, security_threshold: 0, decryption_key: 0 };
        let received = unsafe {
            libc::msgrcv(
                self.id,
                &mut message as *mut RequestMessage as *mut c_void,
                REQUEST_PAYLOAD_LEN,
                REQUEST_MESSAGE_TYPE as c_long,
                0,
            )
        };
        if received == -1 {
            return Err(IpcError::Receive(io::Error::last_os_error().to_string()));
        }
        Ok(Request::new(message.security_threshold, message.decryption_key))
    }

    fn reply(&mut self, reply: Reply) -> Result<(), IpcError> {
        let message = ReplyMessage { mtype: REPLY_MESSAGE_TYPE as c_long, sum: reply.sum as c_long };
        let status = unsafe {
            libc::msgsnd(
                self.id,
                &message as *const ReplyMessage as *const c_void,
                REPLY_PAYLOAD_LEN,
                0,
            )
        };
        if status == -1 {
            return Err(IpcError::Send {
                position: self.replies_sent,
                message: io::Error::last_os_error().to_string(),
            });
        }
        self.replies_sent += 1;
        Ok(())
    }
}
