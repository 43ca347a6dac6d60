// src/error.rs
//! Error types for the ledger worker
//!
//! Only setup and IPC failures are errors. Malformed ledger lines, malformed
//! block slots, a failed receive and the termination sentinel are handled in
//! place and never surface here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The main error type for the worker
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Errors while preparing a test case
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// Errors on the controller's IPC resources
    #[error(transparent)]
    Ipc(#[from] IpcError),
}

/// Errors that abort the worker before any block is processed
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SetupError {
    /// An input file could not be opened or read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input descriptor is missing a field or holds a non-integer
    #[error("Malformed input descriptor: missing or invalid `{0}`")]
    Descriptor(&'static str),

    /// The worker configuration file could not be parsed
    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },
}

/// Errors on the shared memory segment or the message queue
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IpcError {
    /// The shared memory segment does not exist or is too small
    #[error("Shared memory lookup failed for key {key}: {source}")]
    SharedMemoryGet {
        key: i32,
        #[source]
        source: io::Error,
    },

    /// The segment exists but could not be attached
    #[error("Shared memory attach failed: {0}")]
    SharedMemoryAttach(#[source] io::Error),

    /// The message queue does not exist or is not accessible
    #[error("Message queue lookup failed for key {key}: {source}")]
    QueueOpen {
        key: i32,
        #[source]
        source: io::Error,
    },

    /// No request could be taken from the channel
    #[error("Receive failed: {0}")]
    Receive(String),

    /// A reply could not be delivered after a successful receive
    #[error("Reply for block {position} could not be sent: {message}")]
    Send { position: usize, message: String },

    /// The request loop asked for a block the source does not hold
    #[error("Block {position} is outside the block source ({len} blocks)")]
    BlockOutOfRange { position: usize, len: usize },

    /// IPC is only available on platforms with System V message queues
    #[error("System V IPC is not supported on this platform")]
    Unsupported,
}

/// Errors constructing a wallet identifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WalletIdError {
    #[error("Wallet identifier must be 16 bytes, got {0}")]
    InvalidLength(usize),
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
