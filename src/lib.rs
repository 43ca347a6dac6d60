// ./src/lib.rs

pub mod aggregator;
pub mod block;
pub mod cipher;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod ipc;
pub mod ledger;
pub mod logging;
pub mod membership;
pub mod wallet;
pub mod worker;

pub use aggregator::{aggregate, BlockAggregator};
pub use block::Block;
pub use dispatch::{DispatchOutcome, StopReason};
pub use error::{Error, Result};
pub use ledger::{AdjacencyIndex, Ledger, Transaction};
pub use membership::MembershipSet;
pub use wallet::WalletId;
