// src/config.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// Worker settings, optionally read from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub log_level: String,
    /// Directory holding the `input_<T>.txt` and `transactions_<T>.txt` files.
    pub data_dir: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self { Self { log_level: "info".to_string(), data_dir: PathBuf::from(".") } }
}

impl WorkerConfig {
    /// Loads the configuration at `path`, or the defaults when no path is
    /// given. Missing keys take their default values.
    pub fn load(path: Option<&Path>) -> Result<Self, SetupError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .map_err(|source| SetupError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&contents)
            .map_err(|e| SetupError::Config { path: path.to_path_buf(), message: e.to_string() })
    }

    pub fn set_log_level(&mut self, log_level: &str) { self.log_level = log_level.to_string(); }

    pub fn set_data_dir(&mut self, data_dir: impl Into<PathBuf>) { self.data_dir = data_dir.into(); }
}

/// Identifies the pair of input files for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestCase(pub i32);

impl TestCase {
    pub fn input_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("input_{}.txt", self.0))
    }

    pub fn ledger_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("transactions_{}.txt", self.0))
    }
}

/// Contents of `input_<T>.txt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputDescriptor {
    /// Informational only; the ledger may parse fewer lines.
    pub total_transaction_count: i64,
    pub num_blocks: usize,
    pub shared_memory_key: i32,
    pub message_queue_key: i32,
}

impl InputDescriptor {
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let contents = fs::read_to_string(path)
            .map_err(|source| SetupError::Read { path: path.to_path_buf(), source })?;
        contents.parse()
    }
}

impl FromStr for InputDescriptor {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split_whitespace();
        let mut next = |name: &'static str| -> Result<i64, SetupError> {
            fields
                .next()
                .and_then(|field| field.parse().ok())
                .ok_or(SetupError::Descriptor(name))
        };

        let total_transaction_count = next("total_transaction_count")?;
        // A negative count means there is nothing to serve.
        let num_blocks = usize::try_from(next("num_blocks")?).unwrap_or(0);
        let shared_memory_key = i32::try_from(next("shared_memory_key")?)
            .map_err(|_| SetupError::Descriptor("shared_memory_key"))?;
        let message_queue_key = i32::try_from(next("message_queue_key")?)
            .map_err(|_| SetupError::Descriptor("message_queue_key"))?;

        Ok(Self { total_transaction_count, num_blocks, shared_memory_key, message_queue_key })
    }
}
