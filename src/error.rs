use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every failure the harness can hit. None of them are retried: the driver
/// stops at the first one and the binary exits with a non-zero status.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not reset directory {}: {source}", .path.display())]
    Setup { path: PathBuf, source: io::Error },

    #[error("rocksdb: {0}")]
    Rocks(#[from] rocksdb::Error),

    #[error("sled: {0}")]
    Sled(#[from] sled::Error),

    #[error("profiling: {0}")]
    Profile(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;
