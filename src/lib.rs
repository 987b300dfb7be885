//! Write-then-scan throughput of two embedded key-value engines.
//!
//! A run generates a dataset of random fixed-layout keys, loads it into
//! RocksDB through one write batch and into sled through one bulk set, and
//! times a key-only forward scan over each.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod gen;
pub mod profile;
pub mod report;
pub mod scan;

pub use config::{BenchConfig, EngineOptions};
pub use driver::run;
pub use error::{BenchError, Result};
pub use gen::{Entry, EntryGenerator};
