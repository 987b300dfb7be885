use std::path::PathBuf;

use crate::error::{BenchError, Result};

/// One "keys_mil" unit.
pub const MIL: usize = 1_000_000;

/// Keys are drawn from a space this many times larger than the entry count,
/// so collisions are rare but possible.
pub const KEY_SPACE_FACTOR: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Sync every write to disk. Off for throughput runs.
    pub sync_writes: bool,
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Number of entries generated and loaded into each engine.
    pub num_entries: usize,
    /// Value size in bytes, fixed for the whole run.
    pub value_size: usize,
    /// Root of the engine working directories. Both are wiped at start.
    pub dir: PathBuf,
    /// Seed for key and value generation. Drawn from OS entropy when unset.
    pub seed: Option<u64>,
    pub engine: EngineOptions,
    /// Hash the stored keys of both engines after the timed scans and compare
    /// them against the generated dataset.
    pub verify: bool,
    pub cpu_profile: Option<PathBuf>,
    pub mem_profile: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            num_entries: MIL,
            value_size: 0,
            dir: PathBuf::from("tmp"),
            seed: None,
            engine: EngineOptions::default(),
            verify: false,
            cpu_profile: None,
            mem_profile: None,
        }
    }
}

impl BenchConfig {
    /// Config for `keys_mil` million entries.
    pub fn from_keys_mil(keys_mil: usize) -> Result<Self> {
        let num_entries = keys_mil.checked_mul(MIL).ok_or_else(|| {
            BenchError::Config(format!("keys_mil={} overflows the entry count", keys_mil))
        })?;
        Ok(Self::with_entries(num_entries))
    }

    /// Config for an exact entry count. The key space keeps the same ratio.
    pub fn with_entries(num_entries: usize) -> Self {
        Self {
            num_entries,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_entries == 0 {
            return Err(BenchError::Config(
                "at least one entry must be generated".to_string(),
            ));
        }
        if self.num_entries.checked_mul(KEY_SPACE_FACTOR).is_none() {
            return Err(BenchError::Config(format!(
                "key space for {} entries overflows",
                self.num_entries
            )));
        }
        Ok(())
    }

    /// Upper bound (exclusive) of the random integer embedded in each key.
    pub fn key_space(&self) -> usize {
        self.num_entries.saturating_mul(KEY_SPACE_FACTOR)
    }

    pub fn rocks_dir(&self) -> PathBuf {
        self.dir.join("rocks")
    }

    pub fn sled_dir(&self) -> PathBuf {
        self.dir.join("sled")
    }
}
