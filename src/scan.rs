use std::hint::black_box;
use std::time::{Duration, Instant};

use crate::engine::{Engine, ScanOptions};
use crate::error::Result;
use crate::gen::{distinct_keys, Entry};

#[derive(Debug, Clone, Copy)]
pub struct ScanTiming {
    /// Keys physically stored, after duplicates collapsed on insert.
    pub keys: usize,
    pub elapsed: Duration,
}

/// Times a full forward scan, from iterator creation to exhaustion.
pub fn time_scan<E: Engine>(engine: &E, opts: &ScanOptions) -> Result<ScanTiming> {
    let start = Instant::now();
    let keys = engine.for_each_key(opts, |key| {
        black_box(key);
    })?;
    Ok(ScanTiming {
        keys,
        elapsed: start.elapsed(),
    })
}

/// Order-sensitive hash over a sequence of keys.
pub struct KeyDigest {
    hasher: blake3::Hasher,
    keys: usize,
}

impl Default for KeyDigest {
    fn default() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
            keys: 0,
        }
    }
}

impl KeyDigest {
    pub fn update(&mut self, key: &[u8]) {
        // Length prefix keeps ["ab", "c"] and ["a", "bc"] apart.
        self.hasher.update(&(key.len() as u64).to_le_bytes());
        self.hasher.update(key);
        self.keys += 1;
    }

    pub fn keys(&self) -> usize {
        self.keys
    }

    pub fn finalize(&self) -> blake3::Hash {
        self.hasher.finalize()
    }
}

/// Digest of every key stored in `engine`, in scan order. Not timed.
pub fn engine_key_digest<E: Engine>(engine: &E) -> Result<blake3::Hash> {
    let mut digest = KeyDigest::default();
    engine.for_each_key(&ScanOptions::default(), |key| digest.update(key))?;
    Ok(digest.finalize())
}

/// Digest an engine loaded with `entries` is expected to report.
pub fn dataset_key_digest(entries: &[Entry]) -> blake3::Hash {
    let mut digest = KeyDigest::default();
    for key in distinct_keys(entries) {
        digest.update(key);
    }
    digest.finalize()
}
