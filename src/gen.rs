//! Synthetic entries for the load phase.
//!
//! Keys have a fixed textual layout, `vsz=%05d-k=%010d`, so every key of a
//! run shares the value size prefix and the random part sorts numerically.
//! Values are random bytes of the configured size.

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use crate::error::{BenchError, Result};

/// Length of a generated key while the value size fits in five digits.
pub const KEY_LEN: usize = 22;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub meta: u8,
}

impl Entry {
    /// Scratch entry with a pre-sized key buffer and a zeroed value.
    pub fn with_capacity(key_len: usize, value_size: usize) -> Self {
        Self {
            key: Vec::with_capacity(key_len),
            value: vec![0; value_size],
            meta: 0,
        }
    }
}

pub struct EntryGenerator<R> {
    rng: R,
    value_size: usize,
    key_space: usize,
}

impl EntryGenerator<XorShiftRng> {
    /// Generator whose output is fully determined by `seed`.
    pub fn seeded(seed: u64, value_size: usize, key_space: usize) -> Result<Self> {
        Self::new(XorShiftRng::seed_from_u64(seed), value_size, key_space)
    }
}

impl<R: Rng> EntryGenerator<R> {
    /// Fails when `key_space` is zero: there would be no key to draw.
    pub fn new(rng: R, value_size: usize, key_space: usize) -> Result<Self> {
        if key_space == 0 {
            return Err(BenchError::Config("key space must not be empty".to_string()));
        }
        Ok(Self {
            rng,
            value_size,
            key_space,
        })
    }

    /// Overwrites `entry` in place with a fresh random key and value.
    ///
    /// The key buffer is reallocated at twice the key length when it is too
    /// small; otherwise its capacity is kept.
    pub fn fill_entry(&mut self, entry: &mut Entry) {
        let k = self.rng.gen_range(0..self.key_space);
        let key = format!("vsz={:05}-k={:010}", self.value_size, k);
        if entry.key.capacity() < key.len() {
            entry.key = Vec::with_capacity(2 * key.len());
        }
        entry.key.clear();
        entry.key.extend_from_slice(key.as_bytes());

        entry.value.resize(self.value_size, 0);
        self.rng.fill(entry.value.as_mut_slice());
        entry.meta = 0;
    }

    /// Allocates and fills `count` entries.
    pub fn generate(&mut self, count: usize) -> Vec<Entry> {
        let mut entries: Vec<Entry> = (0..count)
            .map(|_| Entry::with_capacity(KEY_LEN, self.value_size))
            .collect();
        for entry in entries.iter_mut() {
            self.fill_entry(entry);
        }
        entries
    }
}

/// Total key and value bytes handed to each engine.
pub fn dataset_size(entries: &[Entry]) -> u64 {
    entries
        .iter()
        .map(|e| (e.key.len() + e.value.len()) as u64)
        .sum()
}

/// Sorted set of keys an engine should hold after loading `entries`.
pub fn distinct_keys(entries: &[Entry]) -> BTreeSet<&[u8]> {
    entries.iter().map(|e| e.key.as_slice()).collect()
}
