use std::hint::black_box;
use std::path::Path;

use rocksdb::{Options, ReadOptions, WriteBatch, WriteOptions, DB};
use tracing::debug;

use super::{Engine, ScanOptions};
use crate::config::EngineOptions;
use crate::error::Result;
use crate::gen::Entry;

const NUM_LEVELS: usize = 7;

/// RocksDB loaded through a single explicit write batch.
pub struct RocksStore {
    db: DB,
    write_opts: WriteOptions,
}

impl RocksStore {
    pub fn open(path: &Path, options: &EngineOptions) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(options.sync_writes);
        debug!(path = %path.display(), sync = options.sync_writes, "opened rocksdb");
        Ok(Self { db, write_opts })
    }

    /// Stages a put per entry into a fresh batch.
    pub fn stage(entries: &[Entry]) -> WriteBatch {
        let mut batch = WriteBatch::default();
        for entry in entries {
            batch.put(&entry.key, &entry.value);
        }
        batch
    }

    /// Submits a staged batch. The batch is consumed by the write and released
    /// when it returns, whether or not it succeeded.
    pub fn submit(&self, batch: WriteBatch) -> Result<()> {
        self.db.write_opt(batch, &self.write_opts)?;
        Ok(())
    }

    /// Number of SST files per level, for the debug log.
    pub fn level_file_counts(&self) -> Result<Vec<u64>> {
        let mut counts = Vec::with_capacity(NUM_LEVELS);
        for n in 0..NUM_LEVELS {
            let files = self
                .db
                .property_int_value(format!("rocksdb.num-files-at-level{}", n).as_str())?
                .unwrap_or(0);
            counts.push(files);
        }
        Ok(counts)
    }
}

impl Engine for RocksStore {
    fn name(&self) -> &'static str {
        "RocksDB"
    }

    type Prepared = WriteBatch;

    fn prepare(&self, entries: &[Entry]) -> WriteBatch {
        Self::stage(entries)
    }

    fn load(&self, batch: WriteBatch, _entries: &[Entry]) -> Result<()> {
        self.submit(batch)?;
        for (level, files) in self.level_file_counts()?.into_iter().enumerate() {
            debug!(level, files, "rocksdb files at level");
        }
        Ok(())
    }

    fn for_each_key<F: FnMut(&[u8])>(&self, opts: &ScanOptions, mut visit: F) -> Result<usize> {
        let mut iter = self.db.raw_iterator_opt(ReadOptions::default());
        let mut count = 0;
        iter.seek_to_first();
        while iter.valid() {
            if let Some(key) = iter.key() {
                visit(key);
            }
            if opts.fetch_values {
                black_box(iter.value());
            }
            count += 1;
            iter.next();
        }
        iter.status()?;
        Ok(count)
    }

    fn close(self) -> Result<()> {
        drop(self.db);
        Ok(())
    }
}
