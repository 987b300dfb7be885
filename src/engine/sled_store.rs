use std::hint::black_box;
use std::path::Path;

use tracing::debug;

use super::{Engine, ScanOptions};
use crate::config::EngineOptions;
use crate::error::Result;
use crate::gen::Entry;

/// sled loaded through a single bulk-set call.
pub struct SledStore {
    db: sled::Db,
    sync_writes: bool,
}

impl SledStore {
    pub fn open(path: &Path, options: &EngineOptions) -> Result<Self> {
        let db = sled::Config::new()
            .path(path)
            .mode(sled::Mode::HighThroughput)
            .open()?;
        debug!(path = %path.display(), sync = options.sync_writes, "opened sled");
        Ok(Self {
            db,
            sync_writes: options.sync_writes,
        })
    }

    /// Sets every entry in one atomic call.
    pub fn batch_set(&self, entries: &[Entry]) -> Result<()> {
        let mut batch = sled::Batch::default();
        for entry in entries {
            batch.insert(entry.key.as_slice(), entry.value.as_slice());
        }
        self.db.apply_batch(batch)?;
        if self.sync_writes {
            self.db.flush()?;
        }
        Ok(())
    }
}

impl Engine for SledStore {
    fn name(&self) -> &'static str {
        "Sled"
    }

    /// The bulk set takes the entry slice directly.
    type Prepared = ();

    fn prepare(&self, _entries: &[Entry]) {}

    fn load(&self, _prepared: (), entries: &[Entry]) -> Result<()> {
        self.batch_set(entries)
    }

    fn for_each_key<F: FnMut(&[u8])>(&self, opts: &ScanOptions, mut visit: F) -> Result<usize> {
        let mut count = 0;
        if opts.fetch_values {
            for item in self.db.iter() {
                let (key, value) = item?;
                black_box(&value);
                visit(&key);
                count += 1;
            }
        } else {
            for key in self.db.iter().keys() {
                visit(&key?);
                count += 1;
            }
        }
        Ok(count)
    }

    fn close(self) -> Result<()> {
        let flushed = self.db.flush()?;
        debug!(bytes = flushed, "flushed sled on close");
        Ok(())
    }
}
