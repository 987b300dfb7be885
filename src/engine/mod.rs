//! The two engines under comparison, behind the minimal shape the benchmark
//! needs: open, load everything at once, walk the keys in order, close.

use crate::error::Result;
use crate::gen::Entry;

pub mod rocks;
pub mod sled_store;

pub use rocks::RocksStore;
pub use sled_store::SledStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Read each value alongside its key. Off for key-count scans.
    pub fetch_values: bool,
}

pub trait Engine {
    /// Label used in the printed report.
    fn name(&self) -> &'static str;

    /// Whatever the engine builds from the entries before the timed write,
    /// e.g. a write batch with every put staged.
    type Prepared;

    /// Untimed preparation step ahead of `load`.
    fn prepare(&self, entries: &[Entry]) -> Self::Prepared;

    /// Submits every entry as one unit. Later duplicates overwrite earlier ones.
    fn load(&self, prepared: Self::Prepared, entries: &[Entry]) -> Result<()>;

    /// `prepare` followed by `load`.
    fn load_all(&self, entries: &[Entry]) -> Result<()> {
        let prepared = self.prepare(entries);
        self.load(prepared, entries)
    }

    /// Walks the key space from the first key to the end, calling `visit`
    /// with each key. Returns the number of keys visited.
    fn for_each_key<F: FnMut(&[u8])>(&self, opts: &ScanOptions, visit: F) -> Result<usize>;

    fn close(self) -> Result<()>
    where
        Self: Sized;
}
