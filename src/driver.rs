//! The benchmark sequence.
//!
//! Strictly linear: reset directories, open both engines, generate the
//! dataset once, then load and scan RocksDB, close it, load and scan sled,
//! snapshot the heap, close sled. Every step returns early on error; nothing
//! is retried.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::config::BenchConfig;
use crate::engine::{Engine, RocksStore, ScanOptions, SledStore};
use crate::error::{BenchError, Result};
use crate::gen::{dataset_size, Entry, EntryGenerator};
use crate::profile::{write_heap_snapshot, CpuProfiler};
use crate::report::{write_engine, write_header, write_verification, EngineReport, RunSummary};
use crate::scan::{dataset_key_digest, engine_key_digest, time_scan};

/// Removes `path` with everything under it and creates it again, empty.
pub fn reset_dir(path: &Path) -> Result<()> {
    let setup_err = |source| BenchError::Setup {
        path: path.to_path_buf(),
        source,
    };
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(setup_err(e)),
    }
    fs::create_dir_all(path).map_err(setup_err)
}

/// Loads `entries` into `engine`, then times a key-only scan over it.
///
/// The engine's preparation step (staging a write batch) runs before the
/// clock starts; the load and the scan are timed.
fn bench_engine<E: Engine, W: Write>(
    engine: &E,
    entries: &[Entry],
    verify: bool,
    out: &mut W,
) -> Result<EngineReport> {
    let prepared = engine.prepare(entries);

    info!(engine = engine.name(), entries = entries.len(), "loading");
    let start = Instant::now();
    engine.load(prepared, entries)?;
    let load_time = start.elapsed();

    info!(engine = engine.name(), "scanning");
    let scan = time_scan(engine, &ScanOptions::default())?;
    let total_time = start.elapsed();

    let key_digest = if verify {
        Some(engine_key_digest(engine)?)
    } else {
        None
    };

    let report = EngineReport {
        engine: engine.name(),
        unique_keys: scan.keys,
        load_time,
        scan_time: scan.elapsed,
        total_time,
        key_digest,
    };
    write_engine(out, &report, entries.len())?;
    Ok(report)
}

/// Runs the whole benchmark, writing the report to `out`.
pub fn run<W: Write>(config: &BenchConfig, out: &mut W) -> Result<RunSummary> {
    config.validate()?;
    let cpu_profiler = config
        .cpu_profile
        .as_deref()
        .map(CpuProfiler::start)
        .transpose()?;

    let rocks_dir = config.rocks_dir();
    reset_dir(&rocks_dir)?;
    let rocks = RocksStore::open(&rocks_dir, &config.engine)?;

    let sled_dir = config.sled_dir();
    reset_dir(&sled_dir)?;
    let sled = SledStore::open(&sled_dir, &config.engine)?;

    let seed = config.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        entries = config.num_entries,
        value_size = config.value_size,
        "generating entries"
    );
    let entries = EntryGenerator::seeded(seed, config.value_size, config.key_space())?
        .generate(config.num_entries);
    let dataset_bytes = dataset_size(&entries);
    let expected_digest = config.verify.then(|| dataset_key_digest(&entries));

    write_header(out, config.value_size, entries.len(), dataset_bytes)?;

    let rocks_report = bench_engine(&rocks, &entries, config.verify, out)?;
    rocks.close()?;

    let sled_report = bench_engine(&sled, &entries, config.verify, out)?;
    drop(entries);
    if let Some(path) = &config.mem_profile {
        write_heap_snapshot(path)?;
    }
    sled.close()?;

    let summary = RunSummary {
        entries: config.num_entries,
        value_size: config.value_size,
        dataset_bytes,
        seed,
        engines: vec![rocks_report, sled_report],
        expected_digest,
    };
    write_verification(out, &summary)?;

    if let Some(profiler) = cpu_profiler {
        profiler.finish()?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    const STAGING_DELAY: Duration = Duration::from_millis(300);

    /// Engine whose preparation is slow and whose load is instant.
    struct SlowStaging;

    impl Engine for SlowStaging {
        type Prepared = usize;

        fn name(&self) -> &'static str {
            "SlowStaging"
        }

        fn prepare(&self, entries: &[Entry]) -> usize {
            thread::sleep(STAGING_DELAY);
            entries.len()
        }

        fn load(&self, prepared: usize, entries: &[Entry]) -> Result<()> {
            assert_eq!(prepared, entries.len());
            Ok(())
        }

        fn for_each_key<F: FnMut(&[u8])>(&self, _opts: &ScanOptions, _visit: F) -> Result<usize> {
            Ok(0)
        }

        fn close(self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_preparation_is_not_timed() {
        let entries = vec![Entry::default(); 3];
        let mut out = Vec::new();
        let report = bench_engine(&SlowStaging, &entries, false, &mut out).unwrap();
        assert!(report.load_time < STAGING_DELAY);
        assert!(report.total_time < STAGING_DELAY);
        assert!(String::from_utf8(out).unwrap().starts_with("SlowStaging:\n"));
    }

    #[test]
    fn test_reset_dir_creates_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a").join("b");
        reset_dir(&path).unwrap();
        assert!(path.is_dir());
    }

    #[test]
    fn test_reset_dir_wipes_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rocks");
        fs::create_dir_all(path.join("nested")).unwrap();
        fs::write(path.join("stale.sst"), b"stale").unwrap();
        fs::write(path.join("nested").join("LOG"), b"stale").unwrap();

        reset_dir(&path).unwrap();
        assert!(path.is_dir());
        assert_eq!(fs::read_dir(&path).unwrap().count(), 0);
    }

    #[test]
    fn test_reset_dir_over_a_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let err = reset_dir(&blocker.join("rocks")).unwrap_err();
        assert!(matches!(err, BenchError::Setup { .. }));
    }
}
