//! Optional CPU and heap profiles around a benchmark run.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use pprof::protos::Message;
use tikv_jemalloc_ctl::{epoch, stats};
use tracing::info;

use crate::error::{BenchError, Result};

/// Samples per second.
const CPU_FREQUENCY: i32 = 100;

/// Samples CPU stacks from `start` until `finish`.
///
/// The report is written as a pprof protobuf, or as a flamegraph when the
/// path ends in `.svg`. The file is only created once the report is built,
/// so a run that fails midway leaves nothing behind.
pub struct CpuProfiler {
    guard: pprof::ProfilerGuard<'static>,
    path: PathBuf,
}

impl CpuProfiler {
    pub fn start(path: &Path) -> Result<Self> {
        let guard = pprof::ProfilerGuard::new(CPU_FREQUENCY)
            .map_err(|e| BenchError::Profile(format!("could not start CPU profile: {}", e)))?;
        info!(path = %path.display(), "cpu profiling started");
        Ok(Self {
            guard,
            path: path.to_path_buf(),
        })
    }

    pub fn finish(self) -> Result<()> {
        let report = self
            .guard
            .report()
            .build()
            .map_err(|e| BenchError::Profile(format!("could not build CPU report: {}", e)))?;
        drop(self.guard);

        let file = File::create(&self.path).map_err(|e| {
            BenchError::Profile(format!(
                "could not create CPU profile {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let mut writer = BufWriter::new(file);
        if self.path.extension().map_or(false, |ext| ext == "svg") {
            report
                .flamegraph(&mut writer)
                .map_err(|e| BenchError::Profile(format!("could not write flamegraph: {}", e)))?;
        } else {
            let profile = report
                .pprof()
                .map_err(|e| BenchError::Profile(format!("could not encode CPU profile: {}", e)))?;
            let mut content = Vec::new();
            profile
                .write_to_vec(&mut content)
                .map_err(|e| BenchError::Profile(format!("could not encode CPU profile: {}", e)))?;
            writer.write_all(&content)?;
        }
        writer.flush()?;
        info!(path = %self.path.display(), "cpu profile written");
        Ok(())
    }
}

fn jemalloc_error(e: tikv_jemalloc_ctl::Error) -> BenchError {
    BenchError::Profile(format!("could not read allocator stats: {}", e))
}

/// Writes a snapshot of the allocator's statistics to `path`.
///
/// Stats are only meaningful when jemalloc is the global allocator, which the
/// binary sets up.
pub fn write_heap_snapshot(path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        BenchError::Profile(format!("could not create memory profile {}: {}", path.display(), e))
    })?;

    // jemalloc caches its counters; advancing the epoch refreshes them.
    epoch::advance().map_err(jemalloc_error)?;
    let snapshot = [
        ("allocated", stats::allocated::read().map_err(jemalloc_error)?),
        ("active", stats::active::read().map_err(jemalloc_error)?),
        ("metadata", stats::metadata::read().map_err(jemalloc_error)?),
        ("resident", stats::resident::read().map_err(jemalloc_error)?),
        ("mapped", stats::mapped::read().map_err(jemalloc_error)?),
        ("retained", stats::retained::read().map_err(jemalloc_error)?),
    ];

    let mut writer = BufWriter::new(file);
    writeln!(writer, "# heap snapshot (jemalloc stats, bytes)")?;
    for (name, bytes) in snapshot {
        writeln!(
            writer,
            "{}: {} ({})",
            name,
            bytes,
            bytesize::to_string(bytes as u64, true)
        )?;
    }
    writer.flush()?;
    info!(path = %path.display(), "memory profile written");
    Ok(())
}
