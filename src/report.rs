use std::io::{self, Write};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngineReport {
    pub engine: &'static str,
    pub unique_keys: usize,
    pub load_time: Duration,
    pub scan_time: Duration,
    /// Load plus scan.
    pub total_time: Duration,
    /// Present when the run verifies stored keys.
    pub key_digest: Option<blake3::Hash>,
}

impl EngineReport {
    pub fn load_throughput(&self, entries: usize) -> f64 {
        let secs = self.load_time.as_secs_f64();
        if secs > 0.0 {
            entries as f64 / secs
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub entries: usize,
    pub value_size: usize,
    pub dataset_bytes: u64,
    pub seed: u64,
    pub engines: Vec<EngineReport>,
    /// Digest of the distinct generated keys, when verifying.
    pub expected_digest: Option<blake3::Hash>,
}

impl RunSummary {
    /// `None` unless the run verified keys.
    pub fn digests_match(&self) -> Option<bool> {
        let expected = self.expected_digest?;
        Some(
            self.engines
                .iter()
                .all(|e| e.key_digest == Some(expected)),
        )
    }
}

pub fn write_header<W: Write>(
    out: &mut W,
    value_size: usize,
    entries: usize,
    dataset_bytes: u64,
) -> io::Result<()> {
    writeln!(out, "Value size: {}", value_size)?;
    writeln!(out, "Entries: {}", entries)?;
    writeln!(out, "Dataset size: {}", bytesize::to_string(dataset_bytes, true))
}

pub fn write_engine<W: Write>(out: &mut W, report: &EngineReport, entries: usize) -> io::Result<()> {
    writeln!(out, "{}:", report.engine)?;
    writeln!(out, "Load time: {:?}", report.load_time)?;
    writeln!(
        out,
        "Load throughput: {:.0} entries/s",
        report.load_throughput(entries)
    )?;
    writeln!(out, "Num unique keys: {}", report.unique_keys)?;
    writeln!(out, "Iteration time: {:?}", report.scan_time)?;
    writeln!(out, "Total time: {:?}", report.total_time)?;
    if let Some(digest) = &report.key_digest {
        writeln!(out, "Key digest: {}", digest.to_hex())?;
    }
    Ok(())
}

pub fn write_verification<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    if let (Some(expected), Some(matched)) = (&summary.expected_digest, summary.digests_match()) {
        writeln!(out, "Expected key digest: {}", expected.to_hex())?;
        writeln!(out, "Key digests match: {}", matched)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(digest: Option<blake3::Hash>) -> EngineReport {
        EngineReport {
            engine: "RocksDB",
            unique_keys: 990,
            load_time: Duration::from_millis(500),
            scan_time: Duration::from_millis(20),
            total_time: Duration::from_millis(520),
            key_digest: digest,
        }
    }

    #[test]
    fn test_engine_block_layout() {
        let mut out = Vec::new();
        write_engine(&mut out, &report(None), 1_000).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "RocksDB:",
                "Load time: 500ms",
                "Load throughput: 2000 entries/s",
                "Num unique keys: 990",
                "Iteration time: 20ms",
                "Total time: 520ms",
            ]
        );
    }

    #[test]
    fn test_digests_match() {
        let expected = blake3::hash(b"keys");
        let mut summary = RunSummary {
            entries: 1_000,
            value_size: 0,
            dataset_bytes: 22_000,
            seed: 1,
            engines: vec![report(Some(expected)), report(Some(expected))],
            expected_digest: None,
        };
        assert_eq!(summary.digests_match(), None);

        summary.expected_digest = Some(expected);
        assert_eq!(summary.digests_match(), Some(true));

        summary.engines[1].key_digest = Some(blake3::hash(b"other"));
        assert_eq!(summary.digests_match(), Some(false));
    }

    #[test]
    fn test_zero_load_time_throughput() {
        let mut r = report(None);
        r.load_time = Duration::ZERO;
        assert_eq!(r.load_throughput(10), 0.0);
    }
}
