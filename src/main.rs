use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use rw_bench::{BenchConfig, EngineOptions};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Compare write-then-scan throughput of RocksDB and sled
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// How many million keys to write.
    #[arg(long = "keys_mil", default_value_t = 1)]
    keys_mil: usize,

    /// Value size in bytes.
    #[arg(long = "valsz", default_value_t = 0)]
    valsz: usize,

    /// Write a CPU profile to this file (flamegraph if it ends in .svg).
    #[arg(long)]
    cpuprofile: Option<PathBuf>,

    /// Write a heap snapshot to this file after the run.
    #[arg(long)]
    memprofile: Option<PathBuf>,

    /// Directory holding the engines' working directories.
    #[arg(long, default_value = "tmp")]
    dir: PathBuf,

    /// Seed for key and value generation.
    #[arg(long)]
    seed: Option<u64>,

    /// Sync writes to disk.
    #[arg(long = "sync_writes")]
    sync_writes: bool,

    /// Check both engines hold exactly the generated key set.
    #[arg(long)]
    verify: bool,
}

impl Args {
    fn into_config(self) -> rw_bench::Result<BenchConfig> {
        let mut config = BenchConfig::from_keys_mil(self.keys_mil)?;
        config.value_size = self.valsz;
        config.dir = self.dir;
        config.seed = self.seed;
        config.engine = EngineOptions {
            sync_writes: self.sync_writes,
        };
        config.verify = self.verify;
        config.cpu_profile = self.cpuprofile;
        config.mem_profile = self.memprofile;
        Ok(config)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = execute(Args::parse()) {
        error!("{}", err);
        process::exit(1);
    }
}

fn execute(args: Args) -> rw_bench::Result<()> {
    let config = args.into_config()?;
    rw_bench::run(&config, &mut io::stdout().lock())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rw_bench::BenchError;

    #[test]
    fn test_flags_and_defaults() {
        let args = Args::try_parse_from([
            "rw-bench",
            "--keys_mil",
            "2",
            "--valsz",
            "100",
            "--memprofile",
            "m.prof",
        ])
        .unwrap();
        assert_eq!(args.keys_mil, 2);
        assert_eq!(args.valsz, 100);
        assert_eq!(args.cpuprofile, None);
        assert_eq!(args.dir, PathBuf::from("tmp"));
        assert_eq!(args.seed, None);
        assert!(!args.sync_writes);
        assert!(!args.verify);

        let config = args.into_config().unwrap();
        assert_eq!(config.num_entries, 2_000_000);
        assert_eq!(config.value_size, 100);
        assert_eq!(config.mem_profile, Some(PathBuf::from("m.prof")));
        assert_eq!(config.cpu_profile, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_every_flag_reaches_the_config() {
        let args = Args::try_parse_from([
            "rw-bench",
            "--cpuprofile",
            "cpu.svg",
            "--dir",
            "/scratch/bench",
            "--seed",
            "77",
            "--sync_writes",
            "--verify",
        ])
        .unwrap();
        let config = args.into_config().unwrap();
        assert_eq!(config.num_entries, 1_000_000);
        assert_eq!(config.value_size, 0);
        assert_eq!(config.cpu_profile, Some(PathBuf::from("cpu.svg")));
        assert_eq!(config.dir, PathBuf::from("/scratch/bench"));
        assert_eq!(config.seed, Some(77));
        assert!(config.engine.sync_writes);
        assert!(config.verify);
    }

    #[test]
    fn test_unknown_and_malformed_flags_are_rejected() {
        assert!(Args::try_parse_from(["rw-bench", "--keys-mil", "2"]).is_err());
        assert!(Args::try_parse_from(["rw-bench", "--valsz", "big"]).is_err());
    }

    #[test]
    fn test_zero_keys_is_a_config_error() {
        let args = Args::try_parse_from(["rw-bench", "--keys_mil", "0"]).unwrap();
        let config = args.into_config().unwrap();
        assert!(matches!(config.validate(), Err(BenchError::Config(_))));

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("bench");
        let args = Args::try_parse_from([
            "rw-bench",
            "--keys_mil",
            "0",
            "--dir",
            root.to_str().unwrap(),
        ])
        .unwrap();
        assert!(matches!(execute(args), Err(BenchError::Config(_))));
        assert!(!root.exists());
    }
}
