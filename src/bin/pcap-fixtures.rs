//! Generate the capture fixture files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pcap_writer::fixtures::{self, FixtureConfig};
use pcap_writer::{Endianness, Timestamp, TsResolution};

/// Write the pcap files used as test fixtures by packet readers.
#[derive(Parser, Debug)]
#[command(name = "pcap-fixtures")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output directory (created if missing)
    #[arg(value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Snapshot length written in the file headers
    #[arg(long = "snaplen", default_value_t = 65535)]
    snaplen: u32,

    /// Write nanosecond-resolution timestamps
    #[arg(long = "nanosecond")]
    nanosecond: bool,

    /// Write files in big-endian byte order
    #[arg(long = "big-endian")]
    big_endian: bool,

    /// Timestamp of the first frame, in seconds since epoch
    #[arg(long = "timestamp", value_name = "SECS", default_value_t = 0)]
    timestamp: u32,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> FixtureConfig {
        FixtureConfig {
            snaplen: self.snaplen,
            resolution: if self.nanosecond {
                TsResolution::Nanosecond
            } else {
                TsResolution::Microsecond
            },
            endianness: if self.big_endian {
                Endianness::Big
            } else {
                Endianness::Little
            },
            base_timestamp: Timestamp::new(self.timestamp, 0),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let paths = fixtures::generate(&args.dir, &args.config())
        .with_context(|| format!("Failed to generate fixtures in {}", args.dir.display()))?;
    for path in paths {
        println!("{}", path.display());
    }
    Ok(())
}
