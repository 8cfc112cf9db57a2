//! Command line argument parsing for the specsearch CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::index::IndexKind;

/// specsearch - k-nearest-neighbor similarity search over embedded spectra
#[derive(Parser, Debug, Clone)]
#[command(name = "specsearch")]
#[command(about = "k-nearest-neighbor similarity search over embedded spectra")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SpecSearchArgs {
    /// Verbosity level (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format for reports
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SpecSearchArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Report output formats.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Human,
    /// JSON
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build an index from a vectors file
    #[command(name = "build-index")]
    BuildIndex(BuildIndexArgs),

    /// Search a prebuilt index with a file of query vectors
    Search(SearchArgs),

    /// Show index statistics
    Stats(StatsArgs),
}

/// Index kinds selectable on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTypeArg {
    /// Exact brute-force index
    Flat,
    /// Approximate IVF-style index
    Partitioned,
}

impl From<IndexTypeArg> for IndexKind {
    fn from(arg: IndexTypeArg) -> Self {
        match arg {
            IndexTypeArg::Flat => IndexKind::Flat,
            IndexTypeArg::Partitioned => IndexKind::Partitioned,
        }
    }
}

/// Arguments for building an index
#[derive(Parser, Debug, Clone)]
pub struct BuildIndexArgs {
    /// Input vectors file (.h5, .npy or .txt)
    #[arg(short = 'i', long = "input", value_name = "VECTORS_FILE")]
    pub input: PathBuf,

    /// Index type to build
    #[arg(long = "index-type", default_value = "flat")]
    pub index_type: IndexTypeArg,

    /// Number of clusters (partitioned only; default scales with corpus size)
    #[arg(long)]
    pub clusters: Option<usize>,

    /// Default number of clusters probed per query (partitioned only)
    #[arg(long, default_value = "1")]
    pub nprobe: usize,

    /// Random seed for reproducible training
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Output index file
    #[arg(short = 'o', long = "output", value_name = "INDEX_FILE")]
    pub output: PathBuf,
}

/// Arguments for searching an index
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Prebuilt index file
    #[arg(long = "index-file", value_name = "INDEX_FILE")]
    pub index_file: PathBuf,

    /// Input embedded spectra file (.h5, .npy or .txt)
    #[arg(short = 'i', long = "input-embedded-spectra", value_name = "VECTORS_FILE")]
    pub input: PathBuf,

    /// k for kNN
    #[arg(long, default_value = "5")]
    pub k: usize,

    /// Override the number of probed clusters (partitioned indexes only)
    #[arg(long)]
    pub nprobe: Option<usize>,

    /// Output results file (should have extension .h5)
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_FILE")]
    pub output: PathBuf,
}

/// Arguments for showing index statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Index file to inspect
    #[arg(value_name = "INDEX_FILE")]
    pub index_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_defaults() {
        let args = SpecSearchArgs::try_parse_from([
            "specsearch",
            "search",
            "--index-file",
            "corpus.idx",
            "-i",
            "queries.h5",
            "-o",
            "out.h5",
        ])
        .unwrap();

        match args.command {
            Command::Search(search) => {
                assert_eq!(search.k, 5);
                assert_eq!(search.nprobe, None);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_build_index_parses_kind() {
        let args = SpecSearchArgs::try_parse_from([
            "specsearch",
            "build-index",
            "-i",
            "vectors.txt",
            "--index-type",
            "partitioned",
            "--clusters",
            "64",
            "-o",
            "out.idx",
        ])
        .unwrap();

        match args.command {
            Command::BuildIndex(build) => {
                assert_eq!(build.index_type, IndexTypeArg::Partitioned);
                assert_eq!(build.clusters, Some(64));
                assert_eq!(build.seed, 0);
            }
            _ => panic!("expected build-index command"),
        }
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let args = SpecSearchArgs::try_parse_from([
            "specsearch",
            "-v",
            "-v",
            "--quiet",
            "stats",
            "corpus.idx",
        ])
        .unwrap();
        assert_eq!(args.verbosity(), 0);
    }
}
