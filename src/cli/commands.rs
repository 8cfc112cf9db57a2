//! Command implementations for the specsearch CLI.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::cli::args::*;
use crate::error::Result;
use crate::index::{AnyIndex, BuildStage, IndexBuilder, ProgressObserver, VectorIndex};
use crate::io::{load_vectors, read_index, write_index, write_results};
use crate::search::IndexSearcher;

/// Execute a CLI command.
pub fn execute_command(args: SpecSearchArgs) -> Result<()> {
    match &args.command {
        Command::BuildIndex(build_args) => build_index(build_args.clone(), &args),
        Command::Search(search_args) => search_index(search_args.clone(), &args),
        Command::Stats(stats_args) => show_stats(stats_args.clone(), &args),
    }
}

/// Observer that prints build stages at verbose levels.
struct PrintingObserver;

impl ProgressObserver for PrintingObserver {
    fn on_stage_complete(&self, stage: BuildStage, vectors: usize) {
        match stage {
            BuildStage::Training => println!("Trained quantizer on {vectors} vectors"),
            BuildStage::Inserting => println!("Inserted {vectors} vectors"),
        }
    }
}

/// Build an index from a vectors file.
fn build_index(args: BuildIndexArgs, cli_args: &SpecSearchArgs) -> Result<()> {
    if cli_args.verbosity() > 0 {
        println!("Loading vectors from {}...", args.input.display());
    }
    let corpus = load_vectors(&args.input)?;
    if cli_args.verbosity() > 0 {
        println!(
            "Read {} vectors of dimension {}",
            corpus.len(),
            corpus.dimension()
        );
    }

    let mut builder = IndexBuilder::new(args.index_type.into())
        .nprobe(args.nprobe)
        .seed(args.seed);
    if let Some(clusters) = args.clusters {
        builder = builder.clusters(clusters);
    }
    if cli_args.verbosity() > 1 {
        builder = builder.observer(Arc::new(PrintingObserver));
    }

    let start = Instant::now();
    let index = builder.build(&corpus)?;
    if cli_args.verbosity() > 0 {
        println!(
            "Built {} index in {:.2}s",
            index.kind().name(),
            start.elapsed().as_secs_f64()
        );
    }

    write_index(&index, &args.output)?;
    if cli_args.verbosity() > 0 {
        println!("Wrote index to {}", args.output.display());
    }
    Ok(())
}

/// Search a prebuilt index and write the results file.
fn search_index(args: SearchArgs, cli_args: &SpecSearchArgs) -> Result<()> {
    if cli_args.verbosity() > 0 {
        println!("Loading index file {}...", args.index_file.display());
    }
    let mut index = read_index(&args.index_file)?;
    if let Some(nprobe) = args.nprobe {
        index.set_nprobe(nprobe);
    }

    if cli_args.verbosity() > 0 {
        println!("Loading embedded spectra from {}...", args.input.display());
    }
    let queries = load_vectors(&args.input)?;
    if cli_args.verbosity() > 0 {
        println!("Read a total of {} spectra", queries.len());
    }

    let start = Instant::now();
    let results = IndexSearcher::new(&index).search(&queries, args.k)?;
    if cli_args.verbosity() > 0 {
        println!(
            "Searched {} queries (k={}) in {:.2}s",
            results.num_queries(),
            args.k,
            start.elapsed().as_secs_f64()
        );
    }

    write_results(&results, &args.output)?;
    if cli_args.verbosity() > 0 {
        println!("Wrote results to {}", args.output.display());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct IndexStats {
    kind: &'static str,
    dimension: usize,
    vectors: usize,
    clusters: Option<usize>,
    nprobe: Option<usize>,
}

/// Show statistics for an index file.
fn show_stats(args: StatsArgs, cli_args: &SpecSearchArgs) -> Result<()> {
    let index = read_index(&args.index_file)?;

    let stats = match &index {
        AnyIndex::Flat(_) => IndexStats {
            kind: index.kind().name(),
            dimension: index.dimension(),
            vectors: index.len(),
            clusters: None,
            nprobe: None,
        },
        AnyIndex::Partitioned(ivf) => IndexStats {
            kind: index.kind().name(),
            dimension: index.dimension(),
            vectors: index.len(),
            clusters: Some(ivf.num_clusters()),
            nprobe: Some(ivf.nprobe()),
        },
    };

    match cli_args.output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Human => {
            println!("Index:     {}", args.index_file.display());
            println!("Kind:      {}", stats.kind);
            println!("Dimension: {}", stats.dimension);
            println!("Vectors:   {}", stats.vectors);
            if let Some(clusters) = stats.clusters {
                println!("Clusters:  {}", clusters);
            }
            if let Some(nprobe) = stats.nprobe {
                println!("nprobe:    {}", nprobe);
            }
        }
    }
    Ok(())
}
