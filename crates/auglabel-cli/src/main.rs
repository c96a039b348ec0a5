//! auglabel CLI - inspect transform catalogs and run pixel-space monitors.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "auglabel")]
#[command(author, version, about = "auglabel - synthetic classes from augmentations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: auglabel.toml in the current or a parent directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default auglabel.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Print the class catalog for the configured transforms
    Catalog {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Draw synthetic labels and compare against the uniform expectation
    Sample {
        /// Number of draws
        #[arg(short = 'n', long, default_value = "10000")]
        count: usize,

        /// Override the configured seed
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Per-channel mean and std of a CIFAR split
    Stats {
        /// Split to scan: train or test
        #[arg(short, long, default_value = "train")]
        split: String,
    },

    /// Pixel-space kNN monitor: train split as memory, test split as queries
    Knn {
        /// Use at most this many memory samples
        #[arg(long)]
        memory_limit: Option<usize>,

        /// Use at most this many query samples
        #[arg(long)]
        query_limit: Option<usize>,

        /// Override the configured number of neighbors
        #[arg(short, long)]
        k: Option<usize>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let load = || Config::load(cli.config.as_deref());

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Catalog { json } => commands::catalog::run(&load()?, json),
        Commands::Sample { count, seed } => commands::sample::run(&load()?, count, seed),
        Commands::Stats { split } => commands::stats::run(&load()?, &split),
        Commands::Knn {
            memory_limit,
            query_limit,
            k,
        } => commands::knn::run(&load()?, memory_limit, query_limit, k, cli.verbose),
    }
}
