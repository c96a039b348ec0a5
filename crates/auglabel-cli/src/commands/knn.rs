//! Pixel-space kNN monitor between the train and test splits.

use anyhow::{Context, Result};
use auglabel::prelude::*;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use super::load_split;
use crate::config::Config;

pub fn run(
    config: &Config,
    memory_limit: Option<usize>,
    query_limit: Option<usize>,
    k: Option<usize>,
    verbose: bool,
) -> Result<()> {
    let monitor = config.knn_monitor(k)?;
    let normalization = config.normalization()?;
    let loader_config = config.loader_config(false);

    let memory = load_split(config, Split::Train)?;
    let query = load_split(config, Split::Test)?;
    let memory = Subset::first(memory, memory_limit.unwrap_or(usize::MAX));
    let query = Subset::first(query, query_limit.unwrap_or(usize::MAX));

    println!(
        "{} kNN over {} memory / {} query samples (k={})",
        "→".blue(),
        memory.len().to_string().cyan(),
        query.len().to_string().cyan(),
        monitor.k()
    );

    let memory = DataLoader::new(AugmentedDataset::plain(memory, normalization), loader_config)?;
    let query = DataLoader::new(AugmentedDataset::plain(query, normalization), loader_config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.set_message("Building feature bank and voting...");
    if !verbose {
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
    }
    let report = monitor
        .run(&FlattenExtractor, &memory, &query)
        .context("kNN monitor failed")?;
    pb.finish_and_clear();

    println!(
        "  {} kNN accuracy: {} ({}/{}), {:.2}s",
        "✓".green(),
        format!("{:.2}%", report.percent()).green().bold(),
        report.correct,
        report.total,
        report.elapsed.as_secs_f64()
    );
    Ok(())
}
