//! Per-channel dataset statistics.

use anyhow::{Context, Result};
use auglabel::prelude::*;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use super::load_split;
use crate::config::Config;

pub fn run(config: &Config, split: &str) -> Result<()> {
    let split: Split = split.parse()?;
    let dataset = load_split(config, split)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Scanning {} images...", dataset.len()));
    let stats = compute_mean_std(&dataset).context("Failed to compute statistics")?;
    pb.finish_and_clear();

    let configured = config.normalization()?;

    println!("{}", format!("{} statistics", dataset.name()).white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!("  Images:            {}", stats.samples.to_string().cyan());
    println!();
    println!("{}", "Channel    Mean      Std       (configured)".blue().bold());
    for (c, name) in ["R", "G", "B"].iter().enumerate() {
        println!(
            "  {}        {:.4}    {:.4}    ({:.4}, {:.4})",
            name,
            stats.mean[c],
            stats.std[c],
            configured.mean()[c],
            configured.std()[c]
        );
    }
    println!();
    println!("{}", "═".repeat(40).dimmed());
    Ok(())
}
