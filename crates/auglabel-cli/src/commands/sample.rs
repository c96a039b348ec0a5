//! Draw synthetic labels from the catalog.

use anyhow::{bail, Result};
use colored::Colorize;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::Config;

pub fn run(config: &Config, count: usize, seed: Option<u64>) -> Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }
    let catalog = config.catalog()?;
    let seed = seed.unwrap_or(config.data.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut histogram = vec![0usize; catalog.len()];
    for _ in 0..count {
        if let Some(label) = catalog.sample_label(&mut rng) {
            histogram[label] += 1;
        }
    }

    let expected = count as f64 / catalog.len() as f64;
    let chi_square: f64 = histogram
        .iter()
        .map(|&observed| {
            let d = observed as f64 - expected;
            d * d / expected
        })
        .sum();

    println!(
        "{} {} draws over {} classes (seed {})",
        "→".blue(),
        count.to_string().cyan(),
        catalog.len().to_string().cyan(),
        seed
    );
    println!("  Expected per class: {:.1}", expected);
    println!();

    let widest = histogram.iter().copied().max().unwrap_or(0).max(1);
    for (label, &observed) in histogram.iter().enumerate() {
        let bar = "█".repeat(observed * 30 / widest);
        let description = catalog.get(label).map(|c| c.describe()).unwrap_or_default();
        println!(
            "  {:>4} {:<28} {:>7} {}",
            label,
            description,
            observed,
            bar.green()
        );
    }

    println!();
    println!(
        "  Chi-square:         {:.2} ({} degrees of freedom)",
        chi_square,
        catalog.len().saturating_sub(1)
    );
    Ok(())
}
