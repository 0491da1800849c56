//! Sweep command implementation.

// Rounds per second is an estimate
#![allow(clippy::cast_precision_loss)]

use super::output::{format_sweep_text, JsonSweepResult, SweepStats};
use super::{CliError, OutputFormat, RoundSetup};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::Instant;
use tracing::warn;

/// Execute the sweep command.
///
/// # Errors
///
/// Returns an error if the progress bar cannot be set up or output fails.
pub(crate) fn execute(
    setup: &RoundSetup,
    rounds: u64,
    max_ticks: u64,
    threads: Option<usize>,
    format: OutputFormat,
    progress: bool,
) -> Result<(), CliError> {
    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let pb = if progress {
        let pb = ProgressBar::new(rounds);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rounds ({per_sec})")
                .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let num_actors = setup.variant.actor_count();

    // Each thread folds into its own stats; partial results are merged at the end
    let stats = (0..rounds)
        .into_par_iter()
        .fold(
            || SweepStats::new(num_actors),
            |mut local, i| {
                let seed = setup.seed.wrapping_add(i);
                match xonix::run_round(&setup.config, setup.variant, seed, max_ticks) {
                    Ok(result) => local.add_result(&result),
                    Err(e) => warn!(seed, error = %e, "round failed"),
                }
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
                local
            },
        )
        .reduce(
            || SweepStats::new(num_actors),
            |mut a, b| {
                a.merge(&b);
                a
            },
        );

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    let rounds_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.rounds_played as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_sweep_text(&stats));
            println!();
            println!(
                "Duration: {:.2}s ({rounds_per_sec:.0} rounds/sec)",
                duration.as_secs_f64()
            );
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonSweepResult::from_stats(&stats))?;
            println!("{json}");
        }
    }

    Ok(())
}
