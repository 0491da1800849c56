//! Simulate command implementation.

use super::output::format_round_text;
use super::{CliError, OutputFormat, RoundSetup};
use std::path::PathBuf;

/// Execute the simulate command.
///
/// # Errors
///
/// Returns an error if the round cannot be set up or the snapshot cannot be saved.
pub(crate) fn execute(
    setup: &RoundSetup,
    max_ticks: u64,
    format: OutputFormat,
    save: Option<PathBuf>,
) -> Result<(), CliError> {
    let quiet = format == OutputFormat::Json;
    if !quiet {
        println!("Simulating {:?} round with seed {}...", setup.variant, setup.seed);
        println!();
    }

    let (session, result) =
        xonix::play_round(&setup.config, setup.variant, setup.seed, max_ticks)?;

    // Save final state if requested
    if let Some(path) = save {
        session.save(&path)?;
        if !quiet {
            println!("Snapshot saved to: {}", path.display());
            println!();
        }
    }

    match format {
        OutputFormat::Text => print!("{}", format_round_text(&result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}
