//! Themes and scores commands.

use super::output::{format_scores_text, format_themes_text};
use super::{CliError, OutputFormat};
use std::path::Path;
use xonix::{Leaderboard, ThemeCatalog};

/// List the built-in themes.
///
/// # Errors
///
/// Returns an error if JSON output fails.
pub(crate) fn themes(format: OutputFormat) -> Result<(), CliError> {
    let catalog = ThemeCatalog::builtin();
    match format {
        OutputFormat::Text => print!("{}", format_themes_text(catalog.iter())),
        OutputFormat::Json => {
            let themes: Vec<_> = catalog.iter().collect();
            println!("{}", serde_json::to_string_pretty(&themes)?);
        }
    }
    Ok(())
}

/// Print the leaderboard stored at `path`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub(crate) fn scores(path: &Path, format: OutputFormat) -> Result<(), CliError> {
    let board = Leaderboard::load(path)?;
    match format {
        OutputFormat::Text => print!("{}", format_scores_text(&board)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&board.ranked())?),
    }
    Ok(())
}
