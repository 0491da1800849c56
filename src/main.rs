//! Xonix CLI - play rounds in the terminal or simulate them headless.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Xonix - territory-capture arcade engine
#[derive(Parser, Debug)]
#[command(name = "xonix")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that sets up a round.
#[derive(ClapArgs, Debug, Clone)]
struct RoundArgs {
    /// Two actors on one board
    #[arg(long)]
    dual: bool,

    /// Difficulty level for single-actor rounds: one, two or three
    #[arg(short, long)]
    level: Option<cli::LevelArg>,

    /// JSON file overriding the default configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed (default: random)
    #[arg(short, long)]
    seed: Option<u64>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a round in the terminal
    Play {
        #[command(flatten)]
        round: RoundArgs,

        /// Theme id or name
        #[arg(short, long, default_value = "1")]
        theme: String,

        /// Snapshot file used by F5 (save) and F9 (load)
        #[arg(long, default_value = "xonix.sav")]
        save_file: PathBuf,

        /// Leaderboard file to record the final score in
        #[arg(long)]
        leaderboard: Option<PathBuf>,

        /// Player names for the leaderboard
        #[arg(short, long, num_args = 1..=2)]
        name: Vec<String>,

        /// Write logs to this file (the terminal is busy)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Play one round headless with autopilot inputs
    Simulate {
        #[command(flatten)]
        round: RoundArgs,

        /// Stop after this many ticks (default: 5000)
        #[arg(short = 't', long, default_value = "5000")]
        max_ticks: u64,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save the final round snapshot to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Simulate many seeds in parallel and aggregate results
    Sweep {
        #[command(flatten)]
        round: RoundArgs,

        /// Number of rounds (default: 1000)
        #[arg(short, long, default_value = "1000")]
        rounds: u64,

        /// Stop each round after this many ticks (default: 5000)
        #[arg(short = 't', long, default_value = "5000")]
        max_ticks: u64,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// List the theme catalog
    Themes {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Show the leaderboard
    Scores {
        /// Leaderboard file
        #[arg(default_value = "leaderboard.json")]
        leaderboard: PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

/// Install the log subscriber. `RUST_LOG` selects levels; the default is `warn`.
fn init_logging(log_file: Option<&PathBuf>) -> Result<(), cli::CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                cli::CliError::new(format!("Failed to create {}: {e}", path.display()))
            })?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn run(command: Commands) -> Result<(), cli::CliError> {
    match command {
        Commands::Play {
            round,
            theme,
            save_file,
            leaderboard,
            name,
            log_file,
        } => {
            // Without a log file the terminal UI owns the screen; stay silent.
            if log_file.is_some() {
                init_logging(log_file.as_ref())?;
            }
            let setup = cli::RoundSetup::new(round.dual, round.level, round.config, round.seed)?;
            cli::play::execute(setup, &theme, save_file, leaderboard, name)
        }

        Commands::Simulate {
            round,
            max_ticks,
            format,
            save,
        } => {
            init_logging(None)?;
            let setup = cli::RoundSetup::new(round.dual, round.level, round.config, round.seed)?;
            cli::simulate::execute(&setup, max_ticks, format, save)
        }

        Commands::Sweep {
            round,
            rounds,
            max_ticks,
            threads,
            format,
            progress,
        } => {
            init_logging(None)?;
            let setup = cli::RoundSetup::new(round.dual, round.level, round.config, round.seed)?;
            cli::sweep::execute(&setup, rounds, max_ticks, threads, format, progress)
        }

        Commands::Themes { format } => cli::catalog::themes(format),

        Commands::Scores {
            leaderboard,
            format,
        } => cli::catalog::scores(&leaderboard, format),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
