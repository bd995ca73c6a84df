//! scormdeck CLI - download, inspect, and serve cached SCORM courses.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scormdeck::config::ConfigFile;

use error::CliError;

#[derive(Parser)]
#[command(name = "scormdeck", version, about = "Offline SCORM course player")]
struct Cli {
    /// Path to an alternative config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List courses available in the catalog.
    Courses,
    /// Download and cache a course.
    Download {
        /// Course id from the catalog.
        course_id: String,
    },
    /// Show details of a cached course.
    Info {
        /// Course id.
        course_id: String,
    },
    /// Remove a cached course.
    Remove {
        /// Course id.
        course_id: String,
    },
    /// Serve cached content to the player frame.
    Serve,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scormdeck=info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };

    match cli.command {
        Commands::Courses => commands::courses::run(&config).await,
        Commands::Download { course_id } => commands::download::run(&config, &course_id).await,
        Commands::Info { course_id } => commands::info::run(&config, &course_id).await,
        Commands::Remove { course_id } => commands::remove::run(&config, &course_id).await,
        Commands::Serve => commands::serve::run(&config).await,
    }
}
