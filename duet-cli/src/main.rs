//! Duet CLI - one-shot composition and merge operations

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "duet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge an original and a translated markdown file into one
    /// dual-language document
    Merge {
        /// Original-language markdown file
        original: String,

        /// Translated markdown file
        translated: String,

        /// Output file path
        #[arg(short, long)]
        output: String,

        /// Pair sections by position instead of by title
        #[arg(long)]
        position: bool,
    },

    /// Compose a single job directory once, without the polling worker
    Compose {
        /// Path to the job directory
        job_dir: String,

        /// Lane to compose in (standard, free)
        #[arg(short, long, default_value = "standard")]
        lane: String,
    },

    /// Show the progress record of a job
    Status {
        /// Path to the job directory
        job_dir: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "duet_cli=debug,duet_core=debug"
    } else {
        "duet_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Merge {
            original,
            translated,
            output,
            position,
        } => commands::merge(&original, &translated, &output, position),

        Commands::Compose { job_dir, lane } => commands::compose(&job_dir, &lane).await,

        Commands::Status { job_dir } => commands::status(&job_dir),
    }
}
