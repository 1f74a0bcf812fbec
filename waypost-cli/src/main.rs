//! # waypost CLI
//!
//! Command-line interface for the waypost static blog generator.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "waypost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, env = "WAYPOST_CONFIG", default_value = "waypost.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new waypost project
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Parse all posts and build the site model
    Build {
        /// Treat every content error as fatal
        #[arg(long)]
        strict: bool,

        /// Print the site model as JSON
        #[arg(long)]
        json: bool,

        /// Write the JSON site model to a file instead of stdout
        #[arg(long, requires = "json")]
        output: Option<PathBuf>,
    },

    /// Report every content error without failing fast
    Check {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Build {
            strict,
            json,
            output,
        } => {
            let opts = commands::BuildOptions {
                strict,
                json,
                output,
            };
            commands::build_site(&cli.config, opts).await
        }
        Commands::Check { json } => commands::check_site(&cli.config, json).await,
    }
}
