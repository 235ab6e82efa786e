use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "filmradar")]
#[command(author, version, about = "Movie and series metadata aggregation service")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Execute a single harvest run and exit
    Run {
        /// Cap the number of records that go through enrichment
        #[arg(long)]
        limit: Option<usize>,

        /// Restrict the harvest to one source (tmdb, yts, eztv, curated)
        #[arg(long)]
        source: Option<String>,
    },

    /// Score a quality label and print the result
    Score {
        /// Quality label, e.g. "1080p.WEB-DL"
        quality: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
