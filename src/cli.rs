use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cliploop")]
#[command(author, version, about = "Continuous random-clip playback against a media backend")]
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
    /// Play clips headless, controlled from stdin
    Play {
        /// Start scoped to this folder
        #[arg(long, conflicts_with = "file")]
        folder: Option<String>,

        /// Start looping sub-clips of this file
        #[arg(long)]
        file: Option<String>,

        /// Preferred clip length in seconds
        #[arg(short, long)]
        duration: Option<u32>,

        /// Backend base URL (overrides config)
        #[arg(long)]
        backend: Option<String>,
    },

    /// Print the library tree
    Tree {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Backend base URL (overrides config)
        #[arg(long)]
        backend: Option<String>,
    },

    /// Print the backend's cache status once
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Backend base URL (overrides config)
        #[arg(long)]
        backend: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
