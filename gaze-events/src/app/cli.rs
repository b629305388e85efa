//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gaze Events - Oculomotor event detection and AOI transition analysis
#[derive(Parser, Debug)]
#[command(name = "gaze-events")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect events and build the transition model of one recording
    Analyze {
        /// Input recording (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stimulus intensity matrix (JSON rows) for informativity
        #[arg(short, long)]
        stimulus: Option<PathBuf>,
    },

    /// Analyze several recordings and cross-score their transition models
    Compare {
        /// Input recordings (JSON)
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score a recording against per-class transition models
    Classify {
        /// Labelled training recording, as NAME=FILE (repeatable)
        #[arg(long = "class", value_name = "NAME=FILE", required = true, value_parser = parse_class_file)]
        classes: Vec<(String, PathBuf)>,

        /// Recording to classify
        #[arg(short, long)]
        input: PathBuf,

        /// Write the scores here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View or reset configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "oculus.velocity_threshold", "aoi.cols")
        key: String,
    },

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Parse `NAME=FILE`
fn parse_class_file(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=FILE, got '{}'", value)),
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
