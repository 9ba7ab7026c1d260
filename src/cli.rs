//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::providers::ProviderKind;

/// YoJournal - LLM-powered journal analyzer
///
/// Analyze journal entries with local AI: emotion detection,
/// psychoanalytic insight, and personality profiling. Results are
/// collected into a persistent history that can be exported as markdown.
///
/// Examples:
///   yojournal analyze today.md
///   yojournal watch today.md --wait-ms 500
///   yojournal set emotions off
///   yojournal export --output insights.md
///   yojournal clear --yes
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .yojournal.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path of the persisted settings/history state file
    // The field is not named `state`: that arg id would propagate into the
    // `set` subcommand and collide with its positional ToggleState.
    #[arg(long = "state", global = true, value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Ollama model to use for analysis
    ///
    /// Can also be set via YOJOURNAL_MODEL env var or .yojournal.toml.
    #[arg(short, long, global = true, env = "YOJOURNAL_MODEL")]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, global = true, env = "OLLAMA_URL", value_name = "URL")]
    pub ollama_url: Option<String>,

    /// Temperature for LLM responses (0.0 - 1.0)
    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds (per provider call)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Debounce wait in milliseconds for watch mode
    #[arg(long, global = true, value_name = "MS")]
    pub wait_ms: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Subcommands of the journal analyzer.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyze a journal entry and append the result to the history
    Analyze {
        /// Journal entry file to analyze
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Watch a journal file and re-analyze it on change (debounced)
    Watch {
        /// Journal entry file to watch
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Create a blank journal document to start writing in
    New {
        /// File name for the new document (defaults to a dated name)
        #[arg(value_name = "FILE")]
        name: Option<PathBuf>,
    },

    /// Export the analysis history as a dated markdown document
    Export {
        /// Output file path (defaults to AI_Journal_Analysis_<date>.md)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Erase all previous analyses (irreversible)
    Clear {
        /// Confirm the irreversible clear
        #[arg(long)]
        yes: bool,
    },

    /// Enable or disable an analysis provider
    Set {
        /// Which provider to toggle
        provider: ProviderKind,
        /// New state for the toggle
        state: ToggleState,
    },

    /// Generate a default .yojournal.toml configuration file
    InitConfig,
}

/// On/off argument for the `set` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ToggleState {
    On,
    Off,
}

impl ToggleState {
    pub fn as_bool(self) -> bool {
        matches!(self, ToggleState::On)
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(wait_ms) = self.wait_ms {
            if wait_ms == 0 {
                return Err("Debounce wait must be at least 1 millisecond".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
