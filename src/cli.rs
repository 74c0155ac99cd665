//! Command-line interface definition for Chatlens
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for metrics, chat history and preset prompts.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chatlens - engagement metrics for local chat history
///
/// Reads stored chat sessions and reports message counts, session
/// durations, word counts and when you chat the most.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the history database location
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Time zone for hour/day grouping (local, utc, +02:00, ...)
    #[arg(long)]
    pub timezone: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Chatlens
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compute engagement metrics from chat history
    Metrics {
        /// Print the metrics record as JSON
        #[arg(long)]
        json: bool,

        /// Read sessions from a JSON export instead of the history database
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of most recent days to show in the activity table
        #[arg(short, long)]
        days: Option<usize>,
    },

    /// Manage stored chat sessions
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Show preset conversation starters
    Presets {
        /// Only show one category (by name or label, case-insensitive)
        #[arg(short, long)]
        category: Option<String>,

        /// Print presets as JSON
        #[arg(long)]
        json: bool,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List stored sessions
    List,

    /// Print a session's messages
    Show {
        /// Session ID (exact, or a unique prefix)
        id: String,

        /// Print raw message text without markdown styling
        #[arg(long)]
        plain: bool,
    },

    /// Delete a session
    Delete {
        /// Session ID (exact, or a unique prefix)
        id: String,
    },

    /// Import sessions from a JSON export
    Import {
        /// Path to the export file
        path: PathBuf,
    },

    /// Export all sessions to a JSON file
    Export {
        /// Destination path
        path: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            timezone: None,
            no_color: false,
            command: Commands::Metrics {
                json: false,
                input: None,
                days: None,
            },
        }
    }
}
