//! CLI parse: clap types for Eklavya. No behavior; definitions only.

use crate::types::{DEFAULT_GRADE, DEFAULT_TOPIC, MAX_GRADE, MIN_GRADE};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Eklavya CLI - generate, review and refine grade-level lessons
#[derive(Parser, Debug)]
#[command(name = "eklavya")]
#[command(about = "Generate an explanation and MCQs, have them reviewed, and refine once on failure")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (config/ is read from here)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one generate → review → refine pass
    Run {
        /// Grade level (1-12)
        #[arg(
            long,
            default_value_t = DEFAULT_GRADE,
            value_parser = clap::value_parser!(u8).range(MIN_GRADE as i64..=MAX_GRADE as i64)
        )]
        grade: u8,

        /// Lesson topic
        #[arg(long, default_value = DEFAULT_TOPIC)]
        topic: String,

        /// Provider API key (defaults to the provider's api_key_env variable)
        #[arg(long)]
        api_key: Option<String>,

        /// Output format (text or json)
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Print the format instructions sent to the model for a schema
    Schema {
        #[arg(value_enum)]
        kind: SchemaKind,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Validate the effective configuration
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaKind {
    /// Generator output: explanation plus MCQs
    Content,
    /// Reviewer output: status plus feedback
    Review,
}
