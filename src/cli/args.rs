//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    alias::AliasCommands, completions::CompletionsArgs, replicate::ReplicateCommands,
};

#[derive(Parser, Debug)]
#[command(name = "objctl")]
#[command(author, version, about = "Administration CLI for S3-compatible object storage")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format (usage errors stay text)
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Only log errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration directory (default: platform config dir)
    #[arg(long, global = true, env = "OBJCTL_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bucket replication management
    #[command(subcommand)]
    Replicate(ReplicateCommands),

    /// Manage server aliases
    #[command(subcommand)]
    Alias(AliasCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pick automatically (text)
    #[default]
    Auto,
    /// Human-readable text
    Text,
    /// JSON document (for programming)
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        self == OutputFormat::Json
    }
}
