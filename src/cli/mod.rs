//! CLI interface for doc-gate

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod check;
pub mod context;
pub mod score;

/// doc-gate: documentation governance at commit time
#[derive(Parser)]
#[command(name = "doc-gate")]
#[command(about = "Keeps code and its documentation honest at commit time", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Main commands
#[derive(Subcommand)]
pub enum Commands {
    /// Validate the staged change set against documentation rules
    Check(check::CheckCommand),
    /// Show the documentation context governing a file
    Context(context::ContextCommand),
    /// Compute the documentation confidence score
    Score(score::ScoreCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Check(cmd) => cmd.execute(),
            Commands::Context(cmd) => cmd.execute(),
            Commands::Score(cmd) => cmd.execute(),
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => anyhow::bail!("unknown output format: {other}"),
        }
    }
}
