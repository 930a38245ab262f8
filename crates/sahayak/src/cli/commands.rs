//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate localized teaching content with Gemini.
#[derive(Parser, Debug)]
#[command(name = "sahayak")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./sahayak.toml or the user config dir)
    #[arg(short, long, global = true, env = "SAHAYAK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available flows
    Flows {
        /// Show each flow's request fields
        #[arg(short, long)]
        fields: bool,
    },

    /// Run a flow and print its JSON output
    Generate {
        /// Flow name, e.g. quiz or multi_language_content
        flow: String,

        /// Request parameter as key=value (repeatable)
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// JSON file holding request parameters; --param values win
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },
}
