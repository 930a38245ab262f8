//! Command-line interface module.
//!
//! Provides the CLI structure and command handlers for the sahayak binary.

mod commands;
mod flows;
mod generate;
mod params;

pub use commands::{Cli, Commands};
pub use flows::handle_flows_command;
pub use generate::handle_generate_command;

use sahayak::SahayakConfig;

/// Runs the parsed command. Every failure is returned, never raised early.
pub async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Flows { fields } => handle_flows_command(fields),
        Commands::Generate {
            flow,
            params,
            input,
            compact,
        } => {
            let config = match cli.config.as_deref() {
                Some(path) => SahayakConfig::load_from(Some(path))?,
                None => SahayakConfig::load()?,
            };
            handle_generate_command(&config, &flow, &params, input.as_deref(), compact).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn unreadable_config_is_returned_as_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("sahayak.toml");
        let cli = Cli::try_parse_from([
            "sahayak",
            "--config",
            missing.to_str().unwrap(),
            "generate",
            "quiz",
        ])
        .unwrap();

        let err = dispatch(cli).await.unwrap_err();

        assert!(err.to_string().contains("configuration"));
    }

    #[tokio::test]
    async fn flows_command_succeeds() {
        let cli = Cli::try_parse_from(["sahayak", "flows", "--fields"]).unwrap();
        assert!(dispatch(cli).await.is_ok());
    }
}
