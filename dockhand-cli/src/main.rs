//! Dockhand CLI
//!
//! Builds the MCP server image, pushes it to the registry and triggers a
//! Portainer redeploy through a webhook.
//!
//! A build or push failure stops the run with the tool's exit code. A failed
//! webhook call only prints a warning: the image is already in the registry.

mod commands;
mod config;
mod engine;
mod error;
mod service;
#[cfg(all(test, unix))]
mod test_support;

use anyhow::Result;
use clap::Parser;
use colored::*;
use commands::{Commands, handle_command};
use config::Config;
use error::DeployError;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "dockhand")]
#[command(about = "Build, push and redeploy the MCP server image", long_about = None)]
struct Cli {
    /// Image tag for a full deploy [default: latest]
    tag: Option<String>,

    /// Registry-qualified image name, without tag
    #[arg(long, env = "DOCKHAND_IMAGE", global = true)]
    image: Option<String>,

    /// Redeploy webhook URL
    #[arg(long, env = "DOCKHAND_WEBHOOK_URL", global = true, hide_env_values = true)]
    webhook_url: Option<String>,

    /// Webhook request timeout in seconds (default: no timeout)
    #[arg(
        long,
        env = "DOCKHAND_WEBHOOK_TIMEOUT",
        global = true,
        value_name = "SECONDS"
    )]
    webhook_timeout: Option<u64>,

    /// Container engine command
    #[arg(long, env = "DOCKHAND_ENGINE", default_value = "docker", global = true)]
    engine: String,

    /// Build context directory
    #[arg(long, env = "DOCKHAND_CONTEXT", default_value = ".", global = true)]
    context: PathBuf,

    /// Dockerfile to build (default: <context>/Dockerfile)
    #[arg(short = 'f', long = "file", env = "DOCKHAND_DOCKERFILE", global = true)]
    dockerfile: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            webhook_url: self.webhook_url.clone(),
            webhook_timeout: self.webhook_timeout.map(Duration::from_secs),
            engine: self.engine.clone(),
            context: self.context.clone(),
            dockerfile: self.dockerfile.clone(),
            ..Config::new(self.image.clone())
        }
    }

    /// The command to run; a bare `dockhand [TAG]` is a full deploy
    fn into_command(self) -> Result<Commands, DeployError> {
        match (self.command, self.tag) {
            (Some(_), Some(tag)) => Err(DeployError::Config(format!(
                "unexpected tag '{}' before subcommand",
                tag
            ))),
            (Some(command), None) => Ok(command),
            (None, tag) => Ok(Commands::Deploy { tag, json: false }),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            if let Some(stage) = e.downcast_ref::<DeployError>().and_then(DeployError::stage) {
                eprintln!("  Deploy stopped while {}; later steps were not run.", stage);
            }
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Initialize logging to stderr
///
/// `RUST_LOG` wins; otherwise only warnings, or debug output with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "dockhand=debug,dockhand_cli=debug,dockhand_client=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Dispatch the parsed command; each handler validates the settings it uses
async fn run(cli: Cli) -> Result<()> {
    let config = cli.config();
    let command = cli.into_command()?;
    handle_command(command, &config).await
}

/// Exit code for a failed run: the failing tool's code, 2 for config errors
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<DeployError>()
        .map(DeployError::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_invocation_deploys_latest() {
        let cli = Cli::try_parse_from(["dockhand"]).unwrap();
        match cli.into_command().unwrap() {
            Commands::Deploy { tag, json } => {
                assert_eq!(tag, None);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_positional_tag_deploys_that_tag() {
        let cli = Cli::try_parse_from(["dockhand", "v2"]).unwrap();
        match cli.into_command().unwrap() {
            Commands::Deploy { tag, .. } => assert_eq!(tag.as_deref(), Some("v2")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dockhand",
            "build",
            "v3",
            "--image",
            "registry.example.com/app",
            "--engine",
            "podman",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(config.image(None).unwrap().name, "registry.example.com/app");
        assert_eq!(config.engine, "podman");

        match cli.into_command().unwrap() {
            Commands::Build { tag } => assert_eq!(tag.as_deref(), Some("v3")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_webhook_timeout_is_seconds() {
        let cli = Cli::try_parse_from(["dockhand", "--webhook-timeout", "15"]).unwrap();
        assert_eq!(cli.config().webhook_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_exit_code_mapping() {
        let build: anyhow::Error = DeployError::Build {
            image: "app:latest".to_string(),
            code: Some(4),
        }
        .into();
        assert_eq!(exit_code(&build), 4);

        let config: anyhow::Error = DeployError::Config("missing image".to_string()).into();
        assert_eq!(exit_code(&config), 2);

        let other = anyhow::anyhow!("something else");
        assert_eq!(exit_code(&other), 1);
    }

    #[tokio::test]
    async fn test_init_ignores_unrelated_invalid_settings() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().display().to_string();
        let cli = Cli::try_parse_from([
            "dockhand",
            "--webhook-url",
            "not-a-url",
            "--engine",
            "",
            "init",
            "dockerfile",
            "--output",
            &output,
        ])
        .unwrap();

        run(cli).await.unwrap();
        assert!(dir.path().join("Dockerfile").is_file());
    }

    #[tokio::test]
    async fn test_deploy_with_invalid_webhook_url_is_config_error() {
        let cli = Cli::try_parse_from([
            "dockhand",
            "v2",
            "--image",
            "app",
            "--webhook-url",
            "not-a-url",
        ])
        .unwrap();

        let err = run(cli).await.unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }
}
