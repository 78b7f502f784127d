//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod deploy;
mod doctor;
mod init;

pub use init::InitCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build, push and trigger a redeploy (the default)
    Deploy {
        /// Image tag
        tag: Option<String>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build the image only
    Build {
        /// Image tag
        tag: Option<String>,
    },
    /// Push an already built image only
    Push {
        /// Image tag
        tag: Option<String>,
    },
    /// Call the redeploy webhook only
    Notify,
    /// Check the container engine and configuration
    Doctor,
    /// Generate packaging files
    Init {
        #[command(subcommand)]
        command: InitCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Deploy { tag, json } => deploy::handle_deploy(tag, json, config).await,
        Commands::Build { tag } => deploy::handle_build(tag, config).await,
        Commands::Push { tag } => deploy::handle_push(tag, config).await,
        Commands::Notify => deploy::handle_notify(config).await,
        Commands::Doctor => doctor::handle_doctor(config).await,
        Commands::Init { command } => init::handle_init_command(command).await,
    }
}
