//! Init command handlers
//!
//! Generates the packaging Dockerfile for the MCP server.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use dockhand_core::packaging::ServerPackaging;
use std::fs;
use std::path::{Path, PathBuf};

/// Init subcommands
#[derive(Debug, Subcommand)]
pub enum InitCommands {
    /// Generate a Dockerfile for the HTTP MCP server
    Dockerfile {
        /// Output directory for the generated file
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Port exposed by the server
        #[arg(long, default_value_t = 8000)]
        port: u16,

        /// Base image
        #[arg(long, default_value = "python:3.11-slim")]
        base_image: String,

        /// Overwrite an existing Dockerfile
        #[arg(long)]
        force: bool,
    },
}

/// Handle init commands
pub async fn handle_init_command(command: InitCommands) -> Result<()> {
    match command {
        InitCommands::Dockerfile {
            output,
            port,
            base_image,
            force,
        } => {
            let packaging = ServerPackaging {
                port,
                base_image,
                ..Default::default()
            };
            let path = write_dockerfile(&output, &packaging, force)?;

            println!("  {} {}", "Created".green(), path.display());
            println!();
            println!("{}", "Next steps:".bold());
            println!("  1. Set DOCKHAND_IMAGE and DOCKHAND_WEBHOOK_URL");
            println!("  2. Run {} to build, push and redeploy", "dockhand".cyan());
            Ok(())
        }
    }
}

/// Write the rendered Dockerfile into `output_dir`
///
/// Refuses to replace an existing file unless `force` is set.
fn write_dockerfile(output_dir: &Path, packaging: &ServerPackaging, force: bool) -> Result<PathBuf> {
    let path = output_dir.join("Dockerfile");

    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory {:?}", output_dir))?;
    fs::write(&path, packaging.render_dockerfile())
        .with_context(|| format!("Failed to write Dockerfile to {:?}", path))?;

    Ok(path)
}
