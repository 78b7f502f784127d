//! Container engine invocation
//!
//! Wraps the docker/podman command line for the two tool steps of a deploy:
//! - Building the image from the build context
//! - Pushing the tagged image to its registry
//!
//! Tool output is inherited so the user sees build progress live.

use async_trait::async_trait;
use dockhand_core::domain::deploy::DeployStage;
use dockhand_core::domain::image::ImageRef;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::error::DeployError;
use crate::service::ImageBuilder;

/// A container engine command line plus the build inputs it operates on
#[derive(Debug, Clone)]
pub struct ContainerEngine {
    /// Engine binary (e.g. "docker", "podman")
    program: String,
    /// Arguments placed before every subcommand (e.g. "--remote")
    base_args: Vec<String>,
    context: PathBuf,
    dockerfile: Option<PathBuf>,
}

impl ContainerEngine {
    /// Creates an engine for `program` building from `context`
    pub fn new(program: impl Into<String>, context: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            context: context.into(),
            dockerfile: None,
        }
    }

    /// Creates an engine from a whitespace separated command line
    ///
    /// Returns `None` when the command line is empty.
    pub fn from_command_line(command_line: &str, context: impl Into<PathBuf>) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;

        Some(Self::new(program, context).with_base_args(parts.collect()))
    }

    pub fn with_base_args(mut self, base_args: Vec<String>) -> Self {
        self.base_args = base_args;
        self
    }

    /// Uses an explicit Dockerfile instead of `<context>/Dockerfile`
    pub fn with_dockerfile(mut self, dockerfile: Option<PathBuf>) -> Self {
        self.dockerfile = dockerfile;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for `build -t name:tag [-f file] <context>`
    pub fn build_args(&self, image: &ImageRef) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.push("build".to_string());
        args.push("-t".to_string());
        args.push(image.reference());

        if let Some(dockerfile) = &self.dockerfile {
            args.push("-f".to_string());
            args.push(dockerfile.display().to_string());
        }

        args.push(self.context.display().to_string());
        args
    }

    /// Arguments for `push name:tag`
    pub fn push_args(&self, image: &ImageRef) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.push("push".to_string());
        args.push(image.reference());
        args
    }

    /// Checks that the engine is installed and answers `--version`
    ///
    /// # Returns
    /// The engine's version line
    pub async fn check_available(&self) -> Result<String, DeployError> {
        let output = Command::new(&self.program)
            .args(&self.base_args)
            .arg("--version")
            .output()
            .await
            .map_err(|source| DeployError::Spawn {
                tool: self.program.clone(),
                stage: DeployStage::Idle,
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeployError::Config(format!(
                "'{} --version' failed: {}",
                self.program,
                stderr.trim()
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("{} is available: {}", self.program, version);
        Ok(version)
    }

    /// Runs the engine with `args`, inheriting stdout and stderr
    async fn run(&self, args: &[String], stage: DeployStage) -> Result<ExitStatus, DeployError> {
        debug!("Running {} {}", self.program, args.join(" "));

        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|source| {
                error!("Failed to start {}: {}", self.program, source);
                DeployError::Spawn {
                    tool: self.program.clone(),
                    stage,
                    source,
                }
            })
    }
}

#[async_trait]
impl ImageBuilder for ContainerEngine {
    async fn build(&self, image: &ImageRef) -> Result<(), DeployError> {
        info!("Building {} from {}", image, self.context.display());

        let status = self
            .run(&self.build_args(image), DeployStage::Building)
            .await?;

        if !status.success() {
            error!("{} build exited unsuccessfully: {}", self.program, status);
            return Err(DeployError::Build {
                image: image.reference(),
                code: status.code(),
            });
        }

        info!("Built {}", image);
        Ok(())
    }

    async fn push(&self, image: &ImageRef) -> Result<(), DeployError> {
        info!("Pushing {}", image);

        let status = self.run(&self.push_args(image), DeployStage::Pushing).await?;

        if !status.success() {
            error!("{} push exited unsuccessfully: {}", self.program, status);
            return Err(DeployError::Push {
                image: image.reference(),
                code: status.code(),
            });
        }

        info!("Pushed {}", image);
        Ok(())
    }
}
