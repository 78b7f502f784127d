//! Deploy error types
//!
//! Build and push failures are fatal and abort the run. Webhook failures are
//! never represented here: the deploy service downgrades them to a warning.

use dockhand_core::domain::deploy::DeployStage;
use thiserror::Error;

/// Errors that abort a deploy run
#[derive(Debug, Error)]
pub enum DeployError {
    /// Container build tool exited unsuccessfully
    #[error("Image build failed for {image} ({})", describe_exit(.code))]
    Build { image: String, code: Option<i32> },

    /// Registry push tool exited unsuccessfully
    #[error("Image push failed for {image} ({})", describe_exit(.code))]
    Push { image: String, code: Option<i32> },

    /// Container engine could not be started at all
    #[error("Failed to run '{tool}' while {stage}: {source}")]
    Spawn {
        tool: String,
        stage: DeployStage,
        #[source]
        source: std::io::Error,
    },

    /// Missing or invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DeployError {
    /// Process exit code for this error
    ///
    /// Tool failures propagate the tool's own exit status. Signals and spawn
    /// failures map to 1, configuration errors to 2.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Build { code, .. } | Self::Push { code, .. } => match code {
                Some(code) => (*code).clamp(1, 255) as u8,
                None => 1,
            },
            Self::Spawn { .. } => 1,
            Self::Config(_) => 2,
        }
    }

    /// Stage the run was in when this error occurred, if any
    pub fn stage(&self) -> Option<DeployStage> {
        match self {
            Self::Build { .. } => Some(DeployStage::Building),
            Self::Push { .. } => Some(DeployStage::Pushing),
            Self::Spawn { stage, .. } => Some(*stage),
            Self::Config(_) => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}
