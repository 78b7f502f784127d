//! Configuration module
//!
//! Settings for a Dockhand run: the image to ship, the container engine used
//! to build and push it, and the redeploy webhook. Values come from CLI
//! flags with environment variable fallbacks.

use dockhand_core::domain::image::{ImageRef, ParseImageRefError};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::DeployError;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Registry-qualified image name, without tag
    pub image_name: Option<String>,

    /// Redeploy webhook URL (e.g. a Portainer stack webhook)
    pub webhook_url: Option<String>,

    /// Request timeout for the webhook; `None` keeps the HTTP client default
    pub webhook_timeout: Option<Duration>,

    /// Container engine command line (e.g. "docker" or "podman --remote")
    pub engine: String,

    /// Build context directory
    pub context: PathBuf,

    /// Dockerfile path, relative to the working directory
    pub dockerfile: Option<PathBuf>,
}

impl Config {
    /// Creates a configuration with defaults for everything but the image
    pub fn new(image_name: Option<String>) -> Self {
        Self {
            image_name,
            webhook_url: None,
            webhook_timeout: None,
            engine: "docker".to_string(),
            context: PathBuf::from("."),
            dockerfile: None,
        }
    }

    /// Validates every value that is present
    ///
    /// Required-ness is checked per command by [`Config::image`] and
    /// [`Config::require_webhook`]. Commands that only need part of the
    /// configuration call the narrower `validate_*` checks instead.
    pub fn validate(&self) -> Result<(), DeployError> {
        self.validate_image()?;
        self.validate_webhook()?;
        self.validate_engine()
    }

    /// The image name must be non-empty and carry no tag of its own
    pub fn validate_image(&self) -> Result<(), DeployError> {
        let Some(name) = self.image_name.as_deref().map(str::trim) else {
            return Ok(());
        };

        if name.is_empty() {
            return Err(DeployError::Config("image name cannot be empty".to_string()));
        }

        let parsed: ImageRef = name
            .parse()
            .map_err(|e: ParseImageRefError| DeployError::Config(e.to_string()))?;
        if parsed.name != name {
            return Err(DeployError::Config(format!(
                "image name '{}' must not include a tag; pass the tag as an argument instead",
                name
            )));
        }

        Ok(())
    }

    pub fn validate_webhook(&self) -> Result<(), DeployError> {
        if self
            .webhook_url
            .as_deref()
            .is_some_and(|url| !url.starts_with("http://") && !url.starts_with("https://"))
        {
            return Err(DeployError::Config(
                "webhook URL must start with http:// or https://".to_string(),
            ));
        }

        if self.webhook_timeout.is_some_and(|t| t.is_zero()) {
            return Err(DeployError::Config(
                "webhook timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn validate_engine(&self) -> Result<(), DeployError> {
        if self.engine.trim().is_empty() {
            return Err(DeployError::Config("engine cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Image reference for this run, with the tag defaulting to `latest`
    pub fn image(&self, tag: Option<String>) -> Result<ImageRef, DeployError> {
        self.validate_image()?;
        let name = self.image_name.as_deref().ok_or_else(|| {
            DeployError::Config("image name is required (--image or DOCKHAND_IMAGE)".to_string())
        })?;
        Ok(ImageRef::new(name.trim(), tag))
    }

    /// Webhook URL, required by commands that notify
    pub fn require_webhook(&self) -> Result<&str, DeployError> {
        self.webhook_url.as_deref().ok_or_else(|| {
            DeployError::Config(
                "webhook URL is required (--webhook-url or DOCKHAND_WEBHOOK_URL)".to_string(),
            )
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}
