//! Deploy service
//!
//! Runs a deploy as `Idle -> Building -> Pushing -> Notifying -> Done`.
//! Build and push failures abort the run. A failed webhook call only
//! produces a warning: the pushed image is still valid and can be
//! redeployed by hand.

use async_trait::async_trait;
use chrono::Utc;
use dockhand_client::{ClientError, WebhookClient};
use dockhand_core::domain::deploy::{DeployReport, DeployStage, NotifyStatus};
use dockhand_core::domain::image::ImageRef;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::DeployError;

/// Builds and publishes container images
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    /// Builds `image` from the build context
    async fn build(&self, image: &ImageRef) -> Result<(), DeployError>;

    /// Pushes `image` to its registry
    async fn push(&self, image: &ImageRef) -> Result<(), DeployError>;
}

/// Triggers a redeploy on the remote host
#[async_trait]
pub trait DeployNotifier: Send + Sync {
    /// Sends the redeploy request
    ///
    /// # Returns
    /// The HTTP status of a successful call
    async fn notify(&self) -> dockhand_client::Result<u16>;
}

#[async_trait]
impl DeployNotifier for WebhookClient {
    async fn notify(&self) -> dockhand_client::Result<u16> {
        WebhookClient::notify(self).await
    }
}

/// Calls `notifier` once and reports the outcome
///
/// Never fails: errors are logged and reported as [`NotifyStatus::Failed`].
/// This is the notify step of [`DeployService`], usable without a builder.
pub async fn send_notification(notifier: &dyn DeployNotifier) -> NotifyStatus {
    match notifier.notify().await {
        Ok(status) => {
            info!("Redeploy webhook accepted (status {})", status);
            NotifyStatus::Delivered { status }
        }
        Err(e) => {
            warn!("Redeploy webhook failed: {}", e);
            NotifyStatus::Failed {
                reason: failure_reason(&e),
            }
        }
    }
}

fn failure_reason(err: &ClientError) -> String {
    if err.is_timeout() {
        return "webhook request timed out".to_string();
    }

    match err.status() {
        Some(status) => format!("webhook answered {}", status),
        None => err.to_string(),
    }
}

type ProgressFn = Box<dyn Fn(DeployStage, &ImageRef) + Send + Sync>;

/// Drives build, push and notify for one image
pub struct DeployService {
    builder: Arc<dyn ImageBuilder>,
    notifier: Option<Arc<dyn DeployNotifier>>,
    progress: Option<ProgressFn>,
}

impl DeployService {
    /// Creates a service without a notifier; `notify` will be skipped
    pub fn new(builder: Arc<dyn ImageBuilder>) -> Self {
        Self {
            builder,
            notifier: None,
            progress: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn DeployNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Registers a callback invoked on every stage transition
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(DeployStage, &ImageRef) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Builds the image; fatal on failure
    pub async fn build(&self, image: &ImageRef) -> Result<(), DeployError> {
        self.builder.build(image).await
    }

    /// Pushes the image; fatal on failure
    pub async fn push(&self, image: &ImageRef) -> Result<(), DeployError> {
        self.builder.push(image).await
    }

    /// Calls the redeploy webhook once, see [`send_notification`]
    pub async fn notify(&self) -> NotifyStatus {
        match &self.notifier {
            Some(notifier) => send_notification(notifier.as_ref()).await,
            None => {
                debug!("No notifier configured, skipping redeploy webhook");
                NotifyStatus::Skipped
            }
        }
    }

    /// Runs a full deploy of `image`
    ///
    /// # Returns
    /// The run report, or the build/push error that aborted the run
    pub async fn run(&self, image: &ImageRef) -> Result<DeployReport, DeployError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut stage = DeployStage::Idle;

        info!("Starting deploy {} of {}", run_id, image);

        stage = self.advance(run_id, stage, image);
        if let Err(e) = self.build(image).await {
            self.abort(run_id, stage, image, &e);
            return Err(e);
        }

        stage = self.advance(run_id, stage, image);
        if let Err(e) = self.push(image).await {
            self.abort(run_id, stage, image, &e);
            return Err(e);
        }

        stage = self.advance(run_id, stage, image);
        let notify = self.notify().await;

        stage = self.advance(run_id, stage, image);
        info!("Deploy {} finished", run_id);

        Ok(DeployReport {
            run_id,
            image: image.clone(),
            stage,
            notify,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn advance(&self, run_id: Uuid, stage: DeployStage, image: &ImageRef) -> DeployStage {
        let next = stage.next().unwrap_or(stage);
        debug!("Deploy {}: {} -> {}", run_id, stage, next);
        self.report(next, image);
        next
    }

    fn abort(&self, run_id: Uuid, stage: DeployStage, image: &ImageRef, cause: &DeployError) {
        let next = stage.abort().unwrap_or(stage);
        error!("Deploy {} aborted while {}: {}", run_id, stage, cause);
        self.report(next, image);
    }

    fn report(&self, stage: DeployStage, image: &ImageRef) {
        if let Some(progress) = &self.progress {
            progress(stage, image);
        }
    }
}
