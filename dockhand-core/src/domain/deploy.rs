//! Deploy run domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::image::ImageRef;

/// Message emitted when the redeploy webhook could not be reached
pub const NOTIFY_WARNING: &str = "Warning: Failed to notify Portainer";

/// Stage of a deploy run
///
/// Success path: `Idle -> Building -> Pushing -> Notifying -> Done`.
/// `Aborted` is reachable only from `Building` or `Pushing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeployStage {
    Idle,
    Building,
    Pushing,
    Notifying,
    Done,
    Aborted,
}

impl DeployStage {
    /// Successor on the success path, `None` for terminal stages
    pub fn next(self) -> Option<DeployStage> {
        match self {
            DeployStage::Idle => Some(DeployStage::Building),
            DeployStage::Building => Some(DeployStage::Pushing),
            DeployStage::Pushing => Some(DeployStage::Notifying),
            // Notifying completes regardless of the webhook outcome
            DeployStage::Notifying => Some(DeployStage::Done),
            DeployStage::Done | DeployStage::Aborted => None,
        }
    }

    /// Whether a tool failure in this stage aborts the run
    pub fn can_abort(self) -> bool {
        matches!(self, DeployStage::Building | DeployStage::Pushing)
    }

    /// Transition to `Aborted`, if allowed from this stage
    pub fn abort(self) -> Option<DeployStage> {
        self.can_abort().then_some(DeployStage::Aborted)
    }
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployStage::Idle => "idle",
            DeployStage::Building => "building",
            DeployStage::Pushing => "pushing",
            DeployStage::Notifying => "notifying",
            DeployStage::Done => "done",
            DeployStage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Outcome of the redeploy webhook call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotifyStatus {
    /// Webhook answered with a 2xx status
    Delivered { status: u16 },
    /// Request failed (network error, timeout or non-2xx status)
    Failed { reason: String },
    /// Notification was not attempted
    Skipped,
}

impl NotifyStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, NotifyStatus::Failed { .. })
    }
}

/// Summary of a completed deploy run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployReport {
    pub run_id: Uuid,
    pub image: ImageRef,
    pub stage: DeployStage,
    pub notify: NotifyStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DeployReport {
    /// Warning to show the user, present only when the webhook failed
    pub fn warning(&self) -> Option<&'static str> {
        self.notify.is_failed().then_some(NOTIFY_WARNING)
    }

    /// Render the report as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
