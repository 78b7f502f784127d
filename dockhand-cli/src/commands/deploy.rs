//! Deploy command handlers
//!
//! `deploy`, `build`, `push` and `notify` all go through the steps of
//! [`DeployService`], so each step has exactly one implementation. Each
//! handler validates only the configuration it uses.

use anyhow::{Context, Result};
use colored::*;
use dockhand_client::{ClientError, WebhookClient};
use dockhand_core::domain::deploy::{DeployReport, DeployStage, NOTIFY_WARNING, NotifyStatus};
use dockhand_core::domain::image::ImageRef;
use std::sync::Arc;

use crate::config::Config;
use crate::engine::ContainerEngine;
use crate::error::DeployError;
use crate::service::{DeployService, send_notification};

/// Full deploy: build, push, notify
pub async fn handle_deploy(tag: Option<String>, json: bool, config: &Config) -> Result<()> {
    config.validate()?;
    let image = config.image(tag)?;
    let webhook = webhook_client(config)?;

    let mut service = DeployService::new(Arc::new(container_engine(config)?))
        .with_notifier(Arc::new(webhook));
    if !json {
        service = service.with_progress(print_stage);
    }

    let report = service.run(&image).await?;

    if json {
        let rendered = report.to_json().context("Failed to serialize deploy report")?;
        println!("{}", rendered);
    } else {
        print_notify_result(&report.notify);
    }

    if let Some(warning) = report.warning() {
        print_warning(warning, &report);
    }

    Ok(())
}

/// Build only
pub async fn handle_build(tag: Option<String>, config: &Config) -> Result<()> {
    config.validate_engine()?;
    let image = config.image(tag)?;
    let service = DeployService::new(Arc::new(container_engine(config)?));

    print_stage(DeployStage::Building, &image);
    service.build(&image).await?;
    println!("{} {}", "✓ Built".green().bold(), image.to_string().bold());

    Ok(())
}

/// Push only
pub async fn handle_push(tag: Option<String>, config: &Config) -> Result<()> {
    config.validate_engine()?;
    let image = config.image(tag)?;
    let service = DeployService::new(Arc::new(container_engine(config)?));

    print_stage(DeployStage::Pushing, &image);
    service.push(&image).await?;
    println!("{} {}", "✓ Pushed".green().bold(), image.to_string().bold());

    Ok(())
}

/// Webhook only; a failed call is still a successful command
pub async fn handle_notify(config: &Config) -> Result<()> {
    config.validate_webhook()?;
    let webhook = webhook_client(config)?;
    println!("{} Notifying {}", "▸".cyan(), webhook.redacted_url().dimmed());

    let status = send_notification(&webhook).await;
    print_notify_result(&status);

    if status.is_failed() {
        eprintln!("{}", NOTIFY_WARNING.yellow().bold());
    }

    Ok(())
}

/// Builds the container engine from configuration
fn container_engine(config: &Config) -> Result<ContainerEngine, DeployError> {
    ContainerEngine::from_command_line(&config.engine, config.context.clone())
        .map(|engine| engine.with_dockerfile(config.dockerfile.clone()))
        .ok_or_else(|| DeployError::Config("engine cannot be empty".to_string()))
}

/// Builds the webhook client from configuration
fn webhook_client(config: &Config) -> Result<WebhookClient, DeployError> {
    let url = config.require_webhook()?;

    let client = match config.webhook_timeout {
        Some(timeout) => WebhookClient::with_timeout(url, timeout),
        None => WebhookClient::new(url),
    };

    client.map_err(|e| match e {
        ClientError::InvalidUrl(msg) => DeployError::Config(format!("invalid webhook URL {}", msg)),
        other => DeployError::Config(other.to_string()),
    })
}

/// Print a stage transition
fn print_stage(stage: DeployStage, image: &ImageRef) {
    match stage {
        DeployStage::Idle => {}
        DeployStage::Building => {
            println!("{} Building {}", "▸".cyan(), image.to_string().bold())
        }
        DeployStage::Pushing => {
            println!("{} Pushing {}", "▸".cyan(), image.to_string().bold())
        }
        DeployStage::Notifying => println!("{} Notifying Portainer", "▸".cyan()),
        DeployStage::Done => println!("{}", "✓ Deploy complete".green().bold()),
        DeployStage::Aborted => eprintln!("{}", "✗ Deploy aborted".red().bold()),
    }
}

fn print_notify_result(status: &NotifyStatus) {
    match status {
        NotifyStatus::Delivered { status } => {
            println!("  Webhook:      {}", format!("accepted ({})", status).green())
        }
        NotifyStatus::Failed { reason } => println!("  Webhook:      {}", reason.red()),
        NotifyStatus::Skipped => println!("  Webhook:      {}", "skipped".dimmed()),
    }
}

fn print_warning(warning: &str, report: &DeployReport) {
    eprintln!("{}", warning.yellow().bold());
    eprintln!(
        "  {} is in the registry; redeploy it from Portainer manually.",
        report.image.to_string().cyan()
    );
}
