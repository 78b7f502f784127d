//! Doctor command handler
//!
//! Checks that a deploy could run: the engine answers, the build context
//! exists and the image and webhook are configured.

use anyhow::{Result, bail};
use colored::*;
use dockhand_client::WebhookClient;

use crate::config::Config;
use crate::engine::ContainerEngine;

/// Run all checks and print a report
///
/// Fails if any check fails, after printing every result.
pub async fn handle_doctor(config: &Config) -> Result<()> {
    let mut failures = 0;

    match ContainerEngine::from_command_line(&config.engine, config.context.clone()) {
        Some(engine) => match engine.check_available().await {
            Ok(version) => pass("Engine", &format!("{} ({})", engine.program(), version)),
            Err(e) => {
                fail("Engine", &e.to_string());
                failures += 1;
            }
        },
        None => {
            fail("Engine", "not configured");
            failures += 1;
        }
    }

    if config.context.is_dir() {
        pass("Context", &config.context.display().to_string());
    } else {
        fail(
            "Context",
            &format!("{} is not a directory", config.context.display()),
        );
        failures += 1;
    }

    let dockerfile = config
        .dockerfile
        .clone()
        .unwrap_or_else(|| config.context.join("Dockerfile"));
    if dockerfile.is_file() {
        pass("Dockerfile", &dockerfile.display().to_string());
    } else {
        fail(
            "Dockerfile",
            &format!(
                "{} not found (try 'dockhand init dockerfile')",
                dockerfile.display()
            ),
        );
        failures += 1;
    }

    match config.image(None) {
        Ok(image) => pass("Image", &image.name),
        Err(e) => {
            fail("Image", &e.to_string());
            failures += 1;
        }
    }

    let webhook = config
        .validate_webhook()
        .and_then(|()| config.require_webhook())
        .map_err(|e| e.to_string())
        .and_then(|url| WebhookClient::new(url).map_err(|e| e.to_string()));
    match webhook {
        Ok(client) => pass("Webhook", &client.redacted_url()),
        Err(e) => {
            fail("Webhook", &e);
            failures += 1;
        }
    }

    println!();
    if failures > 0 {
        bail!("{} check(s) failed", failures);
    }

    println!("{}", "✓ Ready to deploy".green().bold());
    Ok(())
}

fn pass(label: &str, detail: &str) {
    println!("  {} {:<12} {}", "✓".green(), label, detail.dimmed());
}

fn fail(label: &str, detail: &str) {
    println!("  {} {:<12} {}", "✗".red(), label, detail);
}
