//! Server packaging recipe
//!
//! Declarative metadata for the container image of the deployed MCP server:
//! base image, runtime environment, exposed port and start command.
//! The values configure the deployed server, not Dockhand itself.

use serde::{Deserialize, Serialize};

/// Packaging metadata for the HTTP MCP server image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerPackaging {
    /// Base image for the build (e.g. `python:3.11-slim`)
    pub base_image: String,
    /// Working directory inside the image, also used as `PYTHONPATH`
    pub workdir: String,
    /// Dependency manifest installed before the sources are copied
    pub requirements: String,
    /// Server entry point script
    pub entrypoint: String,
    pub host: String,
    pub port: u16,
    /// Disable Python output buffering so logs reach the container runtime
    pub unbuffered: bool,
}

impl Default for ServerPackaging {
    fn default() -> Self {
        Self {
            base_image: "python:3.11-slim".to_string(),
            workdir: "/app".to_string(),
            requirements: "requirements.txt".to_string(),
            entrypoint: "fantasy_football_multi_league.py".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            unbuffered: true,
        }
    }
}

impl ServerPackaging {
    /// Runtime environment baked into the image, in declaration order
    pub fn environment(&self) -> Vec<(&'static str, String)> {
        vec![
            ("PORT", self.port.to_string()),
            ("HOST", self.host.clone()),
            ("PYTHONPATH", self.workdir.clone()),
            (
                "PYTHONUNBUFFERED",
                if self.unbuffered { "1" } else { "0" }.to_string(),
            ),
        ]
    }

    /// Start command using the server's HTTP transport
    pub fn command(&self) -> Vec<String> {
        vec![
            "python".to_string(),
            self.entrypoint.clone(),
            "--transport".to_string(),
            "http".to_string(),
            "--host".to_string(),
            self.host.clone(),
            "--port".to_string(),
            self.port.to_string(),
        ]
    }

    /// Renders the Dockerfile for this recipe
    pub fn render_dockerfile(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("FROM {}\n\n", self.base_image));
        out.push_str(&format!("WORKDIR {}\n\n", self.workdir));
        out.push_str(&format!("COPY {} .\n", self.requirements));
        out.push_str(&format!(
            "RUN pip install --no-cache-dir -r {}\n\n",
            self.requirements
        ));
        out.push_str("COPY . .\n\n");

        for (key, value) in self.environment() {
            out.push_str(&format!("ENV {}={}\n", key, value));
        }
        out.push('\n');

        out.push_str(&format!("EXPOSE {}\n\n", self.port));

        // Exec form; serde_json gives correctly quoted array elements
        let cmd = serde_json::to_string(&self.command()).unwrap_or_default();
        out.push_str(&format!("CMD {}\n", cmd));

        out
    }
}
