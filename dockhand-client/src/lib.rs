//! Dockhand webhook client
//!
//! A small HTTP client for triggering a redeploy through a Portainer stack
//! webhook. One call, one POST, no body, no retry.
//!
//! # Example
//!
//! ```no_run
//! use dockhand_client::WebhookClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = WebhookClient::new("https://portainer.example.com/api/stacks/webhooks/abc")?;
//!
//!     let status = client.notify().await?;
//!     println!("Webhook answered {}", status);
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{ClientError, Result};

use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

/// HTTP client for a redeploy webhook
#[derive(Debug, Clone)]
pub struct WebhookClient {
    /// Full webhook URL, including any token in its path or query
    url: Url,
    /// HTTP client instance
    client: Client,
}

impl WebhookClient {
    /// Create a webhook client with the HTTP client's default settings
    ///
    /// # Arguments
    /// * `url` - The webhook URL (must be http or https)
    pub fn new(url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(url, Client::new())
    }

    /// Create a webhook client with an explicit request timeout
    ///
    /// # Arguments
    /// * `url` - The webhook URL
    /// * `timeout` - Total time allowed for the request
    pub fn with_timeout(url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(url, client)
    }

    /// Create a webhook client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc.
    pub fn with_client(url: impl AsRef<str>, client: Client) -> Result<Self> {
        let raw = url.as_ref();
        let url = Url::parse(raw).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                raw
            )));
        }

        Ok(Self { url, client })
    }

    /// Webhook URL safe to print: scheme, host and port only
    ///
    /// Portainer webhook URLs carry their token in the path.
    pub fn redacted_url(&self) -> String {
        match (self.url.host_str(), self.url.port()) {
            (Some(host), Some(port)) => format!("{}://{}:{}/…", self.url.scheme(), host, port),
            (Some(host), None) => format!("{}://{}/…", self.url.scheme(), host),
            _ => format!("{}://…", self.url.scheme()),
        }
    }

    /// Trigger the redeploy
    ///
    /// Sends a single POST without a body and returns the response status.
    /// Any non-2xx status is an error. The response body is never read.
    pub async fn notify(&self) -> Result<u16> {
        debug!("POST {}", self.redacted_url());

        let response = self.client.post(self.url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ClientError::ApiError {
                status: status.as_u16(),
            });
        }

        debug!("Webhook answered {}", status);
        Ok(status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, extract::State, http::StatusCode, routing::post};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serve `router` on an ephemeral local port and return a webhook URL
    async fn spawn_webhook(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api/stacks/webhooks/abc-123", addr)
    }

    fn counting_webhook(status: StatusCode) -> (Router, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/api/stacks/webhooks/{id}",
                post(
                    move |State(hits): State<Arc<AtomicUsize>>, body: String| async move {
                        assert!(body.is_empty());
                        hits.fetch_add(1, Ordering::SeqCst);
                        status
                    },
                ),
            )
            .with_state(hits.clone());
        (router, hits)
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(
            WebhookClient::new("ftp://example.com/hook"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            WebhookClient::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_redacted_url_hides_token() {
        let client =
            WebhookClient::new("https://portainer.example.com:9443/api/stacks/webhooks/secret")
                .unwrap();
        let shown = client.redacted_url();
        assert_eq!(shown, "https://portainer.example.com:9443/…");
        assert!(!shown.contains("secret"));
    }

    #[tokio::test]
    async fn test_notify_success() {
        let (router, hits) = counting_webhook(StatusCode::NO_CONTENT);
        let url = spawn_webhook(router).await;

        let client = WebhookClient::new(&url).unwrap();
        let status = client.notify().await.unwrap();

        assert_eq!(status, 204);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_notify_non_success_status_is_error_without_retry() {
        let (router, hits) = counting_webhook(StatusCode::INTERNAL_SERVER_ERROR);
        let url = spawn_webhook(router).await;

        let client = WebhookClient::new(&url).unwrap();
        let err = client.notify().await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_notify_error_ignores_response_body() {
        let router = Router::new().route(
            "/api/stacks/webhooks/{id}",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream stack token-abc failed") }),
        );
        let url = spawn_webhook(router).await;

        let client = WebhookClient::new(&url).unwrap();
        let err = client.notify().await.unwrap_err();

        assert!(matches!(err, ClientError::ApiError { status: 502 }));
        assert_eq!(err.to_string(), "Webhook answered with status 502");
        assert!(!err.to_string().contains("token-abc"));
    }

    #[tokio::test]
    async fn test_notify_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = WebhookClient::new(format!("http://{}/hook", addr)).unwrap();
        let err = client.notify().await.unwrap_err();

        assert!(matches!(err, ClientError::RequestFailed(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_notify_timeout() {
        let router = Router::new().route(
            "/api/stacks/webhooks/{id}",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );
        let url = spawn_webhook(router).await;

        let client = WebhookClient::with_timeout(&url, Duration::from_millis(100)).unwrap();
        let err = client.notify().await.unwrap_err();

        assert!(err.is_timeout());
    }
}
