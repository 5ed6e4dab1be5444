// # Webhook Notification Sink
//
// Posts pass summaries to a Discord-compatible webhook:
//
// ```http
// POST <url>
// Content-Type: application/json
//
// { "content": "[home-server] Updated home.example.com to 203.0.113.7" }
// ```
//
// The `[server]` prefix is omitted when no server name is configured.
// A non-2xx answer is a notification error; the reconciler logs it and moves on.

use ipsync_core::traits::NotificationSink;
use ipsync_core::{Error, Result};
use serde::Serialize;

/// Webhook payload
#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

/// Notification sink posting to a webhook URL
#[derive(Clone)]
pub struct WebhookSink {
    url: String,
    server_name: Option<String>,
    client: reqwest::Client,
}

// Webhook URLs embed their secret, keep them out of logs
impl std::fmt::Debug for WebhookSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSink")
            .field("url", &"<REDACTED>")
            .field("server_name", &self.server_name)
            .finish()
    }
}

impl WebhookSink {
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        server_name: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            server_name: server_name.filter(|name| !name.trim().is_empty()),
            client,
        }
    }

    /// Message text as posted, with the server prefix if any
    fn render(&self, message: &str) -> String {
        match &self.server_name {
            Some(name) => format!("[{}] {}", name, message),
            None => message.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl NotificationSink for WebhookSink {
    async fn send(&self, message: &str) -> Result<()> {
        let content = self.render(message);

        let response = self
            .client
            .post(&self.url)
            .json(&WebhookMessage { content: &content })
            .send()
            .await
            .map_err(|e| {
                Error::notification(format!("Webhook request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::notification(format!(
                "Webhook returned {}: {}",
                status, body
            )));
        }

        tracing::debug!("Webhook delivered ({})", status);
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "webhook"
    }
}
