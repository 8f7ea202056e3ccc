use crate::error::{Error, Result};
use crate::payload::WebhookPayload;
use async_trait::async_trait;
use std::io::Write;
use tracing::info;

/// Longest piece of an error response kept in the error message
const BODY_EXCERPT_LEN: usize = 200;

/// Where the finished message goes
#[async_trait]
pub trait Webhook: Send + Sync {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<()>;
}

/// Posts the payload as JSON to a Discord webhook URL
#[derive(Debug, Clone)]
pub struct HttpWebhook {
    client: reqwest::Client,
    url: String,
}

impl HttpWebhook {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        HttpWebhook {
            client,
            url: url.trim().to_string(),
        }
    }
}

#[async_trait]
impl Webhook for HttpWebhook {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<()> {
        // .json() sets Content-Type: application/json
        let response = self.client.post(&self.url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(BODY_EXCERPT_LEN).collect();
            return Err(Error::Delivery(format!("webhook answered {}: {}", status, excerpt)));
        }

        info!(embeds = payload.embeds.len(), %status, "Delivered notification");
        Ok(())
    }
}

/// Prints the payload instead of sending it
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutWebhook;

#[async_trait]
impl Webhook for StdoutWebhook {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<()> {
        let json = serde_json::to_string_pretty(payload)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", json)
            .map_err(|e| Error::Delivery(format!("could not write to stdout: {}", e)))?;
        Ok(())
    }
}
