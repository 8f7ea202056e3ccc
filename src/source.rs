use crate::error::{Error, Result};
use async_trait::async_trait;
use tracing::info;

/// Where the raw calendar text comes from
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;
}

/// Fetches the feed over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        HttpFeedSource {
            client,
            url: normalize_url(url),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!(
                "calendar feed answered {} for {}",
                status, self.url
            )));
        }

        let body = response.text().await?;
        info!(bytes = body.len(), "Fetched calendar feed");
        Ok(body)
    }
}

/// `webcal://` is plain HTTPS as far as fetching goes
fn normalize_url(url: &str) -> String {
    let url = url.trim();
    match url.get(..9) {
        Some(scheme) if scheme.eq_ignore_ascii_case("webcal://") => format!("https://{}", &url[9..]),
        _ => url.to_string(),
    }
}
