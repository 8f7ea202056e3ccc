use crate::config::Config;
use crate::delivery::{HttpWebhook, Webhook};
use crate::error::Result;
use crate::event::Event;
use crate::feed::parse_feed;
use crate::payload::build_payload;
use crate::source::{FeedSource, HttpFeedSource};
use crate::today::{events_today, today};
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Response body of the ad hoc trigger, whatever happened
pub const REQUEST_ACK: &str = "OK";

/// What a run ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing happens today, nothing was sent
    Idle,
    /// One message carrying this many events was delivered
    Delivered { events: usize },
}

/// Fetch, parse, filter and deliver, once per invocation
pub struct Notifier<S, W> {
    config: Config,
    source: S,
    webhook: W,
}

impl Notifier<HttpFeedSource, HttpWebhook> {
    /// Production wiring, both ends over one HTTP client
    pub fn from_config(config: Config) -> Result<Self> {
        let client = config.http_client()?;
        let source = HttpFeedSource::new(client.clone(), &config.calendar_url);
        let webhook = HttpWebhook::new(client, &config.webhook_url);
        Ok(Notifier::new(config, source, webhook))
    }
}

impl<S: FeedSource, W: Webhook> Notifier<S, W> {
    pub fn new(config: Config, source: S, webhook: W) -> Self {
        Notifier {
            config,
            source,
            webhook,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Today's events as of `now`, without delivering anything
    pub async fn preview_at(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let text = self.source.fetch().await?;
        let feed = parse_feed(&text, self.config.timezone)?;
        let events = events_today(&feed, self.config.timezone, now)
            .into_iter()
            .cloned()
            .collect();
        Ok(events)
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<Outcome> {
        let tz = self.config.timezone;
        let text = self.source.fetch().await?;
        let feed = parse_feed(&text, tz)?;
        let events = events_today(&feed, tz, now);
        info!(
            day = %today(now, tz),
            timezone = %tz,
            matched = events.len(),
            "Filtered calendar feed"
        );

        let payload = match build_payload(&events, &self.config.style) {
            Some(payload) => payload,
            None => return Ok(Outcome::Idle),
        };
        self.webhook.deliver(&payload).await?;

        Ok(Outcome::Delivered {
            events: events.len(),
        })
    }

    pub async fn run(&self) -> Result<Outcome> {
        self.run_at(Utc::now()).await
    }

    /// Timer trigger, a failed run is reported to the caller
    pub async fn handle_scheduled(&self) -> Result<Outcome> {
        self.run().await
    }

    /// Ad hoc trigger, always acknowledges
    pub async fn handle_request(&self) -> &'static str {
        self.handle_request_at(Utc::now()).await
    }

    pub async fn handle_request_at(&self, now: DateTime<Utc>) -> &'static str {
        if let Err(e) = self.run_at(now).await {
            error!("Notifier run failed: {}", e);
        }
        REQUEST_ACK
    }
}
