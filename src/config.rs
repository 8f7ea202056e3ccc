use crate::error::{env_error, Error, Result};
use chrono_tz::Tz;
use std::env;
use std::time::Duration;

/// Timezone that decides what "today" means
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Taipei;

/// Location shown when an event has none
pub const DEFAULT_LOCATION_PLACEHOLDER: &str = "世界的某個角落";

/// Footer label on every embed
pub const DEFAULT_FOOTER: &str = "黑客社行事曆";

/// Texts that are not taken from the feed itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageStyle {
    pub location_placeholder: String,
    pub footer: String,
}

impl Default for MessageStyle {
    fn default() -> Self {
        MessageStyle {
            location_placeholder: DEFAULT_LOCATION_PLACEHOLDER.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// iCalendar feed to poll
    pub calendar_url: String,
    /// Discord webhook receiving the summary
    pub webhook_url: String,
    pub timezone: Tz,
    pub style: MessageStyle,
    /// Overrides the HTTP client's default timeout when set
    pub http_timeout: Option<Duration>,
}

impl Config {
    pub fn new(calendar_url: impl Into<String>, webhook_url: impl Into<String>) -> Self {
        Config {
            calendar_url: calendar_url.into(),
            webhook_url: webhook_url.into(),
            timezone: DEFAULT_TIMEZONE,
            style: MessageStyle::default(),
            http_timeout: None,
        }
    }

    /// Load configuration from the environment, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup, `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let calendar_url = non_empty("CALENDAR_URL")
            .or_else(|| non_empty("CALENDER_URL"))
            .ok_or_else(|| env_error("CALENDAR_URL"))?;
        let webhook_url = non_empty("WEBHOOK_URL").ok_or_else(|| env_error("WEBHOOK_URL"))?;

        let timezone = match non_empty("NOTIFIER_TIMEZONE") {
            Some(name) => name
                .trim()
                .parse::<Tz>()
                .map_err(|_| Error::Config(format!("Unknown timezone: {}", name)))?,
            None => DEFAULT_TIMEZONE,
        };

        let mut style = MessageStyle::default();
        if let Some(placeholder) = non_empty("NOTIFIER_LOCATION_PLACEHOLDER") {
            style.location_placeholder = placeholder;
        }
        if let Some(footer) = non_empty("NOTIFIER_FOOTER") {
            style.footer = footer;
        }

        let http_timeout = match non_empty("NOTIFIER_HTTP_TIMEOUT_SECS") {
            Some(secs) => match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(Error::Config(format!(
                        "Invalid NOTIFIER_HTTP_TIMEOUT_SECS: {}",
                        secs
                    )))
                }
            },
            None => None,
        };

        Ok(Config {
            calendar_url,
            webhook_url,
            timezone,
            style,
            http_timeout,
        })
    }

    /// Host of the feed URL, safe to log unlike the full URL which may carry a token
    pub fn calendar_host(&self) -> Option<String> {
        let url = reqwest::Url::parse(self.calendar_url.trim()).ok()?;
        url.host_str().map(str::to_string)
    }

    /// HTTP client shared by feed retrieval and delivery
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.http_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
    }
}
