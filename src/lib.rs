//! Posts the events of an iCalendar feed that happen today to a Discord webhook.

pub mod config;
pub mod delivery;
pub mod error;
pub mod event;
pub mod feed;
pub mod notifier;
pub mod payload;
pub mod source;
pub mod today;

pub use config::{Config, MessageStyle};
pub use delivery::{HttpWebhook, StdoutWebhook, Webhook};
pub use error::{Error, Result};
pub use event::{Component, Event};
pub use feed::{parse_feed, Feed};
pub use notifier::{Notifier, Outcome};
pub use payload::{build_payload, WebhookPayload};
pub use source::{FeedSource, HttpFeedSource};
pub use today::{civil_date, events_today};
