use crate::config::MessageStyle;
use crate::event::Event;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator between titles in the message content
pub const TITLE_SEPARATOR: &str = "、";
pub const TIME_FIELD_NAME: &str = "⏰️時間";
pub const LOCATION_FIELD_NAME: &str = "📍地點";

/// Body of a Discord webhook execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub content: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Discord timestamp marker, clients render it in the reader's own timezone
pub fn discord_timestamp(instant: DateTime<Utc>) -> String {
    format!("<t:{}:F>", instant.timestamp())
}

pub fn event_embed(event: &Event, style: &MessageStyle) -> Embed {
    let time = format!(
        "{} - {}",
        discord_timestamp(event.start),
        discord_timestamp(event.effective_end())
    );
    let location = event
        .location
        .clone()
        .unwrap_or_else(|| style.location_placeholder.clone());

    Embed {
        title: event.summary.clone(),
        description: String::new(),
        fields: vec![
            EmbedField {
                name: TIME_FIELD_NAME.to_string(),
                value: time,
                inline: true,
            },
            EmbedField {
                name: LOCATION_FIELD_NAME.to_string(),
                value: location,
                inline: true,
            },
        ],
        footer: EmbedFooter {
            text: style.footer.clone(),
        },
    }
}

/// One message for all of today's events, `None` when there is nothing to say
pub fn build_payload(events: &[&Event], style: &MessageStyle) -> Option<WebhookPayload> {
    if events.is_empty() {
        return None;
    }

    let content = events
        .iter()
        .map(|event| event.summary.as_str())
        .collect::<Vec<_>>()
        .join(TITLE_SEPARATOR);
    let embeds = events.iter().map(|event| event_embed(event, style)).collect();

    Some(WebhookPayload { content, embeds })
}
