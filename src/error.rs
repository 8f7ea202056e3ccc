use miette::Diagnostic;
use thiserror::Error;

/// Everything that can fail a notifier run
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// Feed or webhook unreachable, timed out, or the feed answered with a
    /// non-success status
    #[error("Network error: {0}")]
    #[diagnostic(code(calendar_notifier::network))]
    Network(String),

    #[error("Could not parse calendar feed: {0}")]
    #[diagnostic(code(calendar_notifier::parse))]
    Parse(String),

    /// The webhook answered with a non-success status
    #[error("Webhook delivery failed: {0}")]
    #[diagnostic(code(calendar_notifier::delivery))]
    Delivery(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(calendar_notifier::config),
        help("set CALENDAR_URL and WEBHOOK_URL in the environment or a .env file")
    )]
    Config(String),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(calendar_notifier::serialization))]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn env_error(var: &str) -> Error {
    Error::Config(format!("Missing environment variable: {}", var))
}

pub fn parse_error(message: impl Into<String>) -> Error {
    Error::Parse(message.into())
}
