use calendar_notifier::{
    Config, FeedSource, HttpFeedSource, Notifier, Outcome, StdoutWebhook, Webhook,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Post today's calendar events to a Discord webhook
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print the payload instead of posting it
    #[arg(long, global = true)]
    dry_run: bool,

    /// Pretend it is this instant (RFC 3339) instead of now
    #[arg(long, global = true, value_parser = parse_instant)]
    at: Option<DateTime<Utc>>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scheduled run, exits non-zero when the run fails
    Run,
    /// Ad hoc run, prints OK whatever happens
    Request,
    /// Print today's events without sending anything
    List,
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| miette::miette!("Failed to set up logging: {}", e))?;

    Ok(())
}

async fn execute<S: FeedSource, W: Webhook>(
    notifier: Notifier<S, W>,
    cli: &Cli,
) -> miette::Result<()> {
    let now = cli.at.unwrap_or_else(Utc::now);

    match cli.command {
        Command::Run => match notifier.run_at(now).await? {
            Outcome::Idle => info!("No events today"),
            Outcome::Delivered { events } => info!(events, "Run finished"),
        },
        Command::Request => println!("{}", notifier.handle_request_at(now).await),
        Command::List => {
            let tz = notifier.config().timezone;
            for event in notifier.preview_at(now).await? {
                let start = event.start.with_timezone(&tz);
                let end = event.effective_end().with_timezone(&tz);
                match &event.location {
                    Some(location) => println!(
                        "{} - {}  {} @ {}",
                        start.format("%Y-%m-%d %H:%M"),
                        end.format("%Y-%m-%d %H:%M"),
                        event.summary,
                        location
                    ),
                    None => println!(
                        "{} - {}  {}",
                        start.format("%Y-%m-%d %H:%M"),
                        end.format("%Y-%m-%d %H:%M"),
                        event.summary
                    ),
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = Config::from_env()?;
    let calendar_host = config.calendar_host().unwrap_or_else(|| String::from("?"));
    info!(
        calendar_host = %calendar_host,
        timezone = %config.timezone,
        "Starting calendar notifier"
    );

    if cli.dry_run {
        let source = HttpFeedSource::new(config.http_client()?, &config.calendar_url);
        execute(Notifier::new(config, source, StdoutWebhook), &cli).await
    } else {
        execute(Notifier::from_config(config)?, &cli).await
    }
}
