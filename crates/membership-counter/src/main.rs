//! Notification counting consumer
//!
//! Separate process that subscribes to the notification channel and keeps
//! running totals of the API resources. The counts live only in this
//! process; nothing is shared with the API server.

use anyhow::Result;
use clap::Parser;
use futures::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use membership_notify::{Notification, ResourceCounts, DEFAULT_CHANNEL};

/// Membership notification counter
#[derive(Parser, Debug)]
#[command(name = "membership-counter")]
#[command(about = "Track API resource counts from the notification channel", long_about = None)]
#[command(version)]
struct Cli {
    /// Redis URL to subscribe on
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    redis_url: String,

    /// Broker channel the notifications are published on
    #[arg(long, default_value = DEFAULT_CHANNEL)]
    channel: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let client = redis::Client::open(cli.redis_url.as_str())?;
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.subscribe(&cli.channel).await?;
    info!("Subscribed to channel {} on {}", cli.channel, cli.redis_url);

    let mut counts = ResourceCounts::new();
    let mut stream = pubsub.on_message();

    while let Some(message) = stream.next().await {
        let payload: String = match message.get_payload() {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Unreadable message payload: {}", e);
                continue;
            }
        };

        match serde_json::from_str::<Notification>(&payload) {
            Ok(notification) => {
                counts.apply(&notification);
                info!("Counts updated - {}", counts);
            }
            Err(e) => warn!("Skipping malformed notification {:?}: {}", payload, e),
        }
    }

    Ok(())
}

fn init_logging(log_level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}
