use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stride_events::{EmailConfig, EmailDelivery};
use stride_worker::consumer::EmailConsumer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stride_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let gateway_url =
        std::env::var("QUEUE_GATEWAY_URL").context("QUEUE_GATEWAY_URL must be set")?;
    let email_config = EmailConfig::from_env()
        .context("SMTP_HOST must be set for the email worker")?;

    let consumer = EmailConsumer::new(gateway_url, EmailDelivery::new(email_config));
    consumer.run().await;

    Ok(())
}
