//! Email queue consumer loop.
//!
//! Long-polls the queue gateway for email jobs and delivers them with
//! [`EmailDelivery`]. Ack/nack semantics:
//!
//! - successful send → ack (`DELETE /queues/email/{id}`)
//! - permanent failure (bad address, unbuildable message) → nack
//!   (`POST /queues/email/{id}/nack`), the job is not requeued
//! - transient failure (SMTP transport) → neither; the gateway redelivers
//!   after its visibility timeout

use std::time::Duration;

use serde::Deserialize;
use stride_events::delivery::email::EmailError;
use stride_events::{EmailDelivery, EmailJob};

/// Delay between polls when the queue is empty or the gateway is down.
const POLL_DELAY: Duration = Duration::from_secs(5);

/// HTTP request timeout for gateway calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A job leased from the gateway.
#[derive(Debug, Deserialize)]
struct LeasedJob {
    id: String,
    message: EmailJob,
}

/// Email queue consumer.
pub struct EmailConsumer {
    client: reqwest::Client,
    gateway_url: String,
    delivery: EmailDelivery,
}

impl EmailConsumer {
    /// Create a consumer against the given gateway URL.
    pub fn new(gateway_url: String, delivery: EmailDelivery) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            delivery,
        }
    }

    /// Run the consume loop indefinitely.
    ///
    /// This function never returns under normal operation. Gateway errors
    /// are logged and retried with a fixed delay.
    pub async fn run(&self) {
        tracing::info!(gateway = %self.gateway_url, "Email consumer started");

        loop {
            match self.poll().await {
                Ok(Some(job)) => self.process(job).await,
                Ok(None) => tokio::time::sleep(POLL_DELAY).await,
                Err(e) => {
                    tracing::error!(error = %e, "Queue poll failed");
                    tokio::time::sleep(POLL_DELAY).await;
                }
            }
        }
    }

    /// Lease the next email job, if any.
    async fn poll(&self) -> Result<Option<LeasedJob>, reqwest::Error> {
        let url = format!("{}/queues/email/next", self.gateway_url);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let leased = response.error_for_status()?.json::<LeasedJob>().await?;
        Ok(Some(leased))
    }

    /// Deliver one leased job and settle it with the gateway.
    async fn process(&self, leased: LeasedJob) {
        match self.delivery.deliver(&leased.message).await {
            Ok(()) => {
                if let Err(e) = self.ack(&leased.id).await {
                    // The send succeeded but the ack did not; the gateway
                    // will redeliver and the receiver may get a duplicate.
                    // At-least-once, by contract.
                    tracing::warn!(error = %e, job_id = %leased.id, "Ack failed after send");
                }
            }
            Err(EmailError::Address(e)) => {
                tracing::error!(
                    error = %e,
                    job_id = %leased.id,
                    to = %leased.message.to,
                    "Undeliverable address, dropping job"
                );
                self.nack_logged(&leased.id).await;
            }
            Err(EmailError::Build(e)) => {
                tracing::error!(error = %e, job_id = %leased.id, "Malformed job, dropping");
                self.nack_logged(&leased.id).await;
            }
            Err(EmailError::Transport(e)) => {
                tracing::warn!(
                    error = %e,
                    job_id = %leased.id,
                    "SMTP transport failure, leaving job for redelivery"
                );
            }
        }
    }

    /// Acknowledge a delivered job.
    async fn ack(&self, job_id: &str) -> Result<(), reqwest::Error> {
        let url = format!("{}/queues/email/{job_id}", self.gateway_url);
        self.client
            .delete(&url)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Negatively acknowledge a permanently failed job, logging ack
    /// transport errors.
    async fn nack_logged(&self, job_id: &str) {
        let url = format!("{}/queues/email/{job_id}/nack", self.gateway_url);
        let result = async {
            self.client
                .post(&url)
                .send()
                .await?
                .error_for_status()?;
            Ok::<_, reqwest::Error>(())
        }
        .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, job_id, "Nack failed");
        }
    }
}
