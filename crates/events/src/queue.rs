//! Outbound queue wire contracts and the HTTP gateway publisher.
//!
//! Messages are JSON documents POSTed to the queue gateway, which owns the
//! broker. Delivery to consumers is at-least-once; the email worker acks
//! only after a successful send and nacks (no requeue) on permanent
//! failure. Publishes happen strictly after the owning database
//! transaction has committed; a failed publish is logged by the caller and
//! never surfaces to the client whose request already committed.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use stride_core::types::DbId;

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single publish attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Wire contracts
// ---------------------------------------------------------------------------

/// Template parameters carried by every email job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailParams {
    pub project_title: String,
    pub task_title: String,
    pub role: Option<String>,
    pub position: Option<String>,
    pub project_id: DbId,
    /// Application page the email links to (e.g. `"tasks"`).
    pub page: String,
}

/// An email job consumed by the external email worker.
///
/// `type` selects the template; the worker renders subject and body from
/// it and the params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailJob {
    #[serde(rename = "type")]
    pub kind: String,
    pub to: String,
    pub params: EmailParams,
}

/// A file job consumed by the external object-storage worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FileJob {
    /// Move staged upload content under `key`.
    Upload {
        key: String,
        content_type: Option<String>,
        file_path: String,
    },
    /// Replace the content stored under `key`.
    Edit {
        key: String,
        content_type: Option<String>,
        file_path: String,
    },
    /// Delete the content stored under `key`.
    Remove { key: String },
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for queue publish failures.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Queue gateway returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// QueueConfig
// ---------------------------------------------------------------------------

/// Configuration for the queue gateway publisher.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Base URL of the queue gateway, without a trailing slash.
    pub gateway_url: String,
}

impl QueueConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `QUEUE_GATEWAY_URL` is not set, signalling that
    /// queue publishing is not configured and should be skipped.
    pub fn from_env() -> Option<Self> {
        let gateway_url = std::env::var("QUEUE_GATEWAY_URL").ok()?;
        Some(Self {
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// QueuePublisher
// ---------------------------------------------------------------------------

/// Publishes email and file jobs to the queue gateway.
pub struct QueuePublisher {
    client: reqwest::Client,
    config: QueueConfig,
}

impl QueuePublisher {
    /// Create a new publisher with a pre-configured HTTP client.
    pub fn new(config: QueueConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    /// Enqueue an email job.
    pub async fn publish_email(&self, job: &EmailJob) -> Result<(), QueueError> {
        let url = format!("{}/queues/email", self.config.gateway_url);
        let payload = serde_json::to_value(job).unwrap_or_default();
        self.post_with_retry(&url, &payload).await
    }

    /// Enqueue a file job.
    pub async fn publish_file(&self, job: &FileJob) -> Result<(), QueueError> {
        let url = format!("{}/queues/files", self.config.gateway_url);
        let payload = serde_json::to_value(job).unwrap_or_default();
        self.post_with_retry(&url, &payload).await
    }

    /// Deliver a payload to the gateway with retry.
    ///
    /// Retries up to 3 times with exponential backoff before giving up.
    /// Returns `Ok(())` on the first successful attempt.
    async fn post_with_retry(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<(), QueueError> {
        let mut last_err: Option<QueueError> = None;

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_post(url, payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url,
                        error = %e,
                        "Queue publish attempt failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_post(url, payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(url, error = %e, "Queue publish failed after all retries");
                Err(last_err.unwrap_or(e))
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_post(&self, url: &str, payload: &serde_json::Value) -> Result<(), QueueError> {
        let response = self.client.post(url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(QueueError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params() -> EmailParams {
        EmailParams {
            project_title: "Apollo".to_string(),
            task_title: "Fix login".to_string(),
            role: Some("manager".to_string()),
            position: None,
            project_id: 7,
            page: "tasks".to_string(),
        }
    }

    #[test]
    fn email_job_serializes_with_type_discriminator() {
        let job = EmailJob {
            kind: "task_under_review".to_string(),
            to: "lead@example.com".to_string(),
            params: sample_params(),
        };
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["type"], "task_under_review");
        assert_eq!(value["to"], "lead@example.com");
        assert_eq!(value["params"]["project_title"], "Apollo");
        assert_eq!(value["params"]["project_id"], 7);
    }

    #[test]
    fn email_job_round_trips() {
        let job = EmailJob {
            kind: "task_assigned".to_string(),
            to: "dev@example.com".to_string(),
            params: sample_params(),
        };
        let json = serde_json::to_string(&job).unwrap();
        let back: EmailJob = serde_json::from_str(&json).unwrap();
        assert_eq!(back, job);
    }

    #[test]
    fn file_job_serializes_with_action_tag() {
        let upload = FileJob::Upload {
            key: "tasks/1/abc".to_string(),
            content_type: Some("image/png".to_string()),
            file_path: "/tmp/staged/abc.png".to_string(),
        };
        let value = serde_json::to_value(&upload).unwrap();
        assert_eq!(value["action"], "upload");
        assert_eq!(value["key"], "tasks/1/abc");

        let remove = FileJob::Remove {
            key: "tasks/1/abc".to_string(),
        };
        let value = serde_json::to_value(&remove).unwrap();
        assert_eq!(value["action"], "remove");
        assert!(value.get("file_path").is_none());
    }

    #[test]
    fn config_from_env_requires_gateway_url_and_trims_slash() {
        // One test owns the variable so parallel tests cannot race on it.
        std::env::remove_var("QUEUE_GATEWAY_URL");
        assert!(QueueConfig::from_env().is_none());

        std::env::set_var("QUEUE_GATEWAY_URL", "http://broker.local/");
        let config = QueueConfig::from_env().unwrap();
        assert_eq!(config.gateway_url, "http://broker.local");
        std::env::remove_var("QUEUE_GATEWAY_URL");
    }

    #[test]
    fn queue_error_display_http_status() {
        let err = QueueError::HttpStatus(503);
        assert_eq!(err.to_string(), "Queue gateway returned HTTP 503");
    }
}
