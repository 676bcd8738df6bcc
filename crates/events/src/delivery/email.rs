//! Email delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send the
//! plain-text emails described by queued [`EmailJob`]s. Configuration is
//! loaded from environment variables; if `SMTP_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and no mailer should be
//! constructed.

use crate::queue::EmailJob;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@stride.local";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                 |
    /// |-----------------|----------|-------------------------|
    /// | `SMTP_HOST`     | yes      | —                       |
    /// | `SMTP_PORT`     | no       | `587`                   |
    /// | `SMTP_FROM`     | no       | `noreply@stride.local`  |
    /// | `SMTP_USER`     | no       | —                       |
    /// | `SMTP_PASSWORD` | no       | —                       |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render a queued email job into a subject and plain-text body.
///
/// Unknown template kinds get a generic rendering rather than an error:
/// the queue contract is shared with other producers and a new template
/// must not make the worker nack valid jobs.
pub fn render(job: &EmailJob) -> (String, String) {
    let p = &job.params;
    let subject = match job.kind.as_str() {
        "task_under_review" => format!("[{}] Task ready for review: {}", p.project_title, p.task_title),
        "task_rejected" => format!("[{}] Task sent back: {}", p.project_title, p.task_title),
        "task_closed" => format!("[{}] Task closed: {}", p.project_title, p.task_title),
        "task_assigned" => format!("[{}] New task for you: {}", p.project_title, p.task_title),
        "task_reassigned" => format!("[{}] Task reassigned to you: {}", p.project_title, p.task_title),
        "task_unassigned" => format!("[{}] Task reassigned: {}", p.project_title, p.task_title),
        other => format!("[{}] {}: {}", p.project_title, other, p.task_title),
    };

    let mut body = format!(
        "Project: {}\nTask: {}\n",
        p.project_title, p.task_title
    );
    if let Some(role) = &p.role {
        body.push_str(&format!("Role: {role}\n"));
    }
    if let Some(position) = &p.position {
        body.push_str(&format!("Position: {position}\n"));
    }
    body.push_str(&format!(
        "\nOpen the {} page of project {} for details.\n",
        p.page, p.project_id
    ));

    (subject, body)
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends queued notification emails via SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    /// Create a new email delivery service with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Render and send a queued email job.
    pub async fn deliver(&self, job: &EmailJob) -> Result<(), EmailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let (subject, body) = render(job);

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(job.to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = %job.to, kind = %job.kind, "Notification email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::EmailParams;

    fn job(kind: &str) -> EmailJob {
        EmailJob {
            kind: kind.to_string(),
            to: "dev@example.com".to_string(),
            params: EmailParams {
                project_title: "Apollo".to_string(),
                task_title: "Fix login".to_string(),
                role: Some("member".to_string()),
                position: Some("Backend".to_string()),
                project_id: 7,
                page: "tasks".to_string(),
            },
        }
    }

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        // Ensure SMTP_HOST is not set in the test environment.
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[test]
    fn render_known_template() {
        let (subject, body) = render(&job("task_under_review"));
        assert_eq!(subject, "[Apollo] Task ready for review: Fix login");
        assert!(body.contains("Project: Apollo"));
        assert!(body.contains("Role: member"));
        assert!(body.contains("Position: Backend"));
    }

    #[test]
    fn render_unknown_template_falls_back_generically() {
        let (subject, _body) = render(&job("task_archived"));
        assert!(subject.contains("task_archived"));
        assert!(subject.contains("Fix login"));
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }

    #[test]
    fn email_error_display_address() {
        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err = EmailError::Address(addr_err.unwrap_err());
        assert!(err.to_string().contains("Email address parse error"));
    }
}
