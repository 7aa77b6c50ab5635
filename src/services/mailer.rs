//! Mail delivery collaborator.
//!
//! The login flow only needs "send one HTML mail"; everything behind that is
//! an external service. `ResendMailer` talks to the Resend HTTP API when an
//! API key is configured, `LogMailer` stands in for local runs and tests.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(String),
    #[error("mail rejected by provider: status {status}")]
    Rejected { status: u16 },
}

#[derive(Debug, Clone)]
pub struct MailReceipt {
    pub id: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &[String], subject: &str, html: &str)
    -> Result<MailReceipt, MailError>;
}

/// Resend HTTP API client.
pub struct ResendMailer {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(http: reqwest::Client, api_key: String, from: String) -> Self {
        Self { http, api_key, from }
    }
}

#[derive(Deserialize)]
struct ResendResponse {
    id: Option<String>,
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(
        &self,
        to: &[String],
        subject: &str,
        html: &str,
    ) -> Result<MailReceipt, MailError> {
        let response = self
            .http
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "mail provider rejected send");
            return Err(MailError::Rejected { status: status.as_u16() });
        }

        let body: ResendResponse = response
            .json()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(MailReceipt { id: body.id })
    }
}

/// Logs instead of sending. Used when no mail credentials are configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(
        &self,
        to: &[String],
        subject: &str,
        html: &str,
    ) -> Result<MailReceipt, MailError> {
        info!(to = ?to, subject, body_len = html.len(), "mail delivery skipped (no provider configured)");
        Ok(MailReceipt { id: None })
    }
}
