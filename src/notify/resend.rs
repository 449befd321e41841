use async_trait::async_trait;
use serde::Deserialize;

use super::{MailError, Mailer, OutgoingEmail, SentEmail};
use crate::config::ResendConfig;

/// Resend HTTP API client
#[derive(Clone)]
pub struct ResendMailer {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

impl ResendMailer {
    pub fn new(config: &ResendConfig) -> Result<Self, MailError> {
        Ok(Self {
            http: crate::http_client::build_client()?,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, MailError> {
        let response = self
            .http
            .post(format!("{}/emails", self.api_base))
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.to_string());
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let sent: SendResponse = response.json().await?;
        tracing::debug!("Email \"{}\" accepted by Resend", email.subject);
        Ok(SentEmail { id: sent.id })
    }
}
