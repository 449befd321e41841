// Transactional email
//
// Booking emails are best effort: callers log failures and carry on.

pub mod handlers;
pub mod notifier;
pub mod resend;
pub mod templates;

pub use notifier::BookingNotifier;
pub use resend::ResendMailer;
pub use templates::{escape_html, BookingSummary};

use async_trait::async_trait;
use serde::Serialize;

/// Errors raised by an email provider client
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("email provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email provider rejected the message ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// A single email to send
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Provider acknowledgement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub id: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, MailError>;
}
