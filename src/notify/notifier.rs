use std::sync::Arc;

use super::templates::{guest_confirmation, internal_notification, BookingSummary};
use super::{MailError, Mailer, OutgoingEmail, SentEmail};

/// Sends booking emails through a [`Mailer`]
#[derive(Clone)]
pub struct BookingNotifier {
    mailer: Arc<dyn Mailer>,
    from: String,
    notify_email: String,
    contact_email: String,
    contact_phone: String,
}

impl BookingNotifier {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        from: impl Into<String>,
        notify_email: impl Into<String>,
        contact_email: impl Into<String>,
        contact_phone: impl Into<String>,
    ) -> Self {
        Self {
            mailer,
            from: from.into(),
            notify_email: notify_email.into(),
            contact_email: contact_email.into(),
            contact_phone: contact_phone.into(),
        }
    }

    pub fn notify_email(&self) -> &str {
        &self.notify_email
    }

    /// Notify the B&B and confirm to the guest
    ///
    /// Failures are logged; one failed email does not stop the other.
    pub async fn notify_booking(&self, summary: &BookingSummary) {
        let (subject, html) = internal_notification(summary, false);
        if let Err(e) = self.send_to(&self.notify_email, subject, html).await {
            tracing::error!("Booking notification email failed: {}", e);
        }

        let guest = summary.email.trim();
        if guest.is_empty() {
            return;
        }
        let (subject, html) = guest_confirmation(summary, &self.contact_email, &self.contact_phone);
        if let Err(e) = self.send_to(guest, subject, html).await {
            tracing::error!("Guest confirmation email failed: {}", e);
        }
    }

    /// Send the internal notification for a sample booking
    pub async fn send_test(&self) -> Result<SentEmail, MailError> {
        let (subject, html) = internal_notification(&BookingSummary::sample(), true);
        self.send_to(&self.notify_email, subject, html).await
    }

    async fn send_to(&self, to: &str, subject: String, html: String) -> Result<SentEmail, MailError> {
        self.mailer
            .send(&OutgoingEmail {
                from: self.from.clone(),
                to: to.to_string(),
                subject,
                html,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingMailer;

    fn notifier(mailer: &RecordingMailer) -> BookingNotifier {
        BookingNotifier::new(
            Arc::new(mailer.clone()),
            "Ohana B&B Prenotazioni <prenotazioni@ohana-bnb.it>",
            "owner@ohana-bnb.it",
            "info@ohana-bnb.it",
            "+39 000",
        )
    }

    #[tokio::test]
    async fn test_sends_internal_and_guest_emails() {
        let mailer = RecordingMailer::default();
        notifier(&mailer).notify_booking(&BookingSummary::sample()).await;

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "owner@ohana-bnb.it");
        assert_eq!(sent[1].to, "test@example.com");
        assert_eq!(sent[1].subject, "Conferma prenotazione – Ohana B&B");
    }

    #[tokio::test]
    async fn test_no_guest_email_without_address() {
        let mailer = RecordingMailer::default();
        let mut summary = BookingSummary::sample();
        summary.email = String::new();
        notifier(&mailer).notify_booking(&summary).await;

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "owner@ohana-bnb.it");
    }

    #[tokio::test]
    async fn test_guest_email_attempted_after_internal_failure() {
        let mailer = RecordingMailer::failing();
        notifier(&mailer).notify_booking(&BookingSummary::sample()).await;
        assert_eq!(mailer.attempts().await, 2);
    }

    #[tokio::test]
    async fn test_send_test_goes_to_notify_address() {
        let mailer = RecordingMailer::default();
        notifier(&mailer).send_test().await.unwrap();

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.starts_with("[TEST]"));
        assert_eq!(sent[0].from, "Ohana B&B Prenotazioni <prenotazioni@ohana-bnb.it>");
    }
}
