// Payment-completion webhook processing

use std::sync::Arc;

use crate::blocked::{BlockedPeriodRepository, NewBlockedPeriod};
use crate::error::ApiError;
use crate::notify::{BookingNotifier, BookingSummary};
use crate::payments::{CompletedCheckout, PaymentError, PaymentGateway, WebhookEvent};
use crate::rooms::RoomId;
use crate::validation::{non_blank, parse_stay};

/// Note attached to blocks created from a payment
pub const ONLINE_BOOKING_NOTE: &str = "Prenotazione online";

/// What a verified delivery led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Event type the site does not act on
    Ignored,
    /// Dates blocked and notifications attempted
    Recorded { block_id: String },
    /// Metadata did not describe a valid stay; notifications still attempted
    NotBlocked,
    /// Session already recorded by an earlier delivery
    Duplicate,
}

#[derive(Clone)]
pub struct WebhookService {
    blocked: BlockedPeriodRepository,
    gateway: Option<Arc<dyn PaymentGateway>>,
    notifier: Option<BookingNotifier>,
}

impl WebhookService {
    pub fn new(
        blocked: BlockedPeriodRepository,
        gateway: Option<Arc<dyn PaymentGateway>>,
        notifier: Option<BookingNotifier>,
    ) -> Self {
        Self {
            blocked,
            gateway,
            notifier,
        }
    }

    /// Verify and process one delivery
    ///
    /// Errors are only returned before the event is verified. Once verified,
    /// storage and email failures are logged and the delivery is acknowledged.
    pub async fn handle(&self, payload: &[u8], signature: Option<&str>) -> Result<WebhookOutcome, ApiError> {
        let gateway = self
            .gateway
            .as_ref()
            .ok_or_else(|| ApiError::NotConfigured("Webhook non configurato.".to_string()))?;
        let signature =
            non_blank(signature).ok_or_else(|| ApiError::Validation("Firma mancante.".to_string()))?;

        let event = gateway.parse_webhook(payload, signature).map_err(|e| match e {
            PaymentError::WebhookNotConfigured => {
                ApiError::NotConfigured("Webhook non configurato.".to_string())
            }
            other => {
                tracing::warn!("Rejected webhook delivery: {}", other);
                ApiError::Validation("Verifica firma fallita.".to_string())
            }
        })?;

        match event {
            WebhookEvent::Ignored { kind } => {
                tracing::debug!("Ignoring webhook event {}", kind);
                Ok(WebhookOutcome::Ignored)
            }
            WebhookEvent::CheckoutCompleted(checkout) => Ok(self.record_booking(&checkout).await),
        }
    }

    async fn record_booking(&self, checkout: &CompletedCheckout) -> WebhookOutcome {
        match self.blocked.find_by_session(&checkout.session_id).await {
            Ok(Some(_)) => {
                tracing::info!("Session {} already recorded, skipping", checkout.session_id);
                return WebhookOutcome::Duplicate;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(
                "Cannot check whether session {} was already recorded: {}",
                checkout.session_id,
                e
            ),
        }

        let outcome = match stay_from(checkout) {
            Some((room_id, check_in, check_out)) => {
                let block = self
                    .blocked
                    .add(NewBlockedPeriod {
                        room_id,
                        check_in,
                        check_out,
                        note: Some(ONLINE_BOOKING_NOTE.to_string()),
                        session_id: Some(checkout.session_id.clone()),
                    })
                    .await;
                tracing::info!(
                    "Blocked {} {} -> {} for session {}",
                    room_id,
                    check_in,
                    check_out,
                    checkout.session_id
                );
                WebhookOutcome::Recorded { block_id: block.id }
            }
            None => {
                tracing::warn!(
                    "Session {} has no valid room or dates in metadata, not blocking",
                    checkout.session_id
                );
                WebhookOutcome::NotBlocked
            }
        };

        match &self.notifier {
            Some(notifier) => {
                notifier
                    .notify_booking(&BookingSummary::from_checkout(checkout))
                    .await
            }
            None => tracing::warn!("RESEND_API_KEY not set: booking notification not sent"),
        }

        outcome
    }
}

fn stay_from(checkout: &CompletedCheckout) -> Option<(RoomId, chrono::NaiveDate, chrono::NaiveDate)> {
    let metadata = &checkout.metadata;
    let room: RoomId = metadata.room_id.trim().parse().ok()?;
    let (check_in, check_out) = parse_stay(&metadata.check_in, &metadata.check_out)?;
    Some((room, check_in, check_out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use crate::test_support::{FakeGateway, FlakyKvStore, RecordingMailer};

    fn completed_event(session_id: &str, room: &str) -> Vec<u8> {
        serde_json::json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": session_id,
                "customer_email": "guest@example.com",
                "amount_total": 18000,
                "metadata": {
                    "roomId": room,
                    "checkIn": "2025-06-01",
                    "checkOut": "2025-06-05",
                    "guests": "2",
                    "name": "Mario Rossi",
                    "phone": "",
                    "nights": "4"
                }
            }}
        })
        .to_string()
        .into_bytes()
    }

    struct Fixture {
        service: WebhookService,
        blocked: BlockedPeriodRepository,
        mailer: RecordingMailer,
    }

    fn fixture() -> Fixture {
        let blocked = BlockedPeriodRepository::new(Arc::new(MemoryKvStore::new()));
        let mailer = RecordingMailer::default();
        let notifier = BookingNotifier::new(
            Arc::new(mailer.clone()),
            "Ohana B&B Prenotazioni <prenotazioni@ohana-bnb.it>",
            "owner@ohana-bnb.it",
            "info@ohana-bnb.it",
            "+39 000",
        );
        let service = WebhookService::new(
            blocked.clone(),
            Some(Arc::new(FakeGateway::default())),
            Some(notifier),
        );
        Fixture {
            service,
            blocked,
            mailer,
        }
    }

    #[tokio::test]
    async fn test_completed_event_blocks_dates_and_notifies() {
        let fx = fixture();
        let payload = completed_event("cs_1", "sun");
        let outcome = fx
            .service
            .handle(&payload, Some(&FakeGateway::sign(&payload)))
            .await
            .unwrap();
        assert!(matches!(outcome, WebhookOutcome::Recorded { .. }));

        let blocks = fx.blocked.list().await;
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].room_id, RoomId::Sun);
        assert_eq!(blocks[0].note.as_deref(), Some(ONLINE_BOOKING_NOTE));
        assert_eq!(blocks[0].session_id.as_deref(), Some("cs_1"));
        assert_eq!(fx.mailer.sent().await.len(), 2);
    }

    #[tokio::test]
    async fn test_redelivery_creates_one_block() {
        let fx = fixture();
        let payload = completed_event("cs_1", "moon");
        let signature = FakeGateway::sign(&payload);

        fx.service.handle(&payload, Some(&signature)).await.unwrap();
        let second = fx.service.handle(&payload, Some(&signature)).await.unwrap();

        assert_eq!(second, WebhookOutcome::Duplicate);
        assert_eq!(fx.blocked.list().await.len(), 1);
        assert_eq!(fx.mailer.sent().await.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_room_still_notifies() {
        let fx = fixture();
        let payload = completed_event("cs_2", "mars");
        let outcome = fx
            .service
            .handle(&payload, Some(&FakeGateway::sign(&payload)))
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::NotBlocked);
        assert!(fx.blocked.list().await.is_empty());
        assert_eq!(fx.mailer.sent().await.len(), 2);
    }

    #[tokio::test]
    async fn test_other_events_acknowledged() {
        let fx = fixture();
        let payload = br#"{"id":"evt_9","type":"charge.refunded","data":{"object":{}}}"#.to_vec();
        let outcome = fx
            .service
            .handle(&payload, Some(&FakeGateway::sign(&payload)))
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Ignored);
        assert!(fx.mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_signature() {
        let fx = fixture();
        let payload = completed_event("cs_3", "sun");
        let error = fx.service.handle(&payload, None).await.unwrap_err();
        assert_eq!(error.to_string(), "Firma mancante.");
        let error = fx.service.handle(&payload, Some("  ")).await.unwrap_err();
        assert_eq!(error.to_string(), "Firma mancante.");
    }

    #[tokio::test]
    async fn test_bad_signature_has_no_side_effects() {
        let fx = fixture();
        let payload = completed_event("cs_4", "sun");
        let signature = FakeGateway::sign(b"something else");
        assert!(matches!(
            fx.service.handle(&payload, Some(&signature)).await,
            Err(ApiError::Validation(_))
        ));
        assert!(fx.blocked.list().await.is_empty());
        assert!(fx.mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_not_configured() {
        let blocked = BlockedPeriodRepository::new(Arc::new(MemoryKvStore::new()));
        let service = WebhookService::new(blocked, None, None);
        assert!(matches!(
            service.handle(b"{}", Some("t=1,v1=00")).await,
            Err(ApiError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_without_notifier_still_blocks() {
        let blocked = BlockedPeriodRepository::new(Arc::new(MemoryKvStore::new()));
        let service = WebhookService::new(blocked.clone(), Some(Arc::new(FakeGateway::default())), None);
        let payload = completed_event("cs_5", "earth");
        service
            .handle(&payload, Some(&FakeGateway::sign(&payload)))
            .await
            .unwrap();
        assert_eq!(blocked.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_store_keeps_existing_blocks() {
        let kv = Arc::new(FlakyKvStore::new());
        let blocked = BlockedPeriodRepository::new(kv.clone());
        let existing = blocked
            .add(NewBlockedPeriod {
                room_id: RoomId::Sun,
                check_in: "2025-06-01".parse().unwrap(),
                check_out: "2025-06-05".parse().unwrap(),
                note: None,
                session_id: None,
            })
            .await;
        let service = WebhookService::new(blocked.clone(), Some(Arc::new(FakeGateway::default())), None);

        kv.fail_next_gets(2);
        let payload = completed_event("cs_6", "moon");
        let outcome = service
            .handle(&payload, Some(&FakeGateway::sign(&payload)))
            .await
            .unwrap();

        assert!(matches!(outcome, WebhookOutcome::Recorded { .. }));
        assert_eq!(blocked.list().await, vec![existing]);
    }
}
