// In-process fakes shared by unit and handler tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::kv::{KvError, KvStore, MemoryKvStore};
use crate::notify::{MailError, Mailer, OutgoingEmail, SentEmail};
use crate::payments::{
    stripe, CheckoutSessionRequest, CreatedSession, PaymentError, PaymentGateway, WebhookEvent,
};

/// Backend whose every call fails
pub struct FailingKvStore;

#[async_trait]
impl KvStore for FailingKvStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, KvError> {
        Err(KvError::Unavailable("backend down".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), KvError> {
        Err(KvError::Unavailable("backend down".to_string()))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

/// In-memory backend whose next reads can be made to fail
#[derive(Default)]
pub struct FlakyKvStore {
    inner: MemoryKvStore,
    failing_gets: AtomicUsize,
}

impl FlakyKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_gets(&self, count: usize) {
        self.failing_gets.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl KvStore for FlakyKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let failed = self
            .failing_gets
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(KvError::Unavailable("transient read failure".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.inner.set(key, value).await
    }

    fn backend(&self) -> &'static str {
        "flaky"
    }
}

/// Mailer that records messages instead of sending them
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    attempts: Arc<Mutex<usize>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }

    pub async fn attempts(&self) -> usize {
        *self.attempts.lock().await
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, MailError> {
        *self.attempts.lock().await += 1;
        if self.fail {
            return Err(MailError::Rejected {
                status: 422,
                message: "domain not verified".to_string(),
            });
        }
        self.sent.lock().await.push(email.clone());
        Ok(SentEmail {
            id: Some("email_test".to_string()),
        })
    }
}

/// Webhook secret understood by [`FakeGateway`]
pub const FAKE_WEBHOOK_SECRET: &str = "whsec_fake";

/// Payment gateway that records session requests
///
/// Webhooks are verified with the real signature scheme against
/// [`FAKE_WEBHOOK_SECRET`].
#[derive(Clone, Default)]
pub struct FakeGateway {
    sessions: Arc<Mutex<Vec<CheckoutSessionRequest>>>,
    fail: bool,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn sessions(&self) -> Vec<CheckoutSessionRequest> {
        self.sessions.lock().await.clone()
    }

    /// Sign a payload as the provider would, timestamped now
    pub fn sign(payload: &[u8]) -> String {
        stripe::signature_header(FAKE_WEBHOOK_SECRET, chrono::Utc::now().timestamp(), payload)
            .expect("hmac accepts any key length")
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CreatedSession, PaymentError> {
        if self.fail {
            return Err(PaymentError::Provider {
                status: 500,
                message: "provider down".to_string(),
            });
        }
        let mut sessions = self.sessions.lock().await;
        sessions.push(request.clone());
        let id = format!("cs_test_{}", sessions.len());
        Ok(CreatedSession {
            url: format!("https://checkout.example.com/pay/{}", id),
            id,
        })
    }

    fn parse_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, PaymentError> {
        stripe::verify_signature(
            FAKE_WEBHOOK_SECRET,
            payload,
            signature,
            chrono::Utc::now().timestamp(),
        )?;
        stripe::parse_event(payload)
    }
}
