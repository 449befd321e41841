// Integration tests for `ResendMailer` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bnb_booking_api::config::ResendConfig;
use bnb_booking_api::notify::{MailError, Mailer, OutgoingEmail, ResendMailer};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ResendMailer) {
    let server = MockServer::start().await;
    let mailer = ResendMailer::new(&ResendConfig {
        api_key: "re_test_key".to_string(),
        from: "Ohana B&B Prenotazioni <prenotazioni@ohana-bnb.it>".to_string(),
        api_base: server.uri(),
    })
    .unwrap();
    (server, mailer)
}

fn email() -> OutgoingEmail {
    OutgoingEmail {
        from: "Ohana B&B Prenotazioni <prenotazioni@ohana-bnb.it>".to_string(),
        to: "owner@ohana-bnb.it".to_string(),
        subject: "Nuova prenotazione online – Anna – Camera MOON".to_string(),
        html: "<h2>Nuova prenotazione ricevuta dal sito</h2>".to_string(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_email() {
    let (server, mailer) = setup().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer re_test_key"))
        .and(body_partial_json(json!({
            "to": "owner@ohana-bnb.it",
            "subject": "Nuova prenotazione online – Anna – Camera MOON"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "email_123" })))
        .expect(1)
        .mount(&server)
        .await;

    let sent = mailer.send(&email()).await.unwrap();
    assert_eq!(sent.id.as_deref(), Some("email_123"));
}

#[tokio::test]
async fn test_rejected_email() {
    let (server, mailer) = setup().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "statusCode": 403,
            "name": "validation_error",
            "message": "The ohana-bnb.it domain is not verified."
        })))
        .mount(&server)
        .await;

    let err = mailer.send(&email()).await.unwrap_err();
    match err {
        MailError::Rejected { status, message } => {
            assert_eq!(status, 403);
            assert!(message.contains("not verified"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}
