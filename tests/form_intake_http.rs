//! Integration tests for the HTTP form-intake client.
//!
//! Each test spins up an Axum stub of the intake endpoint on a random port
//! and posts a real multipart submission to it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::time::timeout;

use intake_chat::config::FormIntakeConfig;
use intake_chat::error::SubmissionError;
use intake_chat::intake::{AnswerSet, Field};
use intake_chat::sink::{FormIntakeClient, SubmissionSink};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Default)]
struct Received {
    fields: Arc<Mutex<Vec<HashMap<String, String>>>>,
    accept: Arc<Mutex<Vec<String>>>,
}

async fn accept_json(
    State(received): State<Received>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.insert(name, value);
    }
    received.fields.lock().unwrap().push(fields);
    if let Some(accept) = headers.get("accept").and_then(|v| v.to_str().ok()) {
        received.accept.lock().unwrap().push(accept.to_string());
    }
    Json(serde_json::json!({"ok": true}))
}

async fn accept_html() -> impl IntoResponse {
    (StatusCode::OK, "<p>Thanks!</p>")
}

async fn reject() -> impl IntoResponse {
    (StatusCode::UNPROCESSABLE_ENTITY, "missing email")
}

/// Start the stub endpoint, return (base url, received submissions).
async fn start_server() -> (String, Received) {
    let received = Received::default();
    let app = Router::new()
        .route("/f/json", post(accept_json))
        .route("/f/html", post(accept_html))
        .route("/f/reject", post(reject))
        .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{port}"), received)
}

fn answers() -> AnswerSet {
    let mut answers = AnswerSet::default();
    answers.record(Field::Name, "Ada Lovelace");
    answers.record(Field::Service, "AI Consulting");
    answers.record(Field::Email, "ada@example.com");
    answers.record(Field::Role, "Founder");
    answers
}

fn client(url: String) -> FormIntakeClient {
    FormIntakeClient::new(&FormIntakeConfig::new(url)).unwrap()
}

#[tokio::test]
async fn posts_multipart_fields_with_json_accept() {
    timeout(TEST_TIMEOUT, async {
        let (base, received) = start_server().await;
        let sink = client(format!("{base}/f/json"));

        let reply = sink.send(&answers().to_form_fields(true)).await.unwrap();
        assert_eq!(reply["ok"], true);

        let submissions = received.fields.lock().unwrap().clone();
        assert_eq!(submissions.len(), 1);
        let fields = &submissions[0];
        assert_eq!(fields["name"], "Ada Lovelace");
        assert_eq!(fields["service"], "AI Consulting");
        assert_eq!(fields["_replyto"], "ada@example.com");
        assert_eq!(fields["email"], "ada@example.com");
        assert_eq!(fields["phone"], "");
        assert_eq!(fields["workplace"], "");
        assert_eq!(fields["role"], "Founder");

        assert_eq!(*received.accept.lock().unwrap(), vec!["application/json"]);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn non_json_success_reply_becomes_empty_object() {
    timeout(TEST_TIMEOUT, async {
        let (base, _received) = start_server().await;
        let sink = client(format!("{base}/f/html"));

        let reply = sink.send(&answers().to_form_fields(false)).await.unwrap();
        assert_eq!(reply, serde_json::json!({}));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    timeout(TEST_TIMEOUT, async {
        let (base, _received) = start_server().await;
        let sink = client(format!("{base}/f/reject"));

        let err = sink.send(&answers().to_form_fields(true)).await.unwrap_err();
        match err {
            SubmissionError::Rejected { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "missing email");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    timeout(TEST_TIMEOUT, async {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let sink = client(format!("http://127.0.0.1:{port}/f/json"));
        let err = sink.send(&answers().to_form_fields(true)).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Transport(_)));
    })
    .await
    .expect("test timed out");
}
