//! HTTP-level tests for the API client against a wiremock backend.

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use remindctl::api::{
    ApiClient, ApiError, AudioUpload, MemoryCreateRequest, MemoryType, ReminderStatus,
};
use remindctl::config::{ClientSettings, MemoryStorage, SettingsStore};

fn client_for(base_url: &str, api_key: &str, admin_token: &str) -> ApiClient {
    let settings = ClientSettings {
        api_key: api_key.to_string(),
        api_base_url: base_url.to_string(),
        admin_token: admin_token.to_string(),
        ..Default::default()
    };
    let store = SettingsStore::with_value(settings, Arc::new(MemoryStorage::new()));
    ApiClient::new(Arc::new(store))
}

fn has_no_content_type(req: &Request) -> bool {
    !req.headers.contains_key("content-type")
}

#[tokio::test]
async fn chat_sends_key_and_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("x-api-key", "sk-test"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"message": "remind me", "persona_key": "butler"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assistant_message": "Done.",
            "actions": [{"tool": "schedule_reminder", "params": {"text": "tea"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "sk-test", "");
    let reply = client.chat("remind me", Some("butler")).await.unwrap();

    assert_eq!(reply.assistant_message, "Done.");
    assert_eq!(reply.actions.len(), 1);
    assert_eq!(reply.actions[0].tool, "schedule_reminder");
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_collapsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reminders"))
        .and(has_no_content_type)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&format!("{}/", server.uri()), "k", "");
    let reminders = client.list_reminders().await.unwrap();
    assert!(reminders.is_empty());
}

#[tokio::test]
async fn missing_api_key_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "   ", "");
    let err = client.chat("hello", None).await.unwrap_err();

    assert!(err.is_precondition());
    assert_eq!(err.to_string(), "API key required");
}

#[tokio::test]
async fn error_detail_is_surfaced_as_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reminders"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "invalid key"})))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "bad", "");
    let err = client.list_reminders().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "invalid key");
}

#[tokio::test]
async fn plain_text_error_body_is_used_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reminders"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "k", "");
    let err = client.list_reminders().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Server {
            status: 500,
            message: "boom".into()
        }
    );
}

#[tokio::test]
async fn empty_error_body_falls_back_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "", "");
    let err = client.health().await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status 503");
}

#[tokio::test]
async fn reminders_decode_unknown_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reminders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "6f1c1a56-2a5e-4c4e-9a3b-2a3f3f5f0c11",
                "text": "water plants",
                "status": "scheduled",
                "run_ts": "2026-10-19T08:00:00"
            },
            {
                "id": "0b6cfb7e-3bd3-4d59-9d6e-5d8a2b0d2f42",
                "text": "old",
                "status": "archived"
            }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "k", "");
    let reminders = client.list_reminders().await.unwrap();

    assert_eq!(reminders[0].status, ReminderStatus::Scheduled);
    assert!(reminders[0].scheduled_at().is_some());
    assert_eq!(reminders[1].status, ReminderStatus::Unknown);
}

#[tokio::test]
async fn admin_calls_carry_admin_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/queues"))
        .and(header("x-admin-token", "root"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"queue": "reminders", "depth": 3})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "", "root");
    let token = client.require_admin_token().unwrap();
    let depth = client.admin_queues(&token).await.unwrap();
    assert_eq!(depth.depth, 3);
}

#[tokio::test]
async fn push_token_can_be_cleared_with_null() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/push-token"))
        .and(body_json(json!({"push_token": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "k", "");
    client.register_push_token(None).await.unwrap();
}

#[tokio::test]
async fn speech_to_text_uploads_multipart_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stt"))
        .and(query_param("language", "de"))
        .and(|req: &Request| {
            let is_multipart = req
                .headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("multipart/form-data"));
            let body = String::from_utf8_lossy(&req.body);
            is_multipart && body.contains("name=\"file\"") && body.contains("memo.m4a")
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "hallo"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "k", "");
    let audio = AudioUpload::new("memo.m4a", vec![0u8; 64]);
    let transcription = client.speech_to_text(&audio, Some("de")).await.unwrap();
    assert_eq!(transcription.text, "hallo");
}

#[tokio::test]
async fn text_to_speech_returns_audio_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tts"))
        .and(body_json(json!({"text": "hello", "language": "en"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(vec![0xFF, 0xFB, 0x90, 0x00]),
        )
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "k", "");
    let audio = client.text_to_speech("hello", "en").await.unwrap();
    assert_eq!(audio.as_ref(), &[0xFF, 0xFB, 0x90, 0x00]);
}

#[tokio::test]
async fn prometheus_metrics_are_returned_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain; version=0.0.4")
                .set_body_string("reminders_sent_total 4\n"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "", "");
    let text = client.prometheus_metrics().await.unwrap();
    assert!(text.contains("reminders_sent_total 4"));
}

#[tokio::test]
async fn preconfigured_http_client_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/healthz"))
        .and(header("user-agent", "remindctl-test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"db": "ok", "redis": "fail: timeout"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let settings = ClientSettings {
        api_base_url: server.uri(),
        ..Default::default()
    };
    let store = SettingsStore::with_value(settings, Arc::new(MemoryStorage::new()));
    let http = reqwest::Client::builder()
        .user_agent("remindctl-test")
        .build()
        .unwrap();
    let client = ApiClient::with_http_client(Arc::new(store), http);

    let components = client.healthz().await.unwrap();
    assert_eq!(components["db"], "ok");
    assert_eq!(components["redis"], "fail: timeout");
}

const USER_ID: &str = "0b6cfb7e-3bd3-4d59-9d6e-5d8a2b0d2f42";

fn memory(text: &str) -> serde_json::Value {
    json!({
        "id": "6f1c1a56-2a5e-4c4e-9a3b-2a3f3f5f0c11",
        "user_id": USER_ID,
        "type": "habit",
        "text": text,
        "source": null,
        "created_at": "2026-10-18T07:00:00"
    })
}

#[tokio::test]
async fn create_memory_posts_typed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/memories"))
        .and(header("x-api-key", "k"))
        .and(body_json(json!({
            "user_id": USER_ID,
            "type": "habit",
            "text": "walk after lunch",
            "source": "chat"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(memory("walk after lunch")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "k", "");
    let record = client
        .create_memory(&MemoryCreateRequest {
            user_id: Uuid::parse_str(USER_ID).unwrap(),
            kind: MemoryType::Habit,
            text: "walk after lunch".into(),
            source: Some("chat".into()),
        })
        .await
        .unwrap();

    assert_eq!(record.kind, "habit");
    assert_eq!(record.text, "walk after lunch");
    assert!(record.source.is_none());
}

#[tokio::test]
async fn search_memories_sends_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/memories/search"))
        .and(header("x-api-key", "k"))
        .and(query_param("user_id", USER_ID))
        .and(query_param("q", "lunch walk"))
        .and(query_param("top_k", "3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([memory("walk after lunch"), memory("lunch at noon")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "k", "");
    let user_id = Uuid::parse_str(USER_ID).unwrap();
    let hits = client.search_memories(user_id, "lunch walk", 3).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].user_id, user_id);
}

#[tokio::test]
async fn invalid_memory_requests_stay_local() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "k", "");
    let user_id = Uuid::parse_str(USER_ID).unwrap();

    let err = client.search_memories(user_id, "walk", 0).await.unwrap_err();
    assert!(err.is_precondition());
    let err = client.search_memories(user_id, "walk", 51).await.unwrap_err();
    assert!(err.is_precondition());
    let err = client.search_memories(user_id, "  ", 8).await.unwrap_err();
    assert!(err.is_precondition());

    let err = client
        .create_memory(&MemoryCreateRequest {
            user_id,
            kind: MemoryType::Note,
            text: String::new(),
            source: None,
        })
        .await
        .unwrap_err();
    assert!(err.is_precondition());

    let keyless = client_for(&server.uri(), "", "");
    let err = keyless.search_memories(user_id, "walk", 8).await.unwrap_err();
    assert_eq!(err.to_string(), "API key required");
}

#[tokio::test]
async fn billing_checkout_passes_redirects_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/billing/checkout"))
        .and(header("x-api-key", "k"))
        .and(query_param("success_url", "https://app.example.com/ok"))
        .and(query_param("cancel_url", "https://app.example.com/back"))
        .and(has_no_content_type)
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"url": "https://checkout.stripe.com/c/pay/cs_test"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "k", "");
    let link = client
        .billing_checkout(
            Some("https://app.example.com/ok"),
            Some("https://app.example.com/back"),
        )
        .await
        .unwrap();
    assert_eq!(link.url, "https://checkout.stripe.com/c/pay/cs_test");
}

#[tokio::test]
async fn billing_portal_without_return_url_sends_no_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/billing/portal"))
        .and(|req: &Request| req.url.query().is_none())
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"url": "https://billing.stripe.com/p/session"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "k", "");
    let link = client.billing_portal(None).await.unwrap();
    assert_eq!(link.url, "https://billing.stripe.com/p/session");
}

#[tokio::test]
async fn billing_error_detail_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/billing/portal"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "No Stripe customer"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), "k", "");
    let err = client.billing_portal(Some("https://app.example.com")).await.unwrap_err();
    assert_eq!(err.to_string(), "No Stripe customer");
}
