//! Screen controllers driven against a wiremock backend.

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use remindctl::api::{ApiClient, ReminderStatus};
use remindctl::config::{ClientSettings, MemoryStorage, SettingsStore};
use remindctl::screens::{AdminController, ChatController, ChatRole, RemindersController};

const REMINDER_ID: &str = "6f1c1a56-2a5e-4c4e-9a3b-2a3f3f5f0c11";

fn client_for(server: &MockServer, api_key: &str, admin_token: &str) -> ApiClient {
    let settings = ClientSettings {
        api_key: api_key.to_string(),
        api_base_url: server.uri(),
        admin_token: admin_token.to_string(),
        ..Default::default()
    };
    let store = SettingsStore::with_value(settings, Arc::new(MemoryStorage::new()));
    ApiClient::new(Arc::new(store))
}

fn reminder(text: &str, status: &str) -> Value {
    json!({
        "id": REMINDER_ID,
        "text": text,
        "status": status,
        "run_ts": "2026-10-19T08:00:00+00:00"
    })
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn chat_turn_appends_both_sides_of_the_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assistant_message": "I'll remind you at 8.",
            "actions": [{
                "tool": "schedule_reminder",
                "params": {"text": "stretch", "run_ts": "2026-10-19T08:00:00"}
            }]
        })))
        .mount(&server)
        .await;

    let chat = ChatController::new(client_for(&server, "k", ""), None);
    let reply = chat.submit("remind me to stretch").await.unwrap();
    assert!(reply.is_some());

    let view = chat.view();
    assert_eq!(view.transcript.len(), 2);
    assert_eq!(view.transcript[0].role, ChatRole::User);
    assert_eq!(view.transcript[1].text, "I'll remind you at 8.");
    assert_eq!(view.actions.len(), 1);
    assert!(view.error.is_none());
    assert!(!view.sending);
}

#[tokio::test]
async fn chat_failure_keeps_user_message_and_sets_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({"message": "model offline"})))
        .mount(&server)
        .await;

    let chat = ChatController::new(client_for(&server, "k", ""), None);
    assert!(chat.submit("hello").await.is_err());

    let view = chat.view();
    assert_eq!(view.transcript.len(), 1);
    assert_eq!(view.error.as_deref(), Some("model offline"));
}

#[tokio::test]
async fn chat_without_api_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let chat = ChatController::new(client_for(&server, "", ""), None);
    let err = chat.submit("hi").await.unwrap_err();
    assert!(err.is_precondition());

    let view = chat.view();
    assert_eq!(view.error.as_deref(), Some("API key required"));
    assert!(view.transcript.is_empty());
    assert!(!view.sending);
}

// ============================================================================
// Reminders
// ============================================================================

#[tokio::test]
async fn cancel_reloads_list_from_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reminders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([reminder("tea", "scheduled")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reminders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([reminder("tea", "canceled")])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/reminders/{REMINDER_ID}/cancel")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "canceled"})))
        .expect(1)
        .mount(&server)
        .await;

    let reminders = RemindersController::new(client_for(&server, "k", ""));
    assert!(reminders.refresh().await.unwrap());
    assert_eq!(reminders.view().bucket(ReminderStatus::Scheduled).len(), 1);

    let id = Uuid::parse_str(REMINDER_ID).unwrap();
    let response = reminders.cancel(id).await.unwrap();
    assert!(response.changed());

    let view = reminders.view();
    assert!(view.bucket(ReminderStatus::Scheduled).is_empty());
    assert_eq!(view.bucket(ReminderStatus::Canceled).len(), 1);
}

#[tokio::test]
async fn superseded_refresh_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reminders"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([reminder("stale", "scheduled")]))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reminders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([reminder("fresh", "scheduled")])))
        .mount(&server)
        .await;

    let reminders = RemindersController::new(client_for(&server, "k", ""));
    let (first, second) = tokio::join!(reminders.refresh(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        reminders.refresh().await
    });

    assert_eq!(first.unwrap(), false);
    assert_eq!(second.unwrap(), true);
    assert_eq!(reminders.view().reminders[0].text, "fresh");
}

// ============================================================================
// Admin
// ============================================================================

/// Feature flag endpoint that remembers the last POSTed value.
struct FlagBackend {
    enabled: Arc<Mutex<bool>>,
}

impl Respond for FlagBackend {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut enabled = self.enabled.lock();
        if request.method.as_str() == "POST" {
            let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
            *enabled = body["enabled"].as_bool().unwrap_or(*enabled);
            return ResponseTemplate::new(200).set_body_json(json!({
                "key": "voice_mode",
                "enabled": *enabled
            }));
        }
        ResponseTemplate::new(200).set_body_json(json!([{
            "key": "voice_mode",
            "enabled": *enabled,
            "effective": *enabled,
            "override": null,
            "description": "Spoken replies"
        }]))
    }
}

async fn mount_admin_reads(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/admin/queues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"queue": "reminders", "depth": 0})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/workers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/reminders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn toggling_a_flag_twice_restores_it() {
    let server = MockServer::start().await;
    mount_admin_reads(&server).await;
    Mock::given(path("/admin/features"))
        .respond_with(FlagBackend {
            enabled: Arc::new(Mutex::new(true)),
        })
        .mount(&server)
        .await;

    let admin = AdminController::new(client_for(&server, "", "root"));
    admin.refresh().await.unwrap();
    assert!(admin.view().flag("voice_mode").unwrap().enabled);

    let record = admin.toggle_flag("voice_mode").await.unwrap();
    assert!(!record.enabled);
    assert!(!admin.view().flag("voice_mode").unwrap().enabled);

    admin.toggle_flag("voice_mode").await.unwrap();
    assert!(admin.view().flag("voice_mode").unwrap().enabled);
}

#[tokio::test]
async fn any_failed_admin_read_fails_the_whole_refresh() {
    let server = MockServer::start().await;
    mount_admin_reads(&server).await;
    Mock::given(method("GET"))
        .and(path("/admin/features"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "db down"})))
        .mount(&server)
        .await;

    let admin = AdminController::new(client_for(&server, "", "root"));
    assert!(admin.refresh().await.is_err());

    let view = admin.view();
    assert_eq!(view.error.as_deref(), Some("Failed to load admin data: db down"));
    assert!(view.queues.is_none());
}

#[tokio::test]
async fn admin_without_token_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let admin = AdminController::new(client_for(&server, "k", ""));
    let err = admin.refresh().await.unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(admin.view().error.as_deref(), Some("Admin token required"));
}
