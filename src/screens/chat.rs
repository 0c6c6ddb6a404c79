use crate::api::{ApiClient, ApiError, ChatAction, ChatResponse};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub role: ChatRole,
    pub text: String,
}

/// Everything the chat screen renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatView {
    pub transcript: Vec<TranscriptEntry>,
    /// Actions of the latest successful turn only.
    pub actions: Vec<ChatAction>,
    pub error: Option<String>,
    pub sending: bool,
}

/// Drives chat turns against `/chat`.
pub struct ChatController {
    client: ApiClient,
    persona: Option<String>,
    view: parking_lot::RwLock<ChatView>,
}

impl ChatController {
    pub fn new(client: ApiClient, persona: Option<String>) -> Self {
        Self {
            client,
            persona,
            view: parking_lot::RwLock::new(ChatView::default()),
        }
    }

    pub fn view(&self) -> ChatView {
        self.view.read().clone()
    }

    /// Send one message.
    ///
    /// Blank input is ignored. Without an API key nothing is sent. The user
    /// message is shown before the request goes out and stays there if it
    /// fails; on success the reply is appended and the action list replaced.
    pub async fn submit(&self, input: &str) -> Result<Option<ChatResponse>, ApiError> {
        let message = input.trim();
        if message.is_empty() {
            debug!("Ignoring empty chat input");
            return Ok(None);
        }

        if let Err(e) = self.client.require_api_key() {
            self.view.write().error = Some(e.to_string());
            return Err(e);
        }

        {
            let mut view = self.view.write();
            view.transcript.push(TranscriptEntry {
                role: ChatRole::User,
                text: message.to_string(),
            });
            view.error = None;
            view.sending = true;
        }

        let result = self.client.chat(message, self.persona.as_deref()).await;

        let mut view = self.view.write();
        view.sending = false;
        match result {
            Ok(response) => {
                info!(actions = response.actions.len(), "Chat turn completed");
                view.transcript.push(TranscriptEntry {
                    role: ChatRole::Assistant,
                    text: response.assistant_message.clone(),
                });
                view.actions = response.actions.clone();
                Ok(Some(response))
            }
            Err(e) => {
                view.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Forget the conversation shown on screen.
    pub fn clear(&self) {
        *self.view.write() = ChatView::default();
    }
}

fn field<'a>(action: &'a ChatAction, name: &str) -> Option<&'a Value> {
    let lookup = |map: &'a Option<Map<String, Value>>| map.as_ref().and_then(|m| m.get(name));
    lookup(&action.result).or_else(|| lookup(&action.params))
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One-line rendering of an action.
///
/// Scheduled reminders show their text and run time; anything else is
/// dumped as JSON.
pub fn describe_action(action: &ChatAction) -> String {
    if action.tool == "schedule_reminder" {
        let text = field(action, "text").map(as_text);
        let run_ts = field(action, "run_ts").map(as_text);
        match (text, run_ts) {
            (Some(text), Some(run_ts)) => return format!("Reminder: {text} @ {run_ts}"),
            (Some(text), None) => return format!("Reminder: {text}"),
            _ => {}
        }
    }

    serde_json::to_string(action).unwrap_or_else(|_| action.tool.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action(value: Value) -> ChatAction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn schedule_reminder_prefers_result_fields() {
        let a = action(json!({
            "tool": "schedule_reminder",
            "params": {"text": "draft", "run_ts": "later"},
            "result": {"text": "water plants", "run_ts": "2024-10-16T09:00:00Z"}
        }));
        assert_eq!(
            describe_action(&a),
            "Reminder: water plants @ 2024-10-16T09:00:00Z"
        );
    }

    #[test]
    fn schedule_reminder_falls_back_to_params() {
        let a = action(json!({"tool": "schedule_reminder", "params": {"text": "stretch"}}));
        assert_eq!(describe_action(&a), "Reminder: stretch");
    }

    #[test]
    fn other_tools_are_dumped_as_json() {
        let a = action(json!({"tool": "save_memory", "result": {"ok": true}}));
        assert_eq!(
            describe_action(&a),
            r#"{"tool":"save_memory","result":{"ok":true}}"#
        );
    }
}
