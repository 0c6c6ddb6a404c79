//! Wire types for the reminder backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona_key: Option<String>,
}

/// One tool invocation reported by the assistant. Shape is backend-defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAction {
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub assistant_message: String,
    #[serde(default)]
    pub actions: Vec<ChatAction>,
}

// ============================================================================
// Reminders
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Scheduled,
    Sent,
    Canceled,
    Failed,
    Error,
    #[serde(other)]
    Unknown,
}

impl ReminderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Sent => "sent",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }

    /// Whether a cancel request can still change this reminder.
    pub fn is_cancelable(&self) -> bool {
        matches!(self, Self::Scheduled)
    }
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "sent" => Ok(Self::Sent),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            "failed" => Ok(Self::Failed),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown reminder status '{other}'")),
        }
    }
}

/// Read-only view of a reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub text: String,
    pub status: ReminderStatus,
    #[serde(default)]
    pub run_ts: Option<String>,
    #[serde(default)]
    pub local_ts: Option<String>,
    #[serde(default)]
    pub utc_ts: Option<String>,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub calendar_event_id: Option<String>,
}

impl Reminder {
    /// When the reminder fires, in UTC.
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        self.utc_ts
            .as_deref()
            .or(self.run_ts.as_deref())
            .and_then(parse_timestamp)
    }
}

/// Parse an ISO-8601 timestamp; values without an offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelReminderResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl CancelReminderResponse {
    /// `false` when the backend reported nothing to do.
    pub fn changed(&self) -> bool {
        self.status == "canceled"
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PushTokenRequest {
    pub push_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueDepth {
    pub queue: String,
    pub depth: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerStatus {
    pub status: String,
    #[serde(default)]
    pub details: Option<Value>,
}

impl WorkerStatus {
    pub fn is_reachable(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminReminder {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub status: ReminderStatus,
    #[serde(default)]
    pub utc_ts: Option<String>,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub calendar_event_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlagSummary {
    pub key: String,
    pub enabled: bool,
    /// What the backend actually applies once env overrides are considered.
    #[serde(default)]
    pub effective: Option<bool>,
    #[serde(default)]
    pub r#override: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureFlagUpdate {
    pub key: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlagRecord {
    pub key: String,
    pub enabled: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

// ============================================================================
// Health and metrics
// ============================================================================

/// Per-component readiness as reported by `/healthz`.
pub type ComponentHealth = std::collections::BTreeMap<String, String>;

// ============================================================================
// Calendar
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CalendarAddRequest {
    pub reminder_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarAddResponse {
    pub status: String,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub html_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub due_ts: Option<String>,
    #[serde(default)]
    pub calendar_event_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaWindow {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agenda {
    #[serde(default)]
    pub events: Vec<Value>,
    #[serde(default)]
    pub tasks: Vec<AgendaTask>,
    pub window: AgendaWindow,
}

// ============================================================================
// Memories
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    Note,
    Goal,
    Habit,
    Preference,
    Contact,
}

impl MemoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Goal => "goal",
            Self::Habit => "habit",
            Self::Preference => "preference",
            Self::Contact => "contact",
        }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "note" => Ok(Self::Note),
            "goal" => Ok(Self::Goal),
            "habit" => Ok(Self::Habit),
            "preference" => Ok(Self::Preference),
            "contact" => Ok(Self::Contact),
            other => Err(format!("unknown memory type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryCreateRequest {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: MemoryType,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A stored memory as returned by create and search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ============================================================================
// Billing
// ============================================================================

/// Hosted checkout or portal page to open in a browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingUrl {
    pub url: String,
}

// ============================================================================
// Speech
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeechRequest {
    pub text: String,
    pub language: String,
}
