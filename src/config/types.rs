use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Profiles
// ============================================================================

/// Which persisted settings shape the client runs with.
///
/// The web dashboard and the mobile app keep differently shaped records;
/// neither is canonical, so both are supported side by side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientProfile {
    #[default]
    Web,
    Mobile,
}

impl FromStr for ClientProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" => Ok(Self::Web),
            "mobile" => Ok(Self::Mobile),
            other => Err(format!("unknown profile '{other}' (expected 'web' or 'mobile')")),
        }
    }
}

impl fmt::Display for ClientProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Web => f.write_str("web"),
            Self::Mobile => f.write_str("mobile"),
        }
    }
}

// ============================================================================
// Web dashboard settings
// ============================================================================

/// Settings persisted by the web dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub admin_token: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: default_base_url(),
            timezone: default_timezone(),
            admin_token: String::new(),
        }
    }
}

/// Partial update for [`ClientSettings`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ClientSettingsPatch {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub timezone: Option<String>,
    pub admin_token: Option<String>,
}

// ============================================================================
// Mobile app state
// ============================================================================

/// Lifecycle of push notification registration for the current process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushRegistrationStatus {
    #[default]
    Unregistered,
    PermissionRequested,
    Registered,
    Denied,
}

/// State kept by the mobile app.
///
/// `push_registration` is process-local and never written to storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub api_base_url: Option<String>,
    pub api_key: Option<String>,
    pub push_token: Option<String>,
    #[serde(skip)]
    pub push_registration: PushRegistrationStatus,
}

/// The durable subset of [`AppState`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStateSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub push_token: Option<String>,
}

/// Field-level setters for [`AppState`].
///
/// The outer `Option` selects whether a field is touched; the inner one is
/// the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct AppStatePatch {
    pub api_base_url: Option<Option<String>>,
    pub api_key: Option<Option<String>>,
    pub push_token: Option<Option<String>>,
    pub push_registration: Option<PushRegistrationStatus>,
}

impl AppStatePatch {
    pub fn api_key(value: Option<String>) -> Self {
        Self {
            api_key: Some(value),
            ..Default::default()
        }
    }

    pub fn api_base_url(value: Option<String>) -> Self {
        Self {
            api_base_url: Some(value),
            ..Default::default()
        }
    }

    pub fn push_token(value: Option<String>) -> Self {
        Self {
            push_token: Some(value),
            ..Default::default()
        }
    }

    pub fn push_registration(status: PushRegistrationStatus) -> Self {
        Self {
            push_registration: Some(status),
            ..Default::default()
        }
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// User preference toggles. Lives for the process only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub notifications_enabled: bool,
    pub voice_responses: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            voice_responses: false,
        }
    }
}

/// Names of the individual preference toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKey {
    Notifications,
    VoiceResponses,
}

impl FromStr for PreferenceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notifications" | "notificationsEnabled" => Ok(Self::Notifications),
            "voice" | "voiceResponses" => Ok(Self::VoiceResponses),
            other => Err(format!("unknown preference '{other}'")),
        }
    }
}

// ============================================================================
// CLI configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Resolve a possibly missing or blank base URL to a usable one.
pub fn resolve_base_url(candidate: Option<&str>) -> String {
    match candidate.map(str::trim) {
        Some(url) if !url.trim_end_matches('/').is_empty() => url.to_string(),
        _ => DEFAULT_API_BASE_URL.to_string(),
    }
}
