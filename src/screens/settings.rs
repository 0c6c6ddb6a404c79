use crate::app::SettingsHandle;
use crate::config::{
    ensure_valid, validate_app_state, validate_settings, AppStatePatch, ClientSettingsPatch,
    Persisted, PreferenceKey, Preferences, PreferencesStore,
};
use crate::logging::redact;

use anyhow::{bail, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Settings form plus preference toggles.
pub struct SettingsController {
    settings: SettingsHandle,
    preferences: Arc<PreferencesStore>,
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl SettingsController {
    pub fn new(settings: SettingsHandle, preferences: Arc<PreferencesStore>) -> Self {
        Self {
            settings,
            preferences,
        }
    }

    /// Current settings as JSON, secrets reduced to their last characters.
    pub fn show(&self) -> Value {
        match &self.settings {
            SettingsHandle::Web(store) => {
                let s = store.get();
                json!({
                    "profile": "web",
                    "apiKey": redact(&s.api_key),
                    "apiBaseUrl": s.api_base_url,
                    "timezone": s.timezone,
                    "adminToken": redact(&s.admin_token),
                })
            }
            SettingsHandle::Mobile(store) => {
                let s = store.get();
                json!({
                    "profile": "mobile",
                    "apiKey": s.api_key.as_deref().map(redact),
                    "apiBaseUrl": s.api_base_url,
                    "pushToken": s.push_token.as_deref().map(redact),
                    "pushRegistration": s.push_registration,
                })
            }
        }
    }

    /// Validate and persist a settings change.
    ///
    /// The patch is applied to a copy and validated before anything is
    /// written. Blank values clear optional mobile fields.
    pub async fn save(&self, patch: ClientSettingsPatch) -> Result<Value> {
        match &self.settings {
            SettingsHandle::Web(store) => {
                let mut candidate = store.get();
                candidate.merge(patch.clone());
                ensure_valid(validate_settings(&candidate))?;
                store.set(patch).await?;
            }
            SettingsHandle::Mobile(store) => {
                if patch.timezone.is_some() || patch.admin_token.is_some() {
                    bail!("The mobile profile does not store a timezone or admin token");
                }
                let mobile = AppStatePatch {
                    api_key: patch.api_key.map(optional),
                    api_base_url: patch.api_base_url.map(optional),
                    ..Default::default()
                };
                let mut candidate = store.get();
                candidate.merge(mobile.clone());
                ensure_valid(validate_app_state(&candidate))?;
                store.set(mobile).await?;
            }
        }

        info!(profile = %self.settings.profile(), "Settings saved");
        Ok(self.show())
    }

    /// Drop the stored record and return to defaults.
    pub async fn reset(&self) -> Result<()> {
        match &self.settings {
            SettingsHandle::Web(store) => store.reset().await?,
            SettingsHandle::Mobile(store) => store.reset().await?,
        }
        info!(profile = %self.settings.profile(), "Settings reset");
        Ok(())
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences.get()
    }

    pub fn toggle_preference(&self, key: PreferenceKey) -> bool {
        self.preferences.toggle(key)
    }
}
