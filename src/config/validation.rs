use super::types::{AppState, ClientSettings};
use anyhow::Result;
use url::Url;

/// A single problem found in a settings record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsValidationError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for SettingsValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn check_base_url(path: &str, value: &str, errors: &mut Vec<SettingsValidationError>) {
    match Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {}
        Ok(url) => errors.push(SettingsValidationError {
            path: path.to_string(),
            message: format!("Unsupported base URL '{url}' (expected http or https with a host)"),
        }),
        Err(e) => errors.push(SettingsValidationError {
            path: path.to_string(),
            message: format!("Invalid base URL: {e}"),
        }),
    }
}

/// Validate web dashboard settings.
pub fn validate_settings(settings: &ClientSettings) -> Vec<SettingsValidationError> {
    let mut errors = Vec::new();

    check_base_url("apiBaseUrl", &settings.api_base_url, &mut errors);

    if settings.timezone.trim().is_empty() {
        errors.push(SettingsValidationError {
            path: "timezone".to_string(),
            message: "Timezone must not be empty".to_string(),
        });
    }

    errors
}

/// Validate mobile app state. An absent base URL is fine; it falls back to
/// the default.
pub fn validate_app_state(state: &AppState) -> Vec<SettingsValidationError> {
    let mut errors = Vec::new();

    if let Some(url) = state.api_base_url.as_deref() {
        check_base_url("apiBaseUrl", url, &mut errors);
    }

    errors
}

/// Turn a list of validation errors into a single `Result`.
pub fn ensure_valid(errors: Vec<SettingsValidationError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        anyhow::bail!("Settings validation failed:\n{}", messages.join("\n"));
    }
}
