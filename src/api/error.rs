use reqwest::StatusCode;

/// Everything a backend call can fail with.
///
/// `Display` is always the human-readable message alone, so callers that
/// only surface text can print the error directly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// A client-side requirement (API key, admin token, input limits) was
    /// not met; no request was sent.
    #[error("{0}")]
    PreconditionFailed(String),
    /// The request never produced an HTTP response.
    #[error("{0}")]
    Transport(String),
    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },
    /// A 2xx body did not have the expected shape.
    #[error("{0}")]
    Decode(String),
}

impl ApiError {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    pub fn api_key_required() -> Self {
        Self::precondition("API key required")
    }

    pub fn admin_token_required() -> Self {
        Self::precondition("Admin token required")
    }

    /// HTTP status for server errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::PreconditionFailed(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Build the message for a failed response.
///
/// Prefers a JSON `detail` or `message` field, then the raw body text, then
/// a generic message naming the status code.
pub fn normalize_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = message_from_json(&value) {
            return message;
        }
    }

    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    format!("Request failed with status {status}")
}

fn message_from_json(value: &serde_json::Value) -> Option<String> {
    let obj = value.as_object()?;

    for field in ["detail", "message"] {
        match obj.get(field) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                return Some(s.clone());
            }
            // Validation failures carry a list of `{loc, msg, type}` entries.
            Some(serde_json::Value::Array(items)) => {
                let parts: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if !parts.is_empty() {
                    return Some(parts.join("; "));
                }
            }
            _ => {}
        }
    }

    None
}
