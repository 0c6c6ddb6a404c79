use super::client::{to_json_body, ApiClient, RequestOptions};
use super::error::ApiError;
use super::types::{ChatRequest, ChatResponse};

impl ApiClient {
    /// Run one chat turn.
    pub async fn chat(
        &self,
        message: &str,
        persona_key: Option<&str>,
    ) -> Result<ChatResponse, ApiError> {
        self.require_api_key()?;

        let body = to_json_body(&ChatRequest {
            message: message.to_string(),
            persona_key: persona_key.map(str::to_string),
        })?;

        self.request_json("/chat", RequestOptions::post().json(body))
            .await
    }
}
