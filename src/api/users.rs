use super::client::{to_json_body, ApiClient, RequestOptions};
use super::error::ApiError;
use super::types::{PushTokenRequest, StatusResponse};

impl ApiClient {
    /// Report the device push token; `None` clears it server-side.
    pub async fn register_push_token(
        &self,
        push_token: Option<&str>,
    ) -> Result<StatusResponse, ApiError> {
        self.require_api_key()?;
        let body = to_json_body(&PushTokenRequest {
            push_token: push_token.map(str::to_string),
        })?;
        self.request_json("/users/push-token", RequestOptions::post().json(body))
            .await
    }
}
