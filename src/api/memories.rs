use super::client::{to_json_body, ApiClient, RequestOptions};
use super::error::ApiError;
use super::types::{MemoryCreateRequest, MemoryRecord};
use uuid::Uuid;

impl ApiClient {
    /// Store a long-term memory for a user.
    pub async fn create_memory(
        &self,
        request: &MemoryCreateRequest,
    ) -> Result<MemoryRecord, ApiError> {
        self.require_api_key()?;
        if request.text.trim().is_empty() {
            return Err(ApiError::precondition("Memory text must not be empty"));
        }
        let body = to_json_body(request)?;
        self.request_json("/memories", RequestOptions::post().json(body))
            .await
    }

    /// Memories most similar to `query`, best match first.
    pub async fn search_memories(
        &self,
        user_id: Uuid,
        query: &str,
        top_k: u32,
    ) -> Result<Vec<MemoryRecord>, ApiError> {
        self.require_api_key()?;
        if query.trim().is_empty() {
            return Err(ApiError::precondition("Search query must not be empty"));
        }
        if !(1..=50).contains(&top_k) {
            return Err(ApiError::precondition("top_k must be between 1 and 50"));
        }
        let options = RequestOptions::get()
            .query("user_id", user_id.to_string())
            .query("q", query)
            .query("top_k", top_k.to_string());
        self.request_json("/memories/search", options).await
    }
}
