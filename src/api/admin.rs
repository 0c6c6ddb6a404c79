use super::client::{to_json_body, ApiClient, RequestOptions};
use super::error::ApiError;
use super::types::{
    AdminReminder, FeatureFlagRecord, FeatureFlagSummary, FeatureFlagUpdate, QueueDepth,
    WorkerStatus,
};

impl ApiClient {
    fn admin_get(&self, token: &str) -> RequestOptions {
        RequestOptions::get().admin_token(token)
    }

    pub async fn admin_queues(&self, token: &str) -> Result<QueueDepth, ApiError> {
        self.request_json("/admin/queues", self.admin_get(token)).await
    }

    pub async fn admin_workers(&self, token: &str) -> Result<WorkerStatus, ApiError> {
        self.request_json("/admin/workers", self.admin_get(token)).await
    }

    /// The most recent reminders across all users.
    pub async fn admin_reminders(&self, token: &str) -> Result<Vec<AdminReminder>, ApiError> {
        self.request_json("/admin/reminders", self.admin_get(token))
            .await
    }

    pub async fn admin_features(&self, token: &str) -> Result<Vec<FeatureFlagSummary>, ApiError> {
        self.request_json("/admin/features", self.admin_get(token))
            .await
    }

    pub async fn set_feature_flag(
        &self,
        token: &str,
        update: &FeatureFlagUpdate,
    ) -> Result<FeatureFlagRecord, ApiError> {
        let body = to_json_body(update)?;
        self.request_json(
            "/admin/features",
            RequestOptions::post().admin_token(token).json(body),
        )
        .await
    }
}
