use super::client::{ApiClient, RequestOptions, ResponseBody};
use super::error::ApiError;
use super::types::{ComponentHealth, StatusResponse};

impl ApiClient {
    /// Liveness check.
    pub async fn health(&self) -> Result<StatusResponse, ApiError> {
        self.request_json("/health", RequestOptions::get()).await
    }

    /// Readiness of each backend component (`"ok"` or `"fail: ..."`).
    pub async fn healthz(&self) -> Result<ComponentHealth, ApiError> {
        self.request_json("/healthz", RequestOptions::get()).await
    }

    /// Counter snapshot as JSON.
    pub async fn basic_metrics(&self) -> Result<serde_json::Value, ApiError> {
        self.request_json("/metrics/basic", RequestOptions::get())
            .await
    }

    /// Metrics in Prometheus text exposition format.
    pub async fn prometheus_metrics(&self) -> Result<String, ApiError> {
        match self.request("/metrics", RequestOptions::get()).await? {
            ResponseBody::Text(text) => Ok(text),
            ResponseBody::Json(value) => Ok(value.to_string()),
        }
    }
}
