use super::client::{ApiClient, RequestOptions};
use super::error::ApiError;
use super::types::{CancelReminderResponse, Reminder};
use uuid::Uuid;

impl ApiClient {
    /// Every reminder of the current user, newest first.
    pub async fn list_reminders(&self) -> Result<Vec<Reminder>, ApiError> {
        self.require_api_key()?;
        self.request_json("/reminders", RequestOptions::get()).await
    }

    pub async fn cancel_reminder(&self, id: Uuid) -> Result<CancelReminderResponse, ApiError> {
        self.require_api_key()?;
        self.request_json(&format!("/reminders/{id}/cancel"), RequestOptions::post())
            .await
    }
}
