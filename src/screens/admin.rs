use crate::api::{
    AdminReminder, ApiClient, ApiError, FeatureFlagRecord, FeatureFlagSummary, FeatureFlagUpdate,
    QueueDepth, WorkerStatus,
};
use crate::infra::lifecycle::RequestSequence;

use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminView {
    pub queues: Option<QueueDepth>,
    pub workers: Option<WorkerStatus>,
    pub reminders: Vec<AdminReminder>,
    pub flags: Vec<FeatureFlagSummary>,
    pub error: Option<String>,
}

impl AdminView {
    pub fn flag(&self, key: &str) -> Option<&FeatureFlagSummary> {
        self.flags.iter().find(|f| f.key == key)
    }
}

/// Operator dashboard over the `/admin/*` endpoints.
pub struct AdminController {
    client: ApiClient,
    sequence: RequestSequence,
    view: parking_lot::RwLock<AdminView>,
}

impl AdminController {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            sequence: RequestSequence::new(),
            view: parking_lot::RwLock::new(AdminView::default()),
        }
    }

    pub fn view(&self) -> AdminView {
        self.view.read().clone()
    }

    fn token(&self) -> Result<String, ApiError> {
        self.client.require_admin_token().map_err(|e| {
            self.view.write().error = Some(e.to_string());
            e
        })
    }

    /// Load queues, workers, reminders and flags together.
    ///
    /// Any single failure fails the whole refresh with one message; the
    /// previous data stays on screen.
    pub async fn refresh(&self) -> Result<bool, ApiError> {
        let token = self.token()?;
        let ticket = self.sequence.begin();

        let result = tokio::try_join!(
            self.client.admin_queues(&token),
            self.client.admin_workers(&token),
            self.client.admin_reminders(&token),
            self.client.admin_features(&token),
        );

        if !self.sequence.is_current(ticket) {
            debug!("Discarding superseded admin response");
            return Ok(false);
        }

        let mut view = self.view.write();
        match result {
            Ok((queues, workers, reminders, flags)) => {
                view.queues = Some(queues);
                view.workers = Some(workers);
                view.reminders = reminders;
                view.flags = flags;
                view.error = None;
                Ok(true)
            }
            Err(e) => {
                view.error = Some(format!("Failed to load admin data: {e}"));
                Err(e)
            }
        }
    }

    /// Set a flag, then reload everything.
    pub async fn set_flag(
        &self,
        key: &str,
        enabled: bool,
        description: Option<String>,
    ) -> Result<FeatureFlagRecord, ApiError> {
        let token = self.token()?;
        let update = FeatureFlagUpdate {
            key: key.to_string(),
            enabled,
            description,
        };

        let record = match self.client.set_feature_flag(&token, &update).await {
            Ok(record) => record,
            Err(e) => {
                self.view.write().error = Some(e.to_string());
                return Err(e);
            }
        };
        info!(key, enabled = record.enabled, "Feature flag updated");

        if let Err(e) = self.refresh().await {
            warn!("Reload after flag update failed: {}", e);
        }

        Ok(record)
    }

    /// Flip a flag's stored `enabled` value.
    ///
    /// Loads the flags first if none are known yet.
    pub async fn toggle_flag(&self, key: &str) -> Result<FeatureFlagRecord, ApiError> {
        if self.view.read().flags.is_empty() {
            self.refresh().await?;
        }

        let enabled = self
            .view
            .read()
            .flag(key)
            .map(|flag| flag.enabled)
            .ok_or_else(|| ApiError::precondition(format!("Unknown feature flag '{key}'")))?;

        self.set_flag(key, !enabled, None).await
    }
}
