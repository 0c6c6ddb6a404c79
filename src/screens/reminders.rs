use crate::api::{ApiClient, ApiError, CancelReminderResponse, Reminder, ReminderStatus};
use crate::infra::lifecycle::RequestSequence;

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RemindersView {
    pub reminders: Vec<Reminder>,
    pub error: Option<String>,
    pub loading: bool,
}

impl RemindersView {
    /// Reminders currently in `status`.
    pub fn bucket(&self, status: ReminderStatus) -> Vec<&Reminder> {
        self.reminders.iter().filter(|r| r.status == status).collect()
    }

    /// Number of reminders per status.
    pub fn counts(&self) -> BTreeMap<ReminderStatus, usize> {
        let mut counts = BTreeMap::new();
        for reminder in &self.reminders {
            *counts.entry(reminder.status).or_insert(0) += 1;
        }
        counts
    }
}

/// Lists and cancels the user's reminders.
///
/// Every refresh replaces the list wholesale. When refreshes overlap, only
/// the most recently issued one is applied.
pub struct RemindersController {
    client: ApiClient,
    sequence: RequestSequence,
    view: parking_lot::RwLock<RemindersView>,
}

impl RemindersController {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            sequence: RequestSequence::new(),
            view: parking_lot::RwLock::new(RemindersView::default()),
        }
    }

    pub fn view(&self) -> RemindersView {
        self.view.read().clone()
    }

    /// Fetch the full list. Returns `false` if a newer refresh superseded
    /// this one and its result was dropped.
    pub async fn refresh(&self) -> Result<bool, ApiError> {
        if let Err(e) = self.client.require_api_key() {
            self.view.write().error = Some(e.to_string());
            return Err(e);
        }

        let ticket = self.sequence.begin();
        self.view.write().loading = true;

        let result = self.client.list_reminders().await;

        if !self.sequence.is_current(ticket) {
            debug!("Discarding superseded reminders response");
            return Ok(false);
        }

        let mut view = self.view.write();
        view.loading = false;
        match result {
            Ok(reminders) => {
                debug!(count = reminders.len(), "Reminders loaded");
                view.reminders = reminders;
                view.error = None;
                Ok(true)
            }
            Err(e) => {
                view.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Cancel one reminder, then reload the whole list.
    ///
    /// The list is not edited locally; it shows the backend's view once the
    /// reload completes.
    pub async fn cancel(&self, id: Uuid) -> Result<CancelReminderResponse, ApiError> {
        let response = match self.client.cancel_reminder(id).await {
            Ok(response) => response,
            Err(e) => {
                self.view.write().error = Some(e.to_string());
                return Err(e);
            }
        };

        if response.changed() {
            info!(%id, "Reminder canceled");
        } else {
            info!(%id, status = %response.status, "Cancel had no effect: {}",
                response.message.as_deref().unwrap_or(""));
        }

        if let Err(e) = self.refresh().await {
            warn!("Reload after cancel failed: {}", e);
        }

        Ok(response)
    }
}
