use super::client::{to_json_body, ApiClient, RequestOptions};
use super::error::ApiError;
use super::types::{Agenda, CalendarAddRequest, CalendarAddResponse};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

impl ApiClient {
    /// Create a calendar event for a scheduled reminder.
    pub async fn calendar_add(
        &self,
        request: &CalendarAddRequest,
    ) -> Result<CalendarAddResponse, ApiError> {
        self.require_api_key()?;
        if !(5..=1440).contains(&request.duration_minutes) {
            return Err(ApiError::precondition(
                "Duration must be between 5 and 1440 minutes",
            ));
        }
        let body = to_json_body(request)?;
        self.request_json("/calendar/add", RequestOptions::post().json(body))
            .await
    }

    /// Calendar events for one day (today in the backend's timezone if
    /// `date` is `None`).
    pub async fn calendar_list(
        &self,
        date: Option<NaiveDate>,
        limit: u32,
    ) -> Result<Vec<serde_json::Value>, ApiError> {
        self.require_api_key()?;
        if !(1..=50).contains(&limit) {
            return Err(ApiError::precondition("Limit must be between 1 and 50"));
        }
        let mut options = RequestOptions::get().query("limit", limit.to_string());
        if let Some(date) = date {
            options = options.query("date", date.format("%Y-%m-%d").to_string());
        }
        self.request_json("/calendar/list", options).await
    }

    /// Upcoming events and tasks in a time window.
    pub async fn agenda(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Agenda, ApiError> {
        self.require_api_key()?;
        let mut options = RequestOptions::get();
        if let Some(from) = from {
            options = options.query("from", from.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        if let Some(to) = to {
            options = options.query("to", to.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        self.request_json("/agenda", options).await
    }

    /// URL that starts the Google OAuth consent flow in a browser.
    pub fn google_oauth_start_url(&self) -> String {
        self.url_for("/oauth/google/start")
    }
}
