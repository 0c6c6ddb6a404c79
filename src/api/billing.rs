use super::client::{ApiClient, RequestOptions};
use super::error::ApiError;
use super::types::BillingUrl;

impl ApiClient {
    /// Start a subscription checkout; redirect targets are optional.
    pub async fn billing_checkout(
        &self,
        success_url: Option<&str>,
        cancel_url: Option<&str>,
    ) -> Result<BillingUrl, ApiError> {
        self.require_api_key()?;
        let mut options = RequestOptions::post();
        if let Some(url) = success_url {
            options = options.query("success_url", url);
        }
        if let Some(url) = cancel_url {
            options = options.query("cancel_url", url);
        }
        self.request_json("/billing/checkout", options).await
    }

    pub async fn billing_portal(&self, return_url: Option<&str>) -> Result<BillingUrl, ApiError> {
        self.require_api_key()?;
        let mut options = RequestOptions::post();
        if let Some(url) = return_url {
            options = options.query("return_url", url);
        }
        self.request_json("/billing/portal", options).await
    }
}
