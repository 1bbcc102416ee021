use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::Result;
use crate::types::ExpiryStatus;

/// JSON body posted for each notification event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub certification_id: i64,
    pub employee_id: i64,
    pub threshold: u32,
    pub days_left: i64,
    pub status: ExpiryStatus,
}

#[derive(Debug, Clone)]
pub struct WebhookChannel {
    url: String,
    client: reqwest::Client,
}

impl WebhookChannel {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.trim().to_string(),
            client,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }

    /// POST `payload` once. Transport errors and non-2xx responses are
    /// returned as errors; an empty URL skips the call.
    pub async fn send(&self, payload: &WebhookPayload) -> Result<()> {
        if !self.is_configured() {
            debug!("webhook channel skipped: no url");
            return Ok(());
        }
        self.client
            .post(&self.url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
