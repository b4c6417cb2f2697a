use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::usecase::ports::source::SyncOutcome;

pub const CSRF_HEADER: &str = "X-CSRFToken";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("endpoint {url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendReportRequest {
    pub inns: Vec<String>,
    pub recipient_mode: String,
    pub recipient: String,
    pub subject: String,
}

#[derive(Debug, Clone)]
pub struct SyncClient {
    http: reqwest::Client,
    sync_url: String,
    send_url: String,
    csrf_token: String,
}

impl SyncClient {
    pub fn new(sync_url: String, send_url: String, csrf_token: String) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| SyncError::ClientBuild { source })?;
        Ok(Self {
            http,
            sync_url,
            send_url,
            csrf_token,
        })
    }

    pub async fn sync_accreditations(&self, inns: &[String]) -> Result<SyncOutcome, SyncError> {
        self.post_json(&self.sync_url, &serde_json::json!({ "inns": inns }))
            .await
    }

    pub async fn send_report(&self, request: &SendReportRequest) -> Result<SyncOutcome, SyncError> {
        self.post_json(&self.send_url, request).await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<SyncOutcome, SyncError> {
        let response = self
            .http
            .post(url)
            .header(CSRF_HEADER, &self.csrf_token)
            .json(body)
            .send()
            .await
            .map_err(|source| SyncError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        // Rejections arrive as 4xx with the same JSON body shape.
        match response.json::<SyncOutcome>().await {
            Ok(outcome) => Ok(outcome),
            Err(source) if status.is_success() => Err(SyncError::Decode {
                url: url.to_string(),
                source,
            }),
            Err(_) => Err(SyncError::Status {
                url: url.to_string(),
                status,
            }),
        }
    }
}
