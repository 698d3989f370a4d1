//! reqwest-backed `DeviceApi` implementation.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{ApiError, DeviceApi, PwmRoute, STATUS_PATH};

/// HTTP client for one fan-control backend.
#[derive(Debug, Clone)]
pub struct HttpDeviceApi {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl HttpDeviceApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request_id() -> String {
        Uuid::new_v4().simple().to_string()
    }
}

#[async_trait]
impl DeviceApi for HttpDeviceApi {
    async fn fetch_status(&self) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(STATUS_PATH);
        debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .header("Cache-Control", "no-store")
            .header("x-request-id", Self::request_id())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn send_pwm(&self, route: PwmRoute, value: u8) -> Result<u16, ApiError> {
        let url = self.endpoint(&route.path(value));
        debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .header("x-request-id", Self::request_id())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}

fn normalize_base_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        bail!("Backend base URL is empty");
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
