//! Backend API seam: the `DeviceApi` trait plus its HTTP implementation.

use async_trait::async_trait;
use thiserror::Error;

pub mod http;

pub use http::HttpDeviceApi;

/// Path of the status endpoint polled by the dashboard.
pub const STATUS_PATH: &str = "/status";

/// Routes that accept a PWM write.
///
/// Older firmware only serves the legacy route; callers probe `Primary`
/// first and fall back when it answers 404 or 405.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmRoute {
    Primary,
    Legacy,
}

impl PwmRoute {
    #[must_use]
    pub fn path(self, value: u8) -> String {
        match self {
            PwmRoute::Primary => format!("/pwm/{value}"),
            PwmRoute::Legacy => format!("/set/{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(String),
    /// The backend answered with a non-success status.
    #[error("HTTP {0}")]
    Http(u16),
    /// The response body was not the JSON we expected.
    #[error("invalid response body: {0}")]
    Parse(String),
}

/// What the dashboard needs from a fan-control backend.
///
/// `fetch_status` hands back the raw JSON document untouched; normalization
/// is the caller's job so the debug view can show exactly what arrived.
/// `send_pwm` resolves with the HTTP status for any completed exchange,
/// leaving route-fallback policy to the dispatcher.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    async fn fetch_status(&self) -> Result<serde_json::Value, ApiError>;

    async fn send_pwm(&self, route: PwmRoute, value: u8) -> Result<u16, ApiError>;
}
