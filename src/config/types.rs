//! Dashboard configuration structs and defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub backend: BackendSettings,
    pub dashboard: DashboardSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    pub base_url: String,
    pub request_timeout: f64, // seconds
}

impl BackendSettings {
    /// Request timeout as a `Duration`, clamped to 0.1-3600 s.
    ///
    /// `Duration::from_secs_f64` panics outside its representable range,
    /// and the config value is free-form JSON.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout.clamp(0.1, 3600.0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSettings {
    pub poll_interval_ms: u64,
    pub notice_timeout_ms: u64,
    #[serde(default)]
    pub show_debug: bool, // start with the raw-payload view open
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend: BackendSettings {
                base_url: "http://127.0.0.1:5002".to_string(),
                request_timeout: 5.0,
            },
            dashboard: DashboardSettings {
                poll_interval_ms: 2000,
                notice_timeout_ms: 1800,
                show_debug: false,
            },
            logging: LoggingSettings {
                log_level: "INFO".to_string(),
            },
        }
    }
}
