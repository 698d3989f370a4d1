//! Configuration model and persistence.

pub mod persistence;
pub mod types;

pub use persistence::{load_config, save_config, DEFAULT_CONFIG_FILE};
pub use types::{BackendSettings, DashboardConfig, DashboardSettings, LoggingSettings};
