//! Config file load and save.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::types::DashboardConfig;

pub const DEFAULT_CONFIG_FILE: &str = "fandash.json";

fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
    if let Some(p) = path {
        return Ok(PathBuf::from(p));
    }
    // Default config location: next to the binary
    let exe_dir = std::env::current_exe()?
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine executable directory"))?
        .to_path_buf();
    Ok(exe_dir.join(DEFAULT_CONFIG_FILE))
}

pub async fn load_config(path: Option<&str>) -> Result<DashboardConfig> {
    let config_path = resolve_path(path)?;

    if config_path.exists() {
        let content = tokio::fs::read_to_string(&config_path).await?;
        let config: DashboardConfig = serde_json::from_str(&content)?;

        // Validate configuration
        if config.backend.base_url.trim().is_empty() {
            warn!(
                "⚠️ Backend base URL is empty in {:?}. Status polling will fail.",
                config_path
            );
        }
        if config.dashboard.poll_interval_ms == 0 {
            warn!(
                "poll_interval_ms is 0 in {:?}; polling will run flat out",
                config_path
            );
        }

        info!("Loaded configuration from: {:?}", config_path);
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(DashboardConfig::default())
    }
}

pub async fn save_config(config: &DashboardConfig, path: Option<&str>) -> Result<()> {
    let config_path = resolve_path(path)?;
    let content = serde_json::to_string_pretty(config)?;
    tokio::fs::write(&config_path, content).await?;
    info!("Configuration saved to: {:?}", config_path);
    Ok(())
}
