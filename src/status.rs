//! Status payload model, normalization, and the last-observation record.

use serde_json::json;

pub mod normalize;
pub mod types;

pub use normalize::{fallback_snapshot, normalize};
pub use types::{Capabilities, PwmValue, SensorReading, SensorValue, StatusSnapshot};

/// Most recent thing the poller learned, kept raw for the debug view.
///
/// Successful polls keep the payload exactly as received. Failed polls keep
/// the error text together with the fallback snapshot that was rendered in
/// its place.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    None,
    Payload(serde_json::Value),
    Failure {
        error: String,
        fallback: StatusSnapshot,
    },
}

impl Observation {
    pub fn as_json(&self) -> serde_json::Value {
        match self {
            Observation::None => json!({}),
            Observation::Payload(payload) => payload.clone(),
            Observation::Failure { error, fallback } => json!({
                "error": error,
                "fallback": fallback,
            }),
        }
    }

    /// Two-space pretty print of the observation for the debug view.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.as_json()).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for Observation {
    fn default() -> Self {
        Observation::None
    }
}
