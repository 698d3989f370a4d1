//! Normalized status types shared by the render and polling layers.

use std::fmt;

use serde::Serialize;

/// Fully-populated view of one backend status payload.
///
/// Every field is defined: the normalizer substitutes per-field fallbacks
/// for anything the backend omitted, so renderers never branch on missing
/// data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub profile: String,
    pub uptime: String,
    pub load: String,
    pub pwm: PwmValue,
    pub pwm_control_enabled: bool,
    pub capabilities: Capabilities,
    pub sensors: Vec<SensorReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capabilities {
    pub smart_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub name: String,
    pub value: SensorValue,
}

impl SensorReading {
    pub fn new(name: impl Into<String>, value: SensorValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Current PWM duty as reported by the backend.
///
/// Backends report either a number or a preformatted string. Absent values
/// become the `"--"` placeholder rather than a synthetic zero, so a dash on
/// screen always means "not reported".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PwmValue {
    Number(serde_json::Number),
    Text(String),
}

impl PwmValue {
    pub const PLACEHOLDER: &'static str = "--";

    pub fn placeholder() -> Self {
        PwmValue::Text(Self::PLACEHOLDER.to_string())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PwmValue::Text(s) if s == Self::PLACEHOLDER)
    }
}

impl fmt::Display for PwmValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PwmValue::Number(n) => write!(f, "{n}"),
            PwmValue::Text(s) => f.write_str(s),
        }
    }
}

/// One sensor reading, kept in its reported shape for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Number(serde_json::Number),
    Text(String),
}

impl SensorValue {
    pub fn placeholder() -> Self {
        SensorValue::Text(PwmValue::PLACEHOLDER.to_string())
    }

    /// Numeric view of the reading, if it has one.
    ///
    /// Strings are parsed leniently (`"42.5"` counts, `"--"` does not);
    /// non-finite results are discarded so aggregates stay well-defined.
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            SensorValue::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            SensorValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Number(n) => write!(f, "{n}"),
            SensorValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for SensorValue {
    fn from(value: i64) -> Self {
        SensorValue::Number(serde_json::Number::from(value))
    }
}
