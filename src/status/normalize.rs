//! Defensive normalization of raw backend status payloads.

use serde_json::Value;

use super::types::{Capabilities, PwmValue, SensorReading, SensorValue, StatusSnapshot};

pub const FALLBACK_PROFILE: &str = "unknown";
pub const FALLBACK_UPTIME: &str = "0h 0m";
pub const FALLBACK_LOAD: &str = "0.00 / 0.00 / 0.00";

/// Snapshot rendered when no status payload is available at all.
pub fn fallback_snapshot() -> StatusSnapshot {
    StatusSnapshot {
        profile: FALLBACK_PROFILE.to_string(),
        uptime: FALLBACK_UPTIME.to_string(),
        load: FALLBACK_LOAD.to_string(),
        pwm: PwmValue::placeholder(),
        pwm_control_enabled: false,
        capabilities: Capabilities {
            smart_available: true,
        },
        sensors: fallback_sensors(),
    }
}

fn fallback_sensors() -> Vec<SensorReading> {
    vec![
        SensorReading::new("cpu", SensorValue::from(0)),
        SensorReading::new("nvme", SensorValue::from(0)),
        SensorReading::new("hdd", SensorValue::from(0)),
    ]
}

/// Builds a fully-populated snapshot from whatever the backend sent.
///
/// Fallbacks apply per field, never whole-payload: a payload missing only
/// `uptime` keeps its real profile, load and sensors. Text fields treat
/// empty strings and zero as absent; flags only fall back when the key is
/// missing or null, so an explicit `false` survives.
pub fn normalize(raw: &Value) -> StatusSnapshot {
    let field = |key: &str| raw.as_object().and_then(|map| map.get(key));

    StatusSnapshot {
        profile: present_text(field("profile")).unwrap_or_else(|| FALLBACK_PROFILE.to_string()),
        uptime: present_text(field("uptime")).unwrap_or_else(|| FALLBACK_UPTIME.to_string()),
        load: present_text(field("load")).unwrap_or_else(|| FALLBACK_LOAD.to_string()),
        pwm: match field("pwm") {
            None | Some(Value::Null) => PwmValue::placeholder(),
            Some(Value::Number(n)) => PwmValue::Number(n.clone()),
            Some(Value::String(s)) => PwmValue::Text(s.clone()),
            Some(other) => PwmValue::Text(scalar_text(other)),
        },
        pwm_control_enabled: defined_flag(field("pwm_control_enabled")).unwrap_or(false),
        capabilities: Capabilities {
            smart_available: defined_flag(
                field("capabilities").and_then(|caps| caps.get("smart_available")),
            )
            .unwrap_or(true),
        },
        sensors: normalize_sensors(field("sensors")),
    }
}

fn normalize_sensors(value: Option<&Value>) -> Vec<SensorReading> {
    match value {
        Some(Value::Array(items)) if !items.is_empty() => {
            items.iter().map(normalize_sensor).collect()
        }
        _ => fallback_sensors(),
    }
}

fn normalize_sensor(item: &Value) -> SensorReading {
    let name = match item.get("name") {
        None | Some(Value::Null) => "unknown".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => scalar_text(other),
    };
    let value = match item.get("value") {
        None | Some(Value::Null) => SensorValue::placeholder(),
        Some(Value::Number(n)) => SensorValue::Number(n.clone()),
        Some(Value::String(s)) => SensorValue::Text(s.clone()),
        Some(other) => SensorValue::Text(scalar_text(other)),
    };
    SensorReading::new(name, value)
}

/// Text view of a field, with empty-ish values treated as absent.
///
/// "Empty-ish" mirrors what backends actually send for unset fields:
/// null, `false`, zero and the empty string.
fn present_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) if is_zero(n) => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(scalar_text(other)),
    }
}

/// Boolean view of a field; `None` only when the key is missing or null.
fn defined_flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(!is_zero(n)),
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(_) | Value::Object(_) => Some(true),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn is_zero(n: &serde_json::Number) -> bool {
    n.as_f64().map_or(false, |v| v == 0.0)
}
