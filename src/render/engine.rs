//! Projects normalized snapshots onto the render sink.

use std::sync::Arc;

use crate::status::{SensorReading, StatusSnapshot};
use crate::ui::{RenderSink, SensorRow};

pub const LOADING_TEXT: &str = "Loading...";
pub const LOADING_SENSORS_TEXT: &str = "Loading sensors...";
pub const LOADING_FAN_TEXT: &str = "Loading fan data...";
pub const FETCH_ERROR_ROW: &str = "Error: failed to fetch /status";
pub const CONTROL_UNAVAILABLE_TOOLTIP: &str = "Monitoring-only mode: control agent unavailable";

/// Stateless projection of snapshots onto the sink.
///
/// `render` rewrites every control from scratch each time, so the sink
/// never accumulates state from earlier payloads.
pub struct RenderEngine {
    sink: Arc<dyn RenderSink>,
}

impl RenderEngine {
    pub fn new(sink: Arc<dyn RenderSink>) -> Self {
        Self { sink }
    }

    /// Placeholder text for every data control, shown until the first poll
    /// completes. Command controls are left alone.
    pub fn render_loading(&self) {
        self.sink.set_profile(LOADING_TEXT);
        self.sink.set_uptime(LOADING_TEXT);
        self.sink.set_load(LOADING_TEXT);
        self.sink.set_pwm_value(LOADING_TEXT);
        self.sink
            .set_sensor_rows(vec![SensorRow::reading(LOADING_SENSORS_TEXT)]);
        self.sink.set_fan_graph(LOADING_FAN_TEXT);
    }

    /// Full rewrite of the dashboard from one snapshot.
    pub fn render(&self, snapshot: &StatusSnapshot) {
        self.sink.set_profile(&snapshot.profile);
        self.sink.set_uptime(&snapshot.uptime);
        self.sink.set_load(&snapshot.load);
        self.sink.set_pwm_value(&snapshot.pwm.to_string());

        let control = snapshot.pwm_control_enabled;
        self.sink.set_pwm_input_enabled(control);
        self.sink.set_pwm_tooltip(if control {
            ""
        } else {
            CONTROL_UNAVAILABLE_TOOLTIP
        });
        self.sink.set_apply_enabled(control);

        self.sink
            .set_smart_warning(!snapshot.capabilities.smart_available);

        self.sink.set_sensor_rows(
            snapshot
                .sensors
                .iter()
                .map(|sensor| SensorRow::reading(format!("{}: {}", sensor.name, sensor.value)))
                .collect(),
        );

        self.sink.set_fan_graph(&format!(
            "Fan graph placeholder | max sensor: {}",
            max_sensor_value(&snapshot.sensors)
        ));
    }

    /// Appends a highlighted failure row under the sensor list.
    pub fn append_fetch_error(&self) {
        self.sink.push_sensor_row(SensorRow::error(FETCH_ERROR_ROW));
    }
}

/// Largest finite sensor reading, or 0 when nothing parses as a number.
pub fn max_sensor_value(sensors: &[SensorReading]) -> f64 {
    sensors
        .iter()
        .filter_map(|sensor| sensor.value.as_finite())
        .reduce(f64::max)
        .unwrap_or(0.0)
}
