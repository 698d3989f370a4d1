//! Display abstraction: named dashboard controls and transient notices.

pub mod console;

pub use console::ConsoleUi;

/// One line in the sensor list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorRow {
    pub text: String,
    pub is_error: bool,
}

impl SensorRow {
    pub fn reading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Ok,
    Error,
}

/// Write-only surface the dashboard renders onto.
///
/// Implementations own their redraw strategy; callers just set controls.
/// Setters take `&self` so one shared handle can serve every component.
pub trait RenderSink: Send + Sync {
    fn set_profile(&self, text: &str);
    fn set_uptime(&self, text: &str);
    fn set_load(&self, text: &str);
    fn set_pwm_value(&self, text: &str);
    fn set_pwm_input_enabled(&self, enabled: bool);
    fn set_pwm_tooltip(&self, text: &str);
    fn set_apply_enabled(&self, enabled: bool);
    fn set_apply_label(&self, text: &str);
    fn set_smart_warning(&self, visible: bool);
    fn set_sensor_rows(&self, rows: Vec<SensorRow>);
    fn push_sensor_row(&self, row: SensorRow);
    fn set_fan_graph(&self, text: &str);
    fn set_debug_text(&self, text: &str);
    fn set_debug_visible(&self, visible: bool);
}

/// Transient user-facing notices (command feedback, not status renders).
pub trait Notifier: Send + Sync {
    fn show(&self, message: &str, kind: NoticeKind);
    fn hide(&self);
}
