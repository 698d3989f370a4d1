//! Terminal front-end: ANSI panel on a TTY, plain line output otherwise.

use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{NoticeKind, Notifier, RenderSink, SensorRow};

const REPAINT_INTERVAL_MS: u64 = 250;

#[derive(Debug, Clone)]
struct PanelState {
    profile: String,
    uptime: String,
    load: String,
    pwm_value: String,
    pwm_input_enabled: bool,
    pwm_tooltip: String,
    apply_enabled: bool,
    apply_label: String,
    smart_warning: bool,
    rows: Vec<SensorRow>,
    fan_graph: String,
    debug_text: String,
    debug_visible: bool,
    notice: Option<(String, NoticeKind)>,
    dirty: bool,
}

impl PanelState {
    fn initial() -> Self {
        Self {
            profile: String::new(),
            uptime: String::new(),
            load: String::new(),
            pwm_value: String::new(),
            pwm_input_enabled: false,
            pwm_tooltip: String::new(),
            apply_enabled: false,
            apply_label: "Apply".to_string(),
            smart_warning: false,
            rows: Vec::new(),
            fan_graph: String::new(),
            debug_text: String::new(),
            debug_visible: false,
            notice: None,
            dirty: false,
        }
    }
}

/// Panel renderer over stdout.
///
/// Control writes land in a shared state and mark it dirty; a background
/// task repaints dirty frames a few times a second. On a TTY each frame
/// redraws in place, otherwise frames append as plain text blocks. Logs go
/// to stderr so the panel surface stays clean.
pub struct ConsoleUi {
    ansi: bool,
    state: Mutex<PanelState>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self {
            ansi: atty::is(atty::Stream::Stdout),
            state: Mutex::new(PanelState::initial()),
        }
    }

    /// Creates the UI and spawns its repaint task.
    pub fn start() -> Arc<Self> {
        let ui = Arc::new(Self::new());
        let painter = Arc::clone(&ui);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(REPAINT_INTERVAL_MS));
            loop {
                ticker.tick().await;
                painter.flush_if_dirty();
            }
        });
        ui
    }

    /// Paints the current frame immediately, dirty or not.
    pub fn flush_now(&self) {
        let frame = {
            let mut state = self.state.lock().unwrap();
            state.dirty = false;
            state.clone()
        };
        self.paint(&frame);
    }

    fn flush_if_dirty(&self) {
        let frame = {
            let mut state = self.state.lock().unwrap();
            if !state.dirty {
                return;
            }
            state.dirty = false;
            state.clone()
        };
        self.paint(&frame);
    }

    fn paint(&self, state: &PanelState) {
        let frame = compose(state, self.ansi);
        if self.ansi {
            print!("\x1b[2J\x1b[H{frame}");
            let _ = std::io::stdout().flush();
        } else {
            println!("{frame}");
        }
    }

    fn update(&self, apply: impl FnOnce(&mut PanelState)) {
        let mut state = self.state.lock().unwrap();
        apply(&mut state);
        state.dirty = true;
    }
}

impl RenderSink for ConsoleUi {
    fn set_profile(&self, text: &str) {
        self.update(|s| s.profile = text.to_string());
    }

    fn set_uptime(&self, text: &str) {
        self.update(|s| s.uptime = text.to_string());
    }

    fn set_load(&self, text: &str) {
        self.update(|s| s.load = text.to_string());
    }

    fn set_pwm_value(&self, text: &str) {
        self.update(|s| s.pwm_value = text.to_string());
    }

    fn set_pwm_input_enabled(&self, enabled: bool) {
        self.update(|s| s.pwm_input_enabled = enabled);
    }

    fn set_pwm_tooltip(&self, text: &str) {
        self.update(|s| s.pwm_tooltip = text.to_string());
    }

    fn set_apply_enabled(&self, enabled: bool) {
        self.update(|s| s.apply_enabled = enabled);
    }

    fn set_apply_label(&self, text: &str) {
        self.update(|s| s.apply_label = text.to_string());
    }

    fn set_smart_warning(&self, visible: bool) {
        self.update(|s| s.smart_warning = visible);
    }

    fn set_sensor_rows(&self, rows: Vec<SensorRow>) {
        self.update(|s| s.rows = rows);
    }

    fn push_sensor_row(&self, row: SensorRow) {
        self.update(|s| s.rows.push(row));
    }

    fn set_fan_graph(&self, text: &str) {
        self.update(|s| s.fan_graph = text.to_string());
    }

    fn set_debug_text(&self, text: &str) {
        self.update(|s| s.debug_text = text.to_string());
    }

    fn set_debug_visible(&self, visible: bool) {
        self.update(|s| s.debug_visible = visible);
    }
}

impl Notifier for ConsoleUi {
    fn show(&self, message: &str, kind: NoticeKind) {
        self.update(|s| s.notice = Some((message.to_string(), kind)));
    }

    fn hide(&self) {
        self.update(|s| s.notice = None);
    }
}

fn compose(state: &PanelState, ansi: bool) -> String {
    let dim = if ansi { "\x1b[2m" } else { "" };
    let red = if ansi { "\x1b[31m" } else { "" };
    let green = if ansi { "\x1b[32m" } else { "" };
    let yellow = if ansi { "\x1b[33m" } else { "" };
    let reset = if ansi { "\x1b[0m" } else { "" };

    let mut out = String::new();
    let _ = writeln!(out, "{dim}── fan dashboard ──{reset}");
    let _ = writeln!(
        out,
        "Profile: {}    Uptime: {}    Load: {}",
        state.profile, state.uptime, state.load
    );

    let control = if state.pwm_input_enabled {
        "enabled".to_string()
    } else if state.pwm_tooltip.is_empty() {
        "disabled".to_string()
    } else {
        format!("disabled ({})", state.pwm_tooltip)
    };
    let apply_suffix = if state.apply_enabled { "" } else { " (disabled)" };
    let _ = writeln!(
        out,
        "PWM: {}    control: {}    [{}]{}",
        state.pwm_value, control, state.apply_label, apply_suffix
    );

    if state.smart_warning {
        let _ = writeln!(out, "{yellow}⚠ SMART monitoring unavailable{reset}");
    }

    let _ = writeln!(out, "Sensors:");
    for row in &state.rows {
        if row.is_error {
            let _ = writeln!(out, "  {red}{}{reset}", row.text);
        } else {
            let _ = writeln!(out, "  {}", row.text);
        }
    }
    let _ = writeln!(out, "{}", state.fan_graph);

    if state.debug_visible {
        let _ = writeln!(out, "{dim}── raw payload ──{reset}");
        let _ = writeln!(out, "{}", state.debug_text);
    }

    if let Some((message, kind)) = &state.notice {
        let color = match kind {
            NoticeKind::Ok => green,
            NoticeKind::Error => red,
        };
        let _ = writeln!(out, "{color}{message}{reset}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> PanelState {
        let mut state = PanelState::initial();
        state.profile = "silent".to_string();
        state.uptime = "3h 12m".to_string();
        state.load = "0.42 / 0.38 / 0.31".to_string();
        state.pwm_value = "128".to_string();
        state.pwm_input_enabled = true;
        state.apply_enabled = true;
        state.rows = vec![
            SensorRow::reading("cpu: 42"),
            SensorRow::error("Error: failed to fetch /status"),
        ];
        state.fan_graph = "Fan graph placeholder | max sensor: 42".to_string();
        state
    }

    #[test]
    fn compose_includes_all_visible_controls() {
        let frame = compose(&sample_state(), false);
        assert!(frame.contains("Profile: silent"));
        assert!(frame.contains("Uptime: 3h 12m"));
        assert!(frame.contains("PWM: 128"));
        assert!(frame.contains("control: enabled"));
        assert!(frame.contains("  cpu: 42"));
        assert!(frame.contains("Fan graph placeholder | max sensor: 42"));
    }

    #[test]
    fn compose_plain_mode_has_no_escape_codes() {
        let frame = compose(&sample_state(), false);
        assert!(!frame.contains('\x1b'));
    }

    #[test]
    fn compose_colors_error_rows_on_tty() {
        let frame = compose(&sample_state(), true);
        assert!(frame.contains("\x1b[31mError: failed to fetch /status\x1b[0m"));
    }

    #[test]
    fn disabled_control_shows_tooltip() {
        let mut state = sample_state();
        state.pwm_input_enabled = false;
        state.apply_enabled = false;
        state.pwm_tooltip = "Monitoring-only mode: control agent unavailable".to_string();
        let frame = compose(&state, false);
        assert!(
            frame.contains("control: disabled (Monitoring-only mode: control agent unavailable)")
        );
        assert!(frame.contains("[Apply] (disabled)"));
    }

    #[test]
    fn debug_section_only_renders_when_visible() {
        let mut state = sample_state();
        state.debug_text = "{\n  \"pwm\": 128\n}".to_string();
        state.debug_visible = false;
        assert!(!compose(&state, false).contains("raw payload"));
        state.debug_visible = true;
        let frame = compose(&state, false);
        assert!(frame.contains("raw payload"));
        assert!(frame.contains("\"pwm\": 128"));
    }

    #[test]
    fn notice_renders_with_kind_color() {
        let mut state = sample_state();
        state.notice = Some(("PWM set to 128".to_string(), NoticeKind::Ok));
        let frame = compose(&state, true);
        assert!(frame.contains("\x1b[32mPWM set to 128\x1b[0m"));
        state.notice = Some(("PWM apply failed: HTTP 500".to_string(), NoticeKind::Error));
        let frame = compose(&state, true);
        assert!(frame.contains("\x1b[31mPWM apply failed: HTTP 500\x1b[0m"));
    }

    #[test]
    fn sink_writes_mark_the_panel_dirty() {
        let ui = ConsoleUi::new();
        assert!(!ui.state.lock().unwrap().dirty);
        ui.set_profile("perf");
        let state = ui.state.lock().unwrap();
        assert!(state.dirty);
        assert_eq!(state.profile, "perf");
    }

    #[test]
    fn notices_replace_and_clear() {
        let ui = ConsoleUi::new();
        ui.show("PWM set to 90", NoticeKind::Ok);
        assert!(ui.state.lock().unwrap().notice.is_some());
        ui.hide();
        assert!(ui.state.lock().unwrap().notice.is_none());
    }
}
