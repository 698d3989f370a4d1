//! PWM apply pipeline: validate, guard, post, notify.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, DeviceApi, PwmRoute};
use crate::ui::{NoticeKind, RenderSink};

use super::notify::NotificationScheduler;

const APPLYING_LABEL: &str = "Applying...";
const IDLE_LABEL: &str = "Apply";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Input did not parse as an integer in 0-255.
    #[error("Invalid PWM value (0-255)")]
    InvalidValue(String),
    /// The backend answered the write with a non-success status.
    #[error("HTTP {0}")]
    Rejected(u16),
    /// The write never reached the backend.
    #[error("{0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied(u8),
    Rejected(CommandError),
    /// Dropped because another apply was still in flight.
    Ignored,
}

/// Integer in 0-255, leniently parsed: any numeric format denoting an
/// integral value in range is accepted (`"128"`, `"128.0"`, `"1e2"`).
/// Anything else, including empty input, is the fixed user-facing range
/// error.
pub fn parse_pwm(raw: &str) -> Result<u8, CommandError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.fract() == 0.0 && (0.0..=255.0).contains(value))
        .map(|value| value as u8)
        .ok_or_else(|| CommandError::InvalidValue(raw.trim().to_string()))
}

/// Applies PWM values against the backend, one attempt at a time.
///
/// While an attempt is outstanding the input controls are disabled and the
/// apply label reads "Applying..."; both are restored once the attempt
/// resolves, whatever the outcome. Concurrent activations are ignored
/// outright rather than queued.
pub struct PwmDispatcher {
    api: Arc<dyn DeviceApi>,
    sink: Arc<dyn RenderSink>,
    notices: NotificationScheduler,
    in_flight: Mutex<bool>,
}

impl PwmDispatcher {
    pub fn new(
        api: Arc<dyn DeviceApi>,
        sink: Arc<dyn RenderSink>,
        notices: NotificationScheduler,
    ) -> Self {
        Self {
            api,
            sink,
            notices,
            in_flight: Mutex::new(false),
        }
    }

    /// Mirrors slider motion into the value readout without applying.
    pub fn preview(&self, raw: &str) {
        match parse_pwm(raw) {
            Ok(value) => self.sink.set_pwm_value(&value.to_string()),
            Err(_) => self.sink.set_pwm_value(raw.trim()),
        }
    }

    pub async fn apply(&self, raw: &str) -> DispatchOutcome {
        // Busy check and validation happen under one lock acquisition with
        // no awaits, so two activations can never both claim the slot.
        let value = {
            let mut in_flight = self.in_flight.lock().await;
            if *in_flight {
                debug!("Ignoring PWM apply: an attempt is already in flight");
                return DispatchOutcome::Ignored;
            }
            match parse_pwm(raw) {
                Ok(value) => {
                    *in_flight = true;
                    value
                }
                Err(err) => {
                    drop(in_flight);
                    warn!("Rejected PWM input {raw:?}");
                    self.notices.notify(&err.to_string(), NoticeKind::Error);
                    return DispatchOutcome::Rejected(err);
                }
            }
        };

        self.sink.set_pwm_input_enabled(false);
        self.sink.set_apply_enabled(false);
        self.sink.set_apply_label(APPLYING_LABEL);

        let result = self.post_with_fallback(value).await;

        // Unconditional restore; the next status render re-applies whatever
        // enablement the backend reports.
        self.sink.set_pwm_input_enabled(true);
        self.sink.set_apply_enabled(true);
        self.sink.set_apply_label(IDLE_LABEL);
        *self.in_flight.lock().await = false;

        match result {
            Ok(()) => {
                info!("✅ PWM set to {value}");
                self.notices
                    .notify(&format!("PWM set to {value}"), NoticeKind::Ok);
                DispatchOutcome::Applied(value)
            }
            Err(err) => {
                error!("PWM apply failed: {err}");
                self.notices
                    .notify(&format!("PWM apply failed: {err}"), NoticeKind::Error);
                DispatchOutcome::Rejected(err)
            }
        }
    }

    async fn post_with_fallback(&self, value: u8) -> Result<(), CommandError> {
        let mut status = self
            .api
            .send_pwm(PwmRoute::Primary, value)
            .await
            .map_err(transport_error)?;

        if status == 404 || status == 405 {
            debug!("Primary PWM route answered {status}, retrying legacy route");
            status = self
                .api
                .send_pwm(PwmRoute::Legacy, value)
                .await
                .map_err(transport_error)?;
        }

        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(CommandError::Rejected(status))
        }
    }
}

fn transport_error(err: ApiError) -> CommandError {
    match err {
        ApiError::Transport(message) => CommandError::Transport(message),
        other => CommandError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::Notify;

    use crate::api::testing::ScriptedApi;
    use crate::ui::testing::{RecordingNotifier, RecordingSink};

    use super::*;

    struct Harness {
        api: Arc<ScriptedApi>,
        sink: Arc<RecordingSink>,
        notifier: Arc<RecordingNotifier>,
        dispatcher: Arc<PwmDispatcher>,
    }

    fn harness() -> Harness {
        let api = Arc::new(ScriptedApi::default());
        let sink = Arc::new(RecordingSink::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let notices =
            NotificationScheduler::new(notifier.clone(), Duration::from_millis(1800));
        let dispatcher = Arc::new(PwmDispatcher::new(api.clone(), sink.clone(), notices));
        Harness {
            api,
            sink,
            notifier,
            dispatcher,
        }
    }

    #[tokio::test]
    async fn invalid_inputs_never_reach_the_backend() {
        let h = harness();
        for raw in ["-1", "256", "3.5", "abc", ""] {
            let outcome = h.dispatcher.apply(raw).await;
            assert!(
                matches!(outcome, DispatchOutcome::Rejected(CommandError::InvalidValue(_))),
                "expected rejection for {raw:?}"
            );
        }

        assert!(h.api.recorded_pwm_calls().await.is_empty());
        assert_eq!(
            h.notifier.current(),
            Some(("Invalid PWM value (0-255)".to_string(), NoticeKind::Error))
        );
        // Controls were never touched: no disable happened for bad input.
        let state = h.sink.snapshot();
        assert!(state.apply_label_history.is_empty());
        assert!(state.pwm_input_history.is_empty());
    }

    #[tokio::test]
    async fn boundary_values_are_accepted() {
        let h = harness();
        h.api.queue_pwm(Ok(200)).await;
        assert_eq!(h.dispatcher.apply("0").await, DispatchOutcome::Applied(0));
        h.api.queue_pwm(Ok(200)).await;
        assert_eq!(
            h.dispatcher.apply(" 255 ").await,
            DispatchOutcome::Applied(255)
        );
        assert_eq!(
            h.api.recorded_pwm_calls().await,
            vec![(PwmRoute::Primary, 0), (PwmRoute::Primary, 255)]
        );
    }

    #[tokio::test]
    async fn integral_numeric_formats_are_accepted() {
        let h = harness();
        h.api.queue_pwm(Ok(200)).await;
        assert_eq!(
            h.dispatcher.apply("128.0").await,
            DispatchOutcome::Applied(128)
        );
        h.api.queue_pwm(Ok(200)).await;
        assert_eq!(h.dispatcher.apply("1e2").await, DispatchOutcome::Applied(100));
        assert_eq!(
            h.api.recorded_pwm_calls().await,
            vec![(PwmRoute::Primary, 128), (PwmRoute::Primary, 100)]
        );
    }

    #[tokio::test]
    async fn legacy_route_is_tried_on_404_and_405() {
        let h = harness();
        h.api.queue_pwm(Ok(405)).await;
        h.api.queue_pwm(Ok(200)).await;

        let outcome = h.dispatcher.apply("128").await;
        assert_eq!(outcome, DispatchOutcome::Applied(128));
        assert_eq!(
            h.api.recorded_pwm_calls().await,
            vec![(PwmRoute::Primary, 128), (PwmRoute::Legacy, 128)]
        );
        assert_eq!(
            h.notifier.current(),
            Some(("PWM set to 128".to_string(), NoticeKind::Ok))
        );
    }

    #[tokio::test]
    async fn other_failures_do_not_fall_back() {
        let h = harness();
        h.api.queue_pwm(Ok(500)).await;

        let outcome = h.dispatcher.apply("128").await;
        assert_eq!(
            outcome,
            DispatchOutcome::Rejected(CommandError::Rejected(500))
        );
        assert_eq!(
            h.api.recorded_pwm_calls().await,
            vec![(PwmRoute::Primary, 128)]
        );
        assert_eq!(
            h.notifier.current(),
            Some(("PWM apply failed: HTTP 500".to_string(), NoticeKind::Error))
        );
    }

    #[tokio::test]
    async fn failing_legacy_route_reports_its_own_status() {
        let h = harness();
        h.api.queue_pwm(Ok(404)).await;
        h.api.queue_pwm(Ok(404)).await;

        let outcome = h.dispatcher.apply("90").await;
        assert_eq!(
            outcome,
            DispatchOutcome::Rejected(CommandError::Rejected(404))
        );
        assert_eq!(h.api.recorded_pwm_calls().await.len(), 2);
    }

    #[tokio::test]
    async fn transport_failures_surface_without_fallback() {
        let h = harness();
        h.api
            .queue_pwm(Err(ApiError::Transport("connection refused".into())))
            .await;

        let outcome = h.dispatcher.apply("70").await;
        assert_eq!(
            outcome,
            DispatchOutcome::Rejected(CommandError::Transport("connection refused".into()))
        );
        assert_eq!(h.api.recorded_pwm_calls().await.len(), 1);
        assert_eq!(
            h.notifier.current(),
            Some((
                "PWM apply failed: connection refused".to_string(),
                NoticeKind::Error
            ))
        );
    }

    #[tokio::test]
    async fn controls_are_restored_after_success_and_failure() {
        let h = harness();
        h.api.queue_pwm(Ok(200)).await;
        h.dispatcher.apply("128").await;

        let state = h.sink.snapshot();
        assert_eq!(state.apply_label_history, vec!["Applying...", "Apply"]);
        assert_eq!(state.pwm_input_history, vec![false, true]);
        assert_eq!(state.apply_enabled_history, vec![false, true]);

        h.api.queue_pwm(Ok(503)).await;
        h.dispatcher.apply("90").await;

        let state = h.sink.snapshot();
        assert_eq!(
            state.apply_label_history,
            vec!["Applying...", "Apply", "Applying...", "Apply"]
        );
        assert_eq!(state.pwm_input_history, vec![false, true, false, true]);
        assert_eq!(state.apply_label, "Apply");
    }

    #[tokio::test]
    async fn concurrent_applies_are_ignored_not_queued() {
        let h = harness();
        let gate = Arc::new(Notify::new());
        *h.api.pwm_gate.lock().await = Some(gate.clone());
        h.api.queue_pwm(Ok(200)).await;

        let first = tokio::spawn({
            let dispatcher = h.dispatcher.clone();
            async move { dispatcher.apply("128").await }
        });
        while h.api.recorded_pwm_calls().await.is_empty() {
            tokio::task::yield_now().await;
        }

        let second = h.dispatcher.apply("90").await;
        assert_eq!(second, DispatchOutcome::Ignored);
        assert_eq!(h.api.recorded_pwm_calls().await.len(), 1);

        gate.notify_one();
        assert_eq!(first.await.unwrap(), DispatchOutcome::Applied(128));

        // Slot is free again afterwards.
        *h.api.pwm_gate.lock().await = None;
        h.api.queue_pwm(Ok(200)).await;
        assert_eq!(h.dispatcher.apply("70").await, DispatchOutcome::Applied(70));
        assert_eq!(h.api.recorded_pwm_calls().await.len(), 2);
    }

    #[tokio::test]
    async fn preview_echoes_parsed_values() {
        let h = harness();
        h.dispatcher.preview(" 128 ");
        assert_eq!(h.sink.snapshot().pwm_value, "128");
        h.dispatcher.preview("wat");
        assert_eq!(h.sink.snapshot().pwm_value, "wat");
        assert!(h.api.recorded_pwm_calls().await.is_empty());
    }
}
