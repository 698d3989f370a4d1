//! On-demand raw payload view.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::status::Observation;
use crate::ui::RenderSink;

/// Pretty-prints the last observation into the debug control.
///
/// Disabled by default. While disabled the control stays hidden with empty
/// text; nothing is formatted until somebody actually looks.
pub struct DebugInspector {
    sink: Arc<dyn RenderSink>,
    observation: Arc<RwLock<Observation>>,
    enabled: RwLock<bool>,
}

impl DebugInspector {
    pub fn new(sink: Arc<dyn RenderSink>, observation: Arc<RwLock<Observation>>) -> Self {
        Self {
            sink,
            observation,
            enabled: RwLock::new(false),
        }
    }

    pub async fn is_enabled(&self) -> bool {
        *self.enabled.read().await
    }

    pub async fn set_enabled(&self, enabled: bool) {
        *self.enabled.write().await = enabled;
        self.refresh().await;
    }

    /// Flips the view and reports the new state.
    pub async fn toggle(&self) -> bool {
        let enabled = {
            let mut flag = self.enabled.write().await;
            *flag = !*flag;
            *flag
        };
        self.refresh().await;
        enabled
    }

    /// Re-renders the debug control from the current observation.
    pub async fn refresh(&self) {
        if *self.enabled.read().await {
            let text = self.observation.read().await.pretty();
            self.sink.set_debug_text(&text);
            self.sink.set_debug_visible(true);
        } else {
            self.sink.set_debug_text("");
            self.sink.set_debug_visible(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::status::fallback_snapshot;
    use crate::ui::testing::RecordingSink;

    use super::*;

    fn inspector_with(
        observation: Observation,
    ) -> (Arc<RecordingSink>, Arc<RwLock<Observation>>, DebugInspector) {
        let sink = Arc::new(RecordingSink::default());
        let observation = Arc::new(RwLock::new(observation));
        let inspector = DebugInspector::new(sink.clone(), observation.clone());
        (sink, observation, inspector)
    }

    #[tokio::test]
    async fn starts_disabled_and_hidden() {
        let (sink, _observation, inspector) = inspector_with(Observation::None);
        assert!(!inspector.is_enabled().await);
        inspector.refresh().await;

        let state = sink.snapshot();
        assert_eq!(state.debug_visible, Some(false));
        assert_eq!(state.debug_text, "");
    }

    #[tokio::test]
    async fn empty_observation_shows_an_empty_object() {
        let (sink, _observation, inspector) = inspector_with(Observation::None);
        inspector.set_enabled(true).await;

        let state = sink.snapshot();
        assert_eq!(state.debug_visible, Some(true));
        assert_eq!(state.debug_text, "{}");
    }

    #[tokio::test]
    async fn payload_is_pretty_printed() {
        let (sink, _observation, inspector) =
            inspector_with(Observation::Payload(json!({"pwm": 128})));
        inspector.set_enabled(true).await;

        let state = sink.snapshot();
        assert_eq!(state.debug_text, "{\n  \"pwm\": 128\n}");
    }

    #[tokio::test]
    async fn failure_observation_shows_error_and_fallback() {
        let (sink, _observation, inspector) = inspector_with(Observation::Failure {
            error: "HTTP 503".to_string(),
            fallback: fallback_snapshot(),
        });
        inspector.set_enabled(true).await;

        let text = sink.snapshot().debug_text;
        assert!(text.contains("\"error\": \"HTTP 503\""));
        assert!(text.contains("\"fallback\""));
        assert!(text.contains("\"profile\": \"unknown\""));
    }

    #[tokio::test]
    async fn toggle_flips_and_reports_state() {
        let (sink, _observation, inspector) = inspector_with(Observation::None);
        assert!(inspector.toggle().await);
        assert_eq!(sink.snapshot().debug_visible, Some(true));
        assert!(!inspector.toggle().await);

        let state = sink.snapshot();
        assert_eq!(state.debug_visible, Some(false));
        assert_eq!(state.debug_text, "");
    }

    #[tokio::test]
    async fn refresh_tracks_observation_updates_while_enabled() {
        let (sink, observation, inspector) = inspector_with(Observation::None);
        inspector.set_enabled(true).await;

        *observation.write().await = Observation::Payload(json!({"profile": "perf"}));
        inspector.refresh().await;
        assert!(sink.snapshot().debug_text.contains("\"profile\": \"perf\""));
    }
}
