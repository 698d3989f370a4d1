//! Fixed-interval poll loop with ordered application of responses.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, info};

use crate::api::{ApiError, DeviceApi};
use crate::render::{DebugInspector, RenderEngine};
use crate::status::{fallback_snapshot, normalize, Observation};

type TickOutcome = (u64, Result<serde_json::Value, ApiError>);

/// Per-loop bookkeeping: which tick was issued last, which response was
/// applied last, and whether the feed is currently failing.
struct TickState {
    issued: u64,
    applied: u64,
    failing: bool,
}

/// Drives the dashboard: fetches `/status` on a fixed cadence and applies
/// each response to the render engine, inspector and observation store.
///
/// Fetches run as spawned tasks so a slow backend never stalls the tick
/// cadence. Responses carry their tick id and anything older than the last
/// applied response is dropped, so a stale payload can never overwrite a
/// newer render.
pub struct StatusPoller {
    api: Arc<dyn DeviceApi>,
    engine: RenderEngine,
    inspector: Arc<DebugInspector>,
    observation: Arc<RwLock<Observation>>,
    interval: Duration,
    running: Arc<RwLock<bool>>,
}

impl StatusPoller {
    pub fn new(
        api: Arc<dyn DeviceApi>,
        engine: RenderEngine,
        inspector: Arc<DebugInspector>,
        observation: Arc<RwLock<Observation>>,
        interval: Duration,
    ) -> Self {
        Self {
            api,
            engine,
            inspector,
            observation,
            // tokio's interval panics on a zero period
            interval: interval.max(Duration::from_millis(1)),
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn run(&self) -> Result<()> {
        *self.running.write().await = true;
        self.engine.render_loading();

        let (tx, mut rx) = mpsc::unbounded_channel::<TickOutcome>();
        let mut ticker = tokio::time::interval(self.interval);
        let mut state = TickState {
            issued: 0,
            applied: 0,
            failing: false,
        };

        info!(
            "Polling status every {}ms",
            self.interval.as_millis()
        );

        loop {
            if !*self.running.read().await {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    state.issued += 1;
                    self.spawn_fetch(state.issued, tx.clone());
                }
                Some((id, result)) = rx.recv() => {
                    self.handle_completion(&mut state, id, result).await;
                }
            }
        }

        info!("Status polling stopped");
        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping status polling...");
        *self.running.write().await = false;
    }

    fn spawn_fetch(&self, id: u64, tx: mpsc::UnboundedSender<TickOutcome>) {
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            let result = api.fetch_status().await;
            let _ = tx.send((id, result));
        });
    }

    async fn handle_completion(
        &self,
        state: &mut TickState,
        id: u64,
        result: Result<serde_json::Value, ApiError>,
    ) {
        if id <= state.applied {
            debug!("Discarding stale status response from tick {id}");
            return;
        }
        state.applied = id;

        match result {
            Ok(payload) => {
                if state.failing {
                    info!("✅ Status feed recovered");
                }
                state.failing = false;
                self.apply_payload(payload).await;
            }
            Err(err) => {
                error!("Dashboard update failed: {err}");
                state.failing = true;
                self.apply_failure(err).await;
            }
        }
    }

    async fn apply_payload(&self, payload: serde_json::Value) {
        let snapshot = normalize(&payload);
        *self.observation.write().await = Observation::Payload(payload);
        self.engine.render(&snapshot);
        self.inspector.refresh().await;
    }

    async fn apply_failure(&self, err: ApiError) {
        let fallback = fallback_snapshot();
        *self.observation.write().await = Observation::Failure {
            error: err.to_string(),
            fallback: fallback.clone(),
        };
        self.engine.render(&fallback);
        self.inspector.refresh().await;
        self.engine.append_fetch_error();
    }
}
