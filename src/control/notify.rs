//! Transient notice scheduling with fixed-delay expiry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::ui::{NoticeKind, Notifier};

pub const DEFAULT_NOTICE_TIMEOUT_MS: u64 = 1800;

/// Shows one notice at a time and hides it after a fixed delay.
///
/// Every notice bumps a generation counter and its expiry task only hides
/// the notice if the generation is still its own. A replacement shown
/// mid-countdown therefore gets its full display time; the superseded
/// timer fires and does nothing.
pub struct NotificationScheduler {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
    generation: Arc<AtomicU64>,
}

impl NotificationScheduler {
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self {
            notifier,
            timeout,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn notify(&self, message: &str, kind: NoticeKind) {
        let current = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.notifier.show(message, kind);

        let notifier = Arc::clone(&self.notifier);
        let generation = Arc::clone(&self.generation);
        let timeout = self.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if generation.load(Ordering::SeqCst) == current {
                notifier.hide();
            }
        });
    }
}
