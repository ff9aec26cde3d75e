//! Cancellable delayed advance to the next match.
//!
//! At most one advance is pending per scheduler. Scheduling again replaces
//! the pending one; dropping the scheduler cancels it.

use std::{sync::Arc, time::Duration};

use podium_types::MatchId;
use tokio::task::JoinHandle;

/// Callback invoked with the match that just finished settling.
pub type AdvanceFn = Arc<dyn Fn(MatchId) + Send + Sync>;

#[derive(Default)]
pub struct AdvanceScheduler {
    pending: Option<JoinHandle<()>>,
}

impl AdvanceScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke `hook` with `match_id` after `delay`, unless cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, delay: Duration, match_id: MatchId, hook: AdvanceFn) {
        self.cancel();
        tracing::debug!(%match_id, delay_ms = delay.as_millis(), "Auto-advance scheduled");
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::info!(%match_id, "Auto-advancing to next match");
            hook(match_id);
        }));
    }

    /// Cancel the pending advance. Returns `true` if one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                tracing::debug!("Auto-advance cancelled");
                true
            }
            _ => false,
        }
    }

    /// Whether an advance is scheduled and has not fired yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for AdvanceScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
