//! Per-wager progress events for the presentation layer.
//!
//! The coordinator publishes one [`ProgressEvent`] as each wager finishes.
//! Publishing never waits on the listener: when the channel is full or
//! closed the event is dropped with a debug log and settlement carries on.

use podium_types::{MatchId, SettlementStage, WagerId, WinningParty};
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};

/// How one wager's settlement ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WagerProgress {
    Settled { winning_party: WinningParty },
    Failed { stage: SettlementStage, message: String },
}

/// Emitted after each wager of a batch completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub match_id: MatchId,
    pub wager_id: WagerId,
    /// 1-based count of wagers completed so far.
    pub completed: usize,
    pub total: usize,
    pub progress: WagerProgress,
}

/// Sending half of the progress channel.
#[derive(Clone)]
pub struct ProgressProducer {
    sender: mpsc::Sender<ProgressEvent>,
}

impl ProgressProducer {
    pub fn new(sender: mpsc::Sender<ProgressEvent>) -> Self {
        Self { sender }
    }

    /// Returns `false` if the event was dropped.
    pub fn publish(&self, event: ProgressEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::debug!(
                    wager = %event.wager_id,
                    completed = event.completed,
                    "Progress listener lagging; event dropped"
                );
                false
            }
            Err(TrySendError::Closed(event)) => {
                tracing::debug!(wager = %event.wager_id, "Progress listener gone; event dropped");
                false
            }
        }
    }
}

/// Create a bounded progress channel.
pub fn progress_channel(buffer: usize) -> (ProgressProducer, mpsc::Receiver<ProgressEvent>) {
    let (sender, receiver) = mpsc::channel(buffer.max(1));
    (ProgressProducer::new(sender), receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(completed: usize) -> ProgressEvent {
        ProgressEvent {
            match_id: MatchId::new("m"),
            wager_id: WagerId::new(),
            completed,
            total: 2,
            progress: WagerProgress::Settled {
                winning_party: WinningParty::Creator,
            },
        }
    }

    #[tokio::test]
    async fn events_arrive_in_order() {
        let (producer, mut rx) = progress_channel(4);
        assert!(producer.publish(event(1)));
        assert!(producer.publish(event(2)));
        assert_eq!(rx.recv().await.unwrap().completed, 1);
        assert_eq!(rx.recv().await.unwrap().completed, 2);
    }

    #[tokio::test]
    async fn closed_channel_does_not_fail() {
        let (producer, rx) = progress_channel(1);
        drop(rx);
        assert!(!producer.publish(event(1)));
    }

    #[test]
    fn full_channel_drops_instead_of_waiting() {
        let (producer, mut rx) = progress_channel(1);
        assert!(producer.publish(event(1)));
        assert!(!producer.publish(event(2)));
        assert_eq!(rx.try_recv().unwrap().completed, 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn progress_serializes_for_ui() {
        let json = serde_json::to_string(&event(1)).unwrap();
        assert!(json.contains("\"completed\":1"));
        assert!(json.contains("Creator"));
    }
}
