//! Batch-level reporting for a resolution run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{MatchId, SettlementOutcome, SettlementStage, WagerId};

/// Phase of a coordinator run.
///
/// `Idle → Running → {AllFailed, PartialSuccess, FullSuccess}`; terminal
/// phases return to `Idle` when acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunPhase {
    Idle,
    Running,
    AllFailed,
    PartialSuccess,
    FullSuccess,
}

impl RunPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::AllFailed | Self::PartialSuccess | Self::FullSuccess
        )
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Running => write!(f, "RUNNING"),
            Self::AllFailed => write!(f, "ALL_FAILED"),
            Self::PartialSuccess => write!(f, "PARTIAL_SUCCESS"),
            Self::FullSuccess => write!(f, "FULL_SUCCESS"),
        }
    }
}

/// One wager that could not be settled, with the stage it failed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WagerFailure {
    pub wager_id: WagerId,
    pub stage: SettlementStage,
    pub message: String,
}

/// Aggregate success/failure summary for one settlement batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub match_id: MatchId,
    pub succeeded: usize,
    pub failed: usize,
    /// Failures in batch order.
    pub errors: Vec<WagerFailure>,
    /// Successful settlements in batch order.
    pub settled: Vec<SettlementOutcome>,
}

impl ResolutionReport {
    #[must_use]
    pub fn new(match_id: MatchId) -> Self {
        Self {
            match_id,
            succeeded: 0,
            failed: 0,
            errors: Vec::new(),
            settled: Vec::new(),
        }
    }

    /// Fold one wager's result into the report.
    pub fn record(&mut self, result: std::result::Result<SettlementOutcome, WagerFailure>) {
        match result {
            Ok(outcome) => {
                self.succeeded += 1;
                self.settled.push(outcome);
            }
            Err(failure) => {
                self.failed += 1;
                self.errors.push(failure);
            }
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// The terminal phase this report implies.
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        match (self.succeeded, self.failed) {
            (0, _) => RunPhase::AllFailed,
            (_, 0) => RunPhase::FullSuccess,
            _ => RunPhase::PartialSuccess,
        }
    }

    #[must_use]
    pub fn failed_wager_ids(&self) -> Vec<WagerId> {
        self.errors.iter().map(|f| f.wager_id).collect()
    }

    /// Operator-facing one-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        match self.phase() {
            RunPhase::FullSuccess => {
                format!("All {} wagers settled for {}", self.succeeded, self.match_id)
            }
            RunPhase::PartialSuccess => format!(
                "{} of {} wagers settled for {}; {} failed and need attention",
                self.succeeded,
                self.total(),
                self.match_id,
                self.failed
            ),
            _ => format!(
                "No wagers settled for {}; {} failed",
                self.match_id, self.failed
            ),
        }
    }
}

impl fmt::Display for ResolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for failure in &self.errors {
            writeln!(
                f,
                "  {} [{}]: {}",
                failure.wager_id, failure.stage, failure.message
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> WagerFailure {
        WagerFailure {
            wager_id: WagerId::new(),
            stage: SettlementStage::LedgerCommit,
            message: "ledger rejected".into(),
        }
    }

    #[test]
    fn empty_report_counts_as_all_failed() {
        let r = ResolutionReport::new(MatchId::new("m1"));
        assert_eq!(r.total(), 0);
        assert_eq!(r.phase(), RunPhase::AllFailed);
    }

    #[test]
    fn failures_keep_batch_order() {
        let mut r = ResolutionReport::new(MatchId::new("m1"));
        let a = failure();
        let b = failure();
        r.record(Err(a.clone()));
        r.record(Err(b.clone()));
        assert_eq!(r.failed_wager_ids(), vec![a.wager_id, b.wager_id]);
        assert_eq!(r.failed, 2);
        assert_eq!(r.phase(), RunPhase::AllFailed);
    }

    #[test]
    fn partial_summary_states_both_counts() {
        let mut r = ResolutionReport::new(MatchId::new("vegas-2024"));
        r.succeeded = 3;
        r.record(Err(failure()));
        r.record(Err(failure()));
        assert_eq!(r.phase(), RunPhase::PartialSuccess);
        let summary = r.summary();
        assert!(summary.contains("3 of 5"), "{summary}");
        assert!(summary.contains("2 failed"), "{summary}");
        let rendered = format!("{r}");
        assert!(rendered.contains("LEDGER_COMMIT"));
    }

    #[test]
    fn terminal_phases() {
        assert!(!RunPhase::Idle.is_terminal());
        assert!(!RunPhase::Running.is_terminal());
        assert!(RunPhase::AllFailed.is_terminal());
        assert!(RunPhase::PartialSuccess.is_terminal());
        assert!(RunPhase::FullSuccess.is_terminal());
    }
}
