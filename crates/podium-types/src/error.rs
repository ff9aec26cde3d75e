//! Error types for the Podium settlement engine.
//!
//! All errors use the `PD_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Outcome validation errors
//! - 2xx: Winner resolution errors
//! - 3xx: Off-chain record store errors
//! - 4xx: Ledger errors
//! - 5xx: Coordinator errors
//! - 7xx: Match-data provider errors
//! - 9xx: General / internal errors

use std::fmt;

use thiserror::Error;

use crate::{CompetitorId, MatchId, OutcomeKind, SettlementStage, Violation, WagerId};

/// Why the ledger refused or failed a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerErrorKind {
    /// Transport failure; the commit may be retried.
    Network,
    /// The ledger evaluated and refused the commit.
    Rejected,
    /// The wager was already settled on the ledger.
    AlreadyResolved,
}

impl fmt::Display for LedgerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Rejected => write!(f, "rejected"),
            Self::AlreadyResolved => write!(f, "already resolved"),
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Central error enum for all Podium operations.
#[derive(Debug, Error)]
pub enum PodiumError {
    // =================================================================
    // Outcome Validation Errors (1xx)
    // =================================================================
    /// The collected outcome is not complete and cannot be submitted.
    #[error("PD_ERR_100: Incomplete outcome: {}", join_violations(.violations))]
    IncompleteOutcome { violations: Vec<Violation> },

    /// The outcome shape does not match the match category.
    #[error("PD_ERR_101: Outcome kind mismatch: expected {expected}, got {actual}")]
    OutcomeKindMismatch {
        expected: OutcomeKind,
        actual: OutcomeKind,
    },

    /// A competitor appears more than once in a finishing order.
    #[error("PD_ERR_102: Competitor listed twice: {0}")]
    DuplicateCompetitor(CompetitorId),

    /// A finishing position is outside the allowed range.
    #[error("PD_ERR_103: Invalid finishing position: {0}")]
    InvalidPosition(usize),

    /// The match has no competitors to rank.
    #[error("PD_ERR_104: Match has no competitors: {0}")]
    EmptyField(MatchId),

    // =================================================================
    // Winner Resolution Errors (2xx)
    // =================================================================
    /// The wager has no acceptor selection and cannot be settled.
    #[error("PD_ERR_200: Wager {0} has no acceptor selection")]
    MissingSelection(WagerId),

    /// A selected competitor has no finishing position in the outcome.
    #[error("PD_ERR_201: Wager {wager_id}: competitor {competitor_id} has no finishing position")]
    MissingRanking {
        wager_id: WagerId,
        competitor_id: CompetitorId,
    },

    /// Both parties picked the same competitor; no winner can be derived.
    #[error("PD_ERR_202: Wager {0}: creator and acceptor picked the same competitor")]
    SamePick(WagerId),

    /// The wager is already resolved.
    #[error("PD_ERR_203: Wager already resolved: {0}")]
    WagerAlreadyResolved(WagerId),

    /// The wager belongs to a different match than the one being settled.
    #[error("PD_ERR_204: Wager {wager_id} belongs to {actual}, not {expected}")]
    WrongMatch {
        wager_id: WagerId,
        expected: MatchId,
        actual: MatchId,
    },

    // =================================================================
    // Record Store Errors (3xx)
    // =================================================================
    /// The off-chain record store failed a write.
    #[error("PD_ERR_300: Storage error: {reason}")]
    Storage { reason: String },

    // =================================================================
    // Ledger Errors (4xx)
    // =================================================================
    /// The ledger failed or refused a commit.
    #[error("PD_ERR_400: Ledger error ({kind}): {reason}")]
    Ledger {
        kind: LedgerErrorKind,
        reason: String,
    },

    // =================================================================
    // Coordinator Errors (5xx)
    // =================================================================
    /// Every wager in the batch failed.
    #[error("PD_ERR_500: All {failed} wagers failed to settle")]
    AggregateFailure { failed: usize },

    /// A resolution run is already in flight.
    #[error("PD_ERR_501: A resolution run is already in progress")]
    AlreadyResolving,

    /// The batch contained no wagers.
    #[error("PD_ERR_502: No wagers to settle for {0}")]
    NoWagers(MatchId),

    /// An external write did not complete in time.
    #[error("PD_ERR_503: {stage} timed out after {after_ms}ms")]
    Timeout {
        stage: SettlementStage,
        after_ms: u64,
    },

    // =================================================================
    // Match-Data Errors (7xx)
    // =================================================================
    /// The match-data provider failed.
    #[error("PD_ERR_700: Match data unavailable: {reason}")]
    MatchData { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("PD_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("PD_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config, missing fields, etc.).
    #[error("PD_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl PodiumError {
    /// Convenience constructor for ledger failures.
    pub fn ledger(kind: LedgerErrorKind, reason: impl Into<String>) -> Self {
        Self::Ledger {
            kind,
            reason: reason.into(),
        }
    }

    /// Convenience constructor for record store failures.
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::Storage {
            reason: reason.into(),
        }
    }

    /// Whether retrying the same operation later could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage { .. } | Self::Timeout { .. } | Self::MatchData { .. } => true,
            Self::Ledger { kind, .. } => *kind == LedgerErrorKind::Network,
            _ => false,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, PodiumError>;

impl From<serde_json::Error> for PodiumError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    #[test]
    fn error_display_contains_prefix() {
        let err = PodiumError::MissingSelection(WagerId::new());
        let msg = format!("{err}");
        assert!(msg.starts_with("PD_ERR_200"), "Got: {msg}");
    }

    #[test]
    fn incomplete_outcome_lists_violations() {
        let err = PodiumError::IncompleteOutcome {
            violations: vec![
                Violation::MissingPosition(Position::new(2).unwrap()),
                Violation::UnplacedCompetitor(CompetitorId::new("HAM")),
            ],
        };
        let msg = format!("{err}");
        assert!(msg.contains("PD_ERR_100"));
        assert!(msg.contains("P2"));
        assert!(msg.contains("HAM"));
    }

    #[test]
    fn ledger_error_display() {
        let err = PodiumError::ledger(LedgerErrorKind::AlreadyResolved, "wager settled");
        let msg = format!("{err}");
        assert!(msg.contains("PD_ERR_400"));
        assert!(msg.contains("already resolved"));
    }

    #[test]
    fn timeout_display() {
        let err = PodiumError::Timeout {
            stage: SettlementStage::LedgerCommit,
            after_ms: 1500,
        };
        let msg = format!("{err}");
        assert!(msg.contains("PD_ERR_503"));
        assert!(msg.contains("LEDGER_COMMIT"));
        assert!(msg.contains("1500"));
    }

    #[test]
    fn retryability() {
        assert!(PodiumError::storage("disk").is_retryable());
        assert!(PodiumError::ledger(LedgerErrorKind::Network, "reset").is_retryable());
        assert!(!PodiumError::ledger(LedgerErrorKind::AlreadyResolved, "dup").is_retryable());
        assert!(!PodiumError::SamePick(WagerId::new()).is_retryable());
    }

    #[test]
    fn all_errors_have_pd_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(PodiumError::AlreadyResolving),
            Box::new(PodiumError::AggregateFailure { failed: 3 }),
            Box::new(PodiumError::NoWagers(MatchId::new("m1"))),
            Box::new(PodiumError::Internal("test".into())),
            Box::new(PodiumError::OutcomeKindMismatch {
                expected: OutcomeKind::Ranking,
                actual: OutcomeKind::SingleWinner,
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("PD_ERR_"),
                "Error missing PD_ERR_ prefix: {msg}"
            );
        }
    }
}
