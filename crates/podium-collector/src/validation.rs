//! Validation derived from collector state.
//!
//! Nothing here mutates state: the status is recomputed from the current
//! selections whenever it is asked for.

use podium_types::{MatchOutcome, PodiumError, Position, Result, Violation};

use crate::collector::{CollectorState, Selections};

/// Whether the collected input can be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorStatus {
    /// Every violation that blocks submission, positions first.
    Incomplete(Vec<Violation>),
    Complete,
}

impl CollectorStatus {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Incomplete(v) => v,
            Self::Complete => &[],
        }
    }
}

/// All violations in `state`. Empty means the outcome is complete.
///
/// Ranking: every position `1..=N` is assigned and every competitor of the
/// match is placed. Since the table is a bijection over known competitors,
/// this is equivalent to every competitor appearing exactly once.
/// Single winner: a winner is selected.
#[must_use]
pub fn validate(state: &CollectorState) -> Vec<Violation> {
    match state.selections() {
        Selections::Ranking(table) => {
            let missing = Position::range(state.field_size())
                .filter(|p| table.competitor_at(*p).is_none())
                .map(Violation::MissingPosition);
            let unplaced = state
                .competitors()
                .iter()
                .filter(|c| !table.contains(&c.id))
                .map(|c| Violation::UnplacedCompetitor(c.id.clone()));
            missing.chain(unplaced).collect()
        }
        Selections::SingleWinner(None) => vec![Violation::NoWinnerSelected],
        Selections::SingleWinner(Some(_)) => Vec::new(),
    }
}

#[must_use]
pub fn status(state: &CollectorState) -> CollectorStatus {
    let violations = validate(state);
    if violations.is_empty() {
        CollectorStatus::Complete
    } else {
        CollectorStatus::Incomplete(violations)
    }
}

/// Turn a complete state into the outcome to settle.
///
/// # Errors
/// `IncompleteOutcome` carrying every violation when the state is not
/// complete.
pub fn finalize(state: &CollectorState) -> Result<MatchOutcome> {
    let violations = validate(state);
    if !violations.is_empty() {
        return Err(PodiumError::IncompleteOutcome { violations });
    }
    let outcome = match state.selections() {
        Selections::Ranking(table) => MatchOutcome::Ranking(table.clone()),
        Selections::SingleWinner(Some(winner)) => MatchOutcome::Winner {
            winning_competitor_id: winner.clone(),
        },
        Selections::SingleWinner(None) => {
            return Err(PodiumError::IncompleteOutcome {
                violations: vec![Violation::NoWinnerSelected],
            });
        }
    };
    tracing::info!(
        match_id = %state.match_id(),
        kind = %outcome.kind(),
        "Outcome finalised"
    );
    Ok(outcome)
}
