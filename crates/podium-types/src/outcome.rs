//! Declared match outcomes.
//!
//! A match is settled from exactly one of two outcome shapes: a full
//! finishing order (ranking categories such as multi-car races) or a single
//! declared winner (head-to-head categories). The match-data provider decides
//! which one applies through [`OutcomeKind`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CompetitorId, Position, RankingTable};

/// Which outcome shape a match category uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// Every competitor is assigned a finishing position.
    Ranking,
    /// A single competitor is declared the winner.
    SingleWinner,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ranking => write!(f, "RANKING"),
            Self::SingleWinner => write!(f, "SINGLE_WINNER"),
        }
    }
}

/// The declared real-world result of a match.
///
/// Built by the outcome collector once operator input is complete, consumed
/// once by the resolution coordinator, never persisted in this form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Full finishing order. The table is a bijection by construction.
    Ranking(RankingTable),
    /// Single declared winner.
    Winner { winning_competitor_id: CompetitorId },
}

impl MatchOutcome {
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Ranking(_) => OutcomeKind::Ranking,
            Self::Winner { .. } => OutcomeKind::SingleWinner,
        }
    }

    /// Convenience constructor for the single-winner shape.
    #[must_use]
    pub fn winner(competitor: impl Into<String>) -> Self {
        Self::Winner {
            winning_competitor_id: CompetitorId::new(competitor),
        }
    }

    /// The competitor that won the match outright.
    #[must_use]
    pub fn match_winner(&self) -> Option<&CompetitorId> {
        match self {
            Self::Ranking(table) => table.competitor_at(Position::FIRST),
            Self::Winner {
                winning_competitor_id,
            } => Some(winning_competitor_id),
        }
    }
}

/// A reason why collected operator input is not yet a complete outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Violation {
    /// A finishing position in `1..=N` has no competitor.
    MissingPosition(Position),
    /// A competitor of the match has no finishing position.
    UnplacedCompetitor(CompetitorId),
    /// Single-winner match with no winner selected.
    NoWinnerSelected,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPosition(p) => write!(f, "position {p} is not assigned"),
            Self::UnplacedCompetitor(c) => write!(f, "competitor {c} has no position"),
            Self::NoWinnerSelected => write!(f, "no winner selected"),
        }
    }
}
