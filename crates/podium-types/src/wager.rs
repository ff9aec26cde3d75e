//! Wager model.
//!
//! A wager is a two-sided bet: the creator picks a competitor, an acceptor
//! later picks another. Wagers are owned by the off-chain record store; the
//! engine reads them and produces resolved copies.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CompetitorId, MatchId, WagerId};

/// Lifecycle status of a wager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum WagerStatus {
    /// Created, waiting for an acceptor.
    Open,
    /// Both sides selected; eligible for settlement.
    Accepted,
    /// Winner determined and committed.
    Resolved,
}

impl std::fmt::Display for WagerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::Resolved => write!(f, "RESOLVED"),
        }
    }
}

/// Which side of a wager won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinningParty {
    Creator,
    Acceptor,
}

impl std::fmt::Display for WinningParty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Creator => write!(f, "CREATOR"),
            Self::Acceptor => write!(f, "ACCEPTOR"),
        }
    }
}

/// One party's pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub username: String,
    pub competitor_id: CompetitorId,
}

impl Selection {
    #[must_use]
    pub fn new(username: impl Into<String>, competitor: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            competitor_id: CompetitorId::new(competitor),
        }
    }
}

/// The resolved winner, embedded into a wager record once settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub winning_competitor_id: CompetitorId,
    pub winning_username: String,
    pub winning_party: WinningParty,
    pub resolved_at: DateTime<Utc>,
}

/// Fields written by the status update once the ledger has confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: WagerStatus,
    pub resolution: Resolution,
}

impl StatusUpdate {
    #[must_use]
    pub fn resolved(resolution: Resolution) -> Self {
        Self {
            status: WagerStatus::Resolved,
            resolution,
        }
    }
}

/// A two-sided wager on a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wager {
    pub id: WagerId,
    pub match_id: MatchId,
    pub status: WagerStatus,
    pub creator: Selection,
    /// Absent while the wager is still open.
    pub acceptor: Option<Selection>,
    pub amount: Decimal,
    /// Present once the wager is resolved.
    pub resolution: Option<Resolution>,
}

impl Wager {
    /// The selection made by `party`, if that party has selected.
    #[must_use]
    pub fn selection_of(&self, party: WinningParty) -> Option<&Selection> {
        match party {
            WinningParty::Creator => Some(&self.creator),
            WinningParty::Acceptor => self.acceptor.as_ref(),
        }
    }

    /// Both sides have selected and the wager is not yet resolved.
    #[must_use]
    pub fn is_settleable(&self) -> bool {
        self.status == WagerStatus::Accepted && self.acceptor.is_some()
    }

    /// A copy of this wager with `resolution` embedded and status `Resolved`.
    #[must_use]
    pub fn resolved_with(&self, resolution: Resolution) -> Self {
        Self {
            status: WagerStatus::Resolved,
            resolution: Some(resolution),
            ..self.clone()
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Wager {
    /// An accepted wager with a random stake.
    pub fn dummy_accepted(match_id: &MatchId, creator_pick: &str, acceptor_pick: &str) -> Self {
        use rand::Rng;
        Self {
            id: WagerId::new(),
            match_id: match_id.clone(),
            status: WagerStatus::Accepted,
            creator: Selection::new("alice", creator_pick),
            acceptor: Some(Selection::new("bob", acceptor_pick)),
            amount: Decimal::new(rand::thread_rng().gen_range(1..10_000), 2),
            resolution: None,
        }
    }

    /// An open wager nobody has accepted yet.
    pub fn dummy_open(match_id: &MatchId, creator_pick: &str) -> Self {
        Self {
            id: WagerId::new(),
            match_id: match_id.clone(),
            status: WagerStatus::Open,
            creator: Selection::new("alice", creator_pick),
            acceptor: None,
            amount: Decimal::new(2500, 2),
            resolution: None,
        }
    }
}
