//! Per-wager settlement results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CompetitorId, RecordPointer, WagerId, WinningParty};

/// The ordered steps of settling one wager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum SettlementStage {
    /// Winner determination (in-memory).
    Resolve,
    /// Upload of the resolved record to the off-chain store.
    Upload,
    /// Commit of the resolution to the ledger.
    LedgerCommit,
    /// Status update in the off-chain store after ledger confirmation.
    StatusUpdate,
}

impl std::fmt::Display for SettlementStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolve => write!(f, "RESOLVE"),
            Self::Upload => write!(f, "UPLOAD"),
            Self::LedgerCommit => write!(f, "LEDGER_COMMIT"),
            Self::StatusUpdate => write!(f, "STATUS_UPDATE"),
        }
    }
}

/// Proof that the ledger accepted a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    /// Ledger-side transaction identifier.
    pub tx_id: String,
    /// Submitting account's commit sequence number.
    pub sequence: u64,
    pub committed_at: DateTime<Utc>,
}

/// The result of carrying one wager through the settlement pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementOutcome {
    pub wager_id: WagerId,
    pub winning_party: WinningParty,
    pub winning_competitor_id: CompetitorId,
    pub winning_username: String,
    /// Pointer to the resolved record in the off-chain store.
    pub record_pointer: RecordPointer,
    pub receipt: LedgerReceipt,
    /// Single-winner match where neither party picked the declared winner;
    /// the acceptor was still credited. Surfaced for operator review.
    pub non_participant_winner: bool,
}
