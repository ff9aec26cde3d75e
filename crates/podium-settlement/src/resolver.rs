//! Winner determination for a single wager. Pure: no I/O, no side effects
//! beyond a log line.
//!
//! Two rules, one per outcome shape:
//! - **Ranking**: the party whose competitor finished at the numerically
//!   lower position wins.
//! - **Single winner**: the creator wins iff the creator picked the declared
//!   winner; in every other case the acceptor wins.

use podium_types::{
    CompetitorId, MatchOutcome, PodiumError, Result, Wager, WagerStatus, WinningParty,
};

/// Who won a wager, and with which pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerDecision {
    pub party: WinningParty,
    pub competitor_id: CompetitorId,
    pub username: String,
    /// Single-winner match where neither party picked the declared winner.
    /// The acceptor is still credited; flagged so operators can review.
    pub non_participant_winner: bool,
}

/// Decide the winning party of `wager` under `outcome`.
///
/// # Errors
/// - `WagerAlreadyResolved` if the wager is already resolved
/// - `MissingSelection` if the wager has no acceptor (still open)
/// - `SamePick` if both parties picked the same competitor in a ranking match
/// - `MissingRanking` if a picked competitor has no position in the outcome
pub fn resolve_winner(wager: &Wager, outcome: &MatchOutcome) -> Result<WinnerDecision> {
    if wager.status == WagerStatus::Resolved {
        return Err(PodiumError::WagerAlreadyResolved(wager.id));
    }
    let acceptor = match (&wager.acceptor, wager.status) {
        (Some(acceptor), WagerStatus::Accepted) => acceptor,
        _ => return Err(PodiumError::MissingSelection(wager.id)),
    };
    let creator = &wager.creator;

    let (party, non_participant_winner) = match outcome {
        MatchOutcome::Ranking(table) => {
            if creator.competitor_id == acceptor.competitor_id {
                return Err(PodiumError::SamePick(wager.id));
            }
            let position_of = |competitor: &CompetitorId| {
                table
                    .position_of(competitor)
                    .ok_or_else(|| PodiumError::MissingRanking {
                        wager_id: wager.id,
                        competitor_id: competitor.clone(),
                    })
            };
            let creator_pos = position_of(&creator.competitor_id)?;
            let acceptor_pos = position_of(&acceptor.competitor_id)?;
            if creator_pos < acceptor_pos {
                (WinningParty::Creator, false)
            } else {
                (WinningParty::Acceptor, false)
            }
        }
        MatchOutcome::Winner {
            winning_competitor_id,
        } => {
            if creator.competitor_id == *winning_competitor_id {
                (WinningParty::Creator, false)
            } else {
                let non_participant = acceptor.competitor_id != *winning_competitor_id;
                if non_participant {
                    tracing::warn!(
                        wager = %wager.id,
                        declared_winner = %winning_competitor_id,
                        creator_pick = %creator.competitor_id,
                        acceptor_pick = %acceptor.competitor_id,
                        "Neither party picked the declared winner; crediting acceptor"
                    );
                }
                (WinningParty::Acceptor, non_participant)
            }
        }
    };

    let selection = match party {
        WinningParty::Creator => creator,
        WinningParty::Acceptor => acceptor,
    };
    Ok(WinnerDecision {
        party,
        competitor_id: selection.competitor_id.clone(),
        username: selection.username.clone(),
        non_participant_winner,
    })
}
