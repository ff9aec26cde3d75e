//! Outcome collector state and its reducer.
//!
//! The state holds the match's fixed competitor set and the operator's
//! selections so far. Every edit is an event folded in by [`reduce`]; the
//! ranking case delegates to [`RankingTable`], which keeps the
//! position ↔ competitor mapping bijective after every single event.

use std::collections::HashSet;

use podium_types::{
    Competitor, CompetitorId, MatchId, MatchOutcome, OutcomeKind, PodiumError, Position,
    RankingTable, Result, constants,
};

use crate::validation::{self, CollectorStatus};

/// Operator selections, shaped by the match category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selections {
    /// Finishing positions assigned so far.
    Ranking(RankingTable),
    /// The declared winner, once chosen.
    SingleWinner(Option<CompetitorId>),
}

impl Default for Selections {
    fn default() -> Self {
        Self::Ranking(RankingTable::new())
    }
}

/// An operator edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorEvent {
    /// Put `competitor` at `position`; `None` (or a blank id) clears it.
    Assign {
        position: Position,
        competitor: Option<CompetitorId>,
    },
    /// Clear whatever competitor holds `position`.
    ClearPosition(Position),
    /// Choose (or clear) the winner of a single-winner match.
    SelectWinner(Option<CompetitorId>),
    /// Drop all selections.
    Reset,
}

/// Everything the collector knows about one match's outcome entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectorState {
    match_id: MatchId,
    competitors: Vec<Competitor>,
    known: HashSet<CompetitorId>,
    selections: Selections,
}

impl CollectorState {
    /// Start an empty entry for `match_id`.
    ///
    /// # Errors
    /// - `EmptyField` if `competitors` is empty
    /// - `DuplicateCompetitor` if two competitors share an id
    /// - `InvalidPosition` if the field is larger than a ranking may be
    pub fn new(match_id: MatchId, kind: OutcomeKind, competitors: Vec<Competitor>) -> Result<Self> {
        if competitors.is_empty() {
            return Err(PodiumError::EmptyField(match_id));
        }
        if competitors.len() > usize::from(constants::MAX_RANKING_POSITIONS) {
            return Err(PodiumError::InvalidPosition(competitors.len()));
        }
        let mut known = HashSet::with_capacity(competitors.len());
        for c in &competitors {
            if !known.insert(c.id.clone()) {
                return Err(PodiumError::DuplicateCompetitor(c.id.clone()));
            }
        }
        let selections = match kind {
            OutcomeKind::Ranking => Selections::Ranking(RankingTable::new()),
            OutcomeKind::SingleWinner => Selections::SingleWinner(None),
        };
        Ok(Self {
            match_id,
            competitors,
            known,
            selections,
        })
    }

    #[must_use]
    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self.selections {
            Selections::Ranking(_) => OutcomeKind::Ranking,
            Selections::SingleWinner(_) => OutcomeKind::SingleWinner,
        }
    }

    /// Competitors in provider order.
    #[must_use]
    pub fn competitors(&self) -> &[Competitor] {
        &self.competitors
    }

    /// N, the number of positions a complete ranking fills.
    #[must_use]
    pub fn field_size(&self) -> usize {
        self.competitors.len()
    }

    #[must_use]
    pub fn is_known(&self, competitor: &CompetitorId) -> bool {
        self.known.contains(competitor)
    }

    #[must_use]
    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    #[must_use]
    pub fn ranking(&self) -> Option<&RankingTable> {
        match &self.selections {
            Selections::Ranking(table) => Some(table),
            Selections::SingleWinner(_) => None,
        }
    }

    #[must_use]
    pub fn selected_winner(&self) -> Option<&CompetitorId> {
        match &self.selections {
            Selections::SingleWinner(winner) => winner.as_ref(),
            Selections::Ranking(_) => None,
        }
    }
}

/// Fold one event into the state.
///
/// Pure: no I/O, and events that make no sense for this match (positions
/// outside `1..=N`, unknown competitors, a ranking edit on a single-winner
/// match) leave the state unchanged.
#[must_use]
pub fn reduce(mut state: CollectorState, event: CollectorEvent) -> CollectorState {
    let field_size = state.field_size();
    let kind = state.kind();
    if let CollectorEvent::Assign { position, .. } = &event {
        if kind == OutcomeKind::Ranking && !position.within(field_size) {
            tracing::warn!(%position, field_size, "Assignment outside the field ignored");
            return state;
        }
    }
    match (&mut state.selections, event) {
        (Selections::Ranking(table), CollectorEvent::Assign { position, competitor }) => {
            match competitor.filter(|c| !c.is_empty()) {
                None => {
                    table.clear_position(position);
                }
                Some(competitor) if !state.known.contains(&competitor) => {
                    tracing::warn!(%position, %competitor, "Unknown competitor ignored");
                }
                Some(competitor) => {
                    let change = table.assign(position, competitor.clone());
                    tracing::debug!(
                        %position,
                        %competitor,
                        vacated = ?change.vacated,
                        evicted = ?change.evicted,
                        "Position assigned"
                    );
                }
            }
        }
        (Selections::Ranking(table), CollectorEvent::ClearPosition(position)) => {
            table.clear_position(position);
        }
        (Selections::SingleWinner(winner), CollectorEvent::SelectWinner(choice)) => {
            match choice.filter(|c| !c.is_empty()) {
                Some(c) if !state.known.contains(&c) => {
                    tracing::warn!(competitor = %c, "Unknown winner ignored");
                }
                choice => *winner = choice,
            }
        }
        (Selections::Ranking(table), CollectorEvent::Reset) => table.clear(),
        (Selections::SingleWinner(winner), CollectorEvent::Reset) => *winner = None,
        (_, event) => {
            tracing::warn!(%kind, ?event, "Event does not apply to this match category");
        }
    }
    state
}

/// Stateful wrapper used by the presentation layer: applies events through
/// [`reduce`] and exposes the derived validation status.
#[derive(Debug, Clone)]
pub struct OutcomeCollector {
    state: CollectorState,
}

impl OutcomeCollector {
    /// # Errors
    /// See [`CollectorState::new`].
    pub fn new(match_id: MatchId, kind: OutcomeKind, competitors: Vec<Competitor>) -> Result<Self> {
        Ok(Self {
            state: CollectorState::new(match_id, kind, competitors)?,
        })
    }

    /// Apply an event and return the recomputed status.
    pub fn apply(&mut self, event: CollectorEvent) -> CollectorStatus {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, event);
        self.status()
    }

    /// Ranking entry: put `competitor` at `position`, or clear the position
    /// when `competitor` is empty.
    pub fn assign(&mut self, position: Position, competitor: impl Into<String>) -> CollectorStatus {
        let competitor = CompetitorId::new(competitor);
        self.apply(CollectorEvent::Assign {
            position,
            competitor: Some(competitor),
        })
    }

    pub fn clear_position(&mut self, position: Position) -> CollectorStatus {
        self.apply(CollectorEvent::ClearPosition(position))
    }

    /// Single-winner entry.
    pub fn select_winner(&mut self, competitor: impl Into<String>) -> CollectorStatus {
        self.apply(CollectorEvent::SelectWinner(Some(CompetitorId::new(competitor))))
    }

    pub fn reset(&mut self) -> CollectorStatus {
        self.apply(CollectorEvent::Reset)
    }

    #[must_use]
    pub fn state(&self) -> &CollectorState {
        &self.state
    }

    #[must_use]
    pub fn validate(&self) -> Vec<podium_types::Violation> {
        validation::validate(&self.state)
    }

    #[must_use]
    pub fn status(&self) -> CollectorStatus {
        validation::status(&self.state)
    }

    /// Whether submission may be enabled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status().is_complete()
    }

    /// # Errors
    /// `IncompleteOutcome` listing every violation.
    pub fn finalize(&self) -> Result<MatchOutcome> {
        validation::finalize(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    fn field() -> Vec<Competitor> {
        vec![
            Competitor::new("A", "Alpha Racer", "ALP"),
            Competitor::new("B", "Bravo Racer", "BRA"),
            Competitor::new("C", "Charlie Racer", "CHA"),
        ]
    }

    fn pos(n: u16) -> Position {
        Position::new(n).unwrap()
    }

    fn ranking_collector() -> OutcomeCollector {
        OutcomeCollector::new(MatchId::new("race-1"), OutcomeKind::Ranking, field()).unwrap()
    }

    #[test]
    fn empty_field_rejected() {
        let err = CollectorState::new(MatchId::new("m"), OutcomeKind::Ranking, vec![]).unwrap_err();
        assert!(matches!(err, PodiumError::EmptyField(_)));
    }

    #[test]
    fn duplicate_competitor_ids_rejected() {
        let mut competitors = field();
        competitors.push(Competitor::new("A", "Alpha Again", "AL2"));
        let err =
            CollectorState::new(MatchId::new("m"), OutcomeKind::Ranking, competitors).unwrap_err();
        assert!(matches!(err, PodiumError::DuplicateCompetitor(_)));
    }

    #[test]
    fn moving_competitor_vacates_previous_position_in_one_call() {
        let mut c = ranking_collector();
        c.assign(pos(1), "A");
        c.assign(pos(2), "A");

        let table = c.state().ranking().unwrap();
        assert_eq!(table.competitor_at(pos(1)), None);
        assert_eq!(table.competitor_at(pos(2)), Some(&CompetitorId::new("A")));
    }

    #[test]
    fn assigning_occupied_position_unplaces_occupant() {
        let mut c = ranking_collector();
        c.assign(pos(1), "A");
        c.assign(pos(1), "B");

        let table = c.state().ranking().unwrap();
        assert_eq!(table.competitor_at(pos(1)), Some(&CompetitorId::new("B")));
        assert!(!table.contains(&CompetitorId::new("A")));
    }

    #[test]
    fn blank_competitor_clears_position() {
        let mut c = ranking_collector();
        c.assign(pos(2), "B");
        c.assign(pos(2), "");
        assert!(c.state().ranking().unwrap().is_empty());
    }

    #[test]
    fn out_of_field_position_ignored() {
        let mut c = ranking_collector();
        let before = c.state().clone();
        c.assign(pos(4), "A");
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn unknown_competitor_ignored() {
        let mut c = ranking_collector();
        c.assign(pos(1), "Z");
        assert!(c.state().ranking().unwrap().is_empty());
    }

    #[test]
    fn winner_event_on_ranking_match_ignored() {
        let mut c = ranking_collector();
        c.assign(pos(1), "A");
        let before = c.state().clone();
        c.select_winner("B");
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn reset_clears_everything() {
        let mut c = ranking_collector();
        c.assign(pos(1), "A");
        c.assign(pos(2), "B");
        c.reset();
        assert!(c.state().ranking().unwrap().is_empty());
    }

    #[test]
    fn single_winner_selection_and_clear() {
        let mut c =
            OutcomeCollector::new(MatchId::new("h2h"), OutcomeKind::SingleWinner, field()).unwrap();
        c.select_winner("C");
        assert_eq!(c.state().selected_winner(), Some(&CompetitorId::new("C")));
        c.apply(CollectorEvent::SelectWinner(None));
        assert_eq!(c.state().selected_winner(), None);
        c.select_winner("nobody");
        assert_eq!(c.state().selected_winner(), None);
    }

    #[test]
    fn reducer_is_pure() {
        let state =
            CollectorState::new(MatchId::new("race-1"), OutcomeKind::Ranking, field()).unwrap();
        let event = CollectorEvent::Assign {
            position: pos(1),
            competitor: Some(CompetitorId::new("C")),
        };
        let a = reduce(state.clone(), event.clone());
        let b = reduce(state.clone(), event);
        assert_eq!(a, b);
        assert!(state.ranking().unwrap().is_empty());
    }

    #[test]
    fn random_event_sequences_keep_bijection() {
        let mut rng = rand::thread_rng();
        let ids = ["A", "B", "C", ""];
        for _ in 0..100 {
            let mut c = ranking_collector();
            for _ in 0..40 {
                let p = pos(rng.gen_range(1..=3));
                c.assign(p, ids[rng.gen_range(0..ids.len())]);

                let table = c.state().ranking().unwrap();
                let mut seen = HashSet::new();
                for (p, id) in table.iter() {
                    assert!(seen.insert(id.clone()), "{id} placed twice");
                    assert_eq!(table.position_of(id), Some(p));
                }
            }
        }
    }
}
