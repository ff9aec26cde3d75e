//! Bijective position ↔ competitor table for ranking outcomes.
//!
//! Both directions live in one structure and are only ever updated together,
//! so the table cannot drift into a state where two positions share a
//! competitor or one competitor holds two positions.

use std::collections::{BTreeMap, HashMap};

use crate::{CompetitorId, PodiumError, Position, Result, constants};

/// What an [`RankingTable::assign`] call displaced to keep the table
/// bijective.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reassignment {
    /// The position the competitor held before, now vacant.
    pub vacated: Option<Position>,
    /// The competitor that previously held the target position, now unplaced.
    pub evicted: Option<CompetitorId>,
}

/// Bijective mapping between finishing positions and competitors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingTable {
    by_position: BTreeMap<Position, CompetitorId>,
    by_competitor: HashMap<CompetitorId, Position>,
}

impl RankingTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a finishing order: the first competitor gets
    /// position 1, the second position 2, and so on.
    ///
    /// # Errors
    /// - `DuplicateCompetitor` if a competitor appears twice
    /// - `InvalidPosition` if the order is longer than the maximum field size
    pub fn from_finishing_order<I>(order: I) -> Result<Self>
    where
        I: IntoIterator<Item = CompetitorId>,
    {
        let mut table = Self::new();
        for (idx, competitor) in order.into_iter().enumerate() {
            let position = u16::try_from(idx + 1)
                .ok()
                .filter(|p| *p <= constants::MAX_RANKING_POSITIONS)
                .and_then(Position::new)
                .ok_or(PodiumError::InvalidPosition(idx + 1))?;
            if table.by_competitor.contains_key(&competitor) {
                return Err(PodiumError::DuplicateCompetitor(competitor));
            }
            table.assign(position, competitor);
        }
        Ok(table)
    }

    /// Place `competitor` at `position`, keeping the table bijective in a
    /// single step:
    /// 1. if `competitor` already holds another position, that position is vacated;
    /// 2. if `position` holds a different competitor, that competitor is evicted;
    /// 3. `position → competitor` is recorded in both directions.
    pub fn assign(&mut self, position: Position, competitor: CompetitorId) -> Reassignment {
        let mut change = Reassignment::default();

        if let Some(previous) = self.by_competitor.get(&competitor).copied() {
            if previous == position {
                return change;
            }
            self.by_position.remove(&previous);
            change.vacated = Some(previous);
        }

        if let Some(occupant) = self.by_position.remove(&position) {
            self.by_competitor.remove(&occupant);
            change.evicted = Some(occupant);
        }

        self.by_competitor.insert(competitor.clone(), position);
        self.by_position.insert(position, competitor);

        debug_assert!(self.is_consistent());
        change
    }

    /// Clear a position. Returns the competitor that held it, if any.
    pub fn clear_position(&mut self, position: Position) -> Option<CompetitorId> {
        let competitor = self.by_position.remove(&position)?;
        self.by_competitor.remove(&competitor);
        Some(competitor)
    }

    /// Remove every assignment.
    pub fn clear(&mut self) {
        self.by_position.clear();
        self.by_competitor.clear();
    }

    #[must_use]
    pub fn position_of(&self, competitor: &CompetitorId) -> Option<Position> {
        self.by_competitor.get(competitor).copied()
    }

    #[must_use]
    pub fn competitor_at(&self, position: Position) -> Option<&CompetitorId> {
        self.by_position.get(&position)
    }

    #[must_use]
    pub fn contains(&self, competitor: &CompetitorId) -> bool {
        self.by_competitor.contains_key(competitor)
    }

    /// Number of assigned positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_position.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_position.is_empty()
    }

    /// Assignments in finishing order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &CompetitorId)> {
        self.by_position.iter().map(|(p, c)| (*p, c))
    }

    /// Both directions describe the same set of pairs.
    fn is_consistent(&self) -> bool {
        self.by_position.len() == self.by_competitor.len()
            && self
                .by_position
                .iter()
                .all(|(p, c)| self.by_competitor.get(c) == Some(p))
    }
}
