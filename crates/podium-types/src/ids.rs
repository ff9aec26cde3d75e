//! Identifiers used throughout Podium.
//!
//! Wagers use UUIDv7 for time-ordered sorting. Matches and competitors are
//! identified by the string keys the match-data provider hands out.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants;

// ---------------------------------------------------------------------------
// WagerId
// ---------------------------------------------------------------------------

/// Globally unique wager identifier. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct WagerId(pub Uuid);

impl WagerId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for WagerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MatchId
// ---------------------------------------------------------------------------

/// Identifier of a match (a race session, a head-to-head fixture, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MatchId(pub String);

impl MatchId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CompetitorId
// ---------------------------------------------------------------------------

/// Identifier of a competitor within a match, as issued by the match-data
/// provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CompetitorId(pub String);

impl CompetitorId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty id means "no competitor" in operator input.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A 1-based finishing position. `Position(1)` is the winner.
///
/// Lower is better; ordering follows the numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Position(u16);

impl Position {
    /// The winning position.
    pub const FIRST: Self = Self(1);

    /// Returns `None` for zero, which is not a finishing position.
    #[must_use]
    pub fn new(value: u16) -> Option<Self> {
        (value >= 1).then_some(Self(value))
    }

    #[must_use]
    pub fn get(self) -> u16 {
        self.0
    }

    /// Whether this position falls within `1..=field_size`.
    #[must_use]
    pub fn within(self, field_size: usize) -> bool {
        usize::from(self.0) <= field_size
    }

    /// All positions `1..=field_size`, in order.
    pub fn range(field_size: usize) -> impl Iterator<Item = Position> {
        let upper = u16::try_from(field_size).unwrap_or(u16::MAX);
        (1..=upper).map(Position)
    }
}

impl TryFrom<u16> for Position {
    type Error = String;

    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "finishing positions start at 1".to_string())
    }
}

impl From<Position> for u16 {
    fn from(position: Position) -> Self {
        position.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RecordPointer
// ---------------------------------------------------------------------------

/// Opaque content pointer returned by the off-chain record store.
///
/// Passed to the ledger as the auditable reference for a settlement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordPointer(pub String);

impl RecordPointer {
    #[must_use]
    pub fn new(pointer: impl Into<String>) -> Self {
        Self(pointer.into())
    }

    /// Content-addressed pointer: `sha256:<hex digest of content>`.
    ///
    /// Identical content always yields the identical pointer.
    #[must_use]
    pub fn for_content(content: &[u8]) -> Self {
        let digest = Sha256::digest(content);
        Self(format!(
            "{}{}",
            constants::RECORD_POINTER_PREFIX,
            hex::encode(digest)
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wager_id_uniqueness() {
        let a = WagerId::new();
        let b = WagerId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn wager_id_ordering() {
        let a = WagerId::new();
        let b = WagerId::new();
        assert!(a < b);
    }

    #[test]
    fn position_zero_rejected() {
        assert!(Position::new(0).is_none());
        assert_eq!(Position::new(1), Some(Position::FIRST));
    }

    #[test]
    fn position_ordering_lower_is_better() {
        let p1 = Position::new(1).unwrap();
        let p3 = Position::new(3).unwrap();
        assert!(p1 < p3);
        assert_eq!(format!("{p3}"), "P3");
    }

    #[test]
    fn position_range_and_within() {
        let all: Vec<u16> = Position::range(4).map(Position::get).collect();
        assert_eq!(all, vec![1, 2, 3, 4]);
        assert!(Position::new(4).unwrap().within(4));
        assert!(!Position::new(5).unwrap().within(4));
        assert_eq!(Position::range(0).count(), 0);
    }

    #[test]
    fn blank_competitor_id_is_empty() {
        assert!(CompetitorId::new("").is_empty());
        assert!(CompetitorId::new("  ").is_empty());
        assert!(!CompetitorId::new("VER").is_empty());
    }

    #[test]
    fn record_pointer_is_content_addressed() {
        let a = RecordPointer::for_content(b"resolved wager");
        let b = RecordPointer::for_content(b"resolved wager");
        let c = RecordPointer::for_content(b"another wager");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.as_str().starts_with("sha256:"));
        assert_eq!(a.as_str().len(), "sha256:".len() + 64);
    }

    #[test]
    fn serde_roundtrips() {
        let wid = WagerId::new();
        let json = serde_json::to_string(&wid).unwrap();
        let back: WagerId = serde_json::from_str(&json).unwrap();
        assert_eq!(wid, back);

        let pos = Position::new(7).unwrap();
        let json = serde_json::to_string(&pos).unwrap();
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(pos, back);

        assert!(serde_json::from_str::<Position>("0").is_err());
    }
}
