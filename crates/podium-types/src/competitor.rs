//! Competitor model, as supplied by the match-data provider.

use serde::{Deserialize, Serialize};

use crate::CompetitorId;

/// An entrant in a match. Read-only for the engine; the set is fixed per
/// match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    /// Full name shown to operators (e.g., "Max Verstappen").
    pub display_name: String,
    /// Short code shown in compact views (e.g., "VER").
    pub short_code: String,
}

impl Competitor {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        short_code: impl Into<String>,
    ) -> Self {
        Self {
            id: CompetitorId::new(id),
            display_name: display_name.into(),
            short_code: short_code.into(),
        }
    }
}

impl std::fmt::Display for Competitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name, self.short_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn competitor_display() {
        let c = Competitor::new("1", "Max Verstappen", "VER");
        assert_eq!(format!("{c}"), "Max Verstappen (VER)");
        assert_eq!(c.id.as_str(), "1");
    }

    #[test]
    fn competitor_serde_roundtrip() {
        let c = Competitor::new("44", "Lewis Hamilton", "HAM");
        let json = serde_json::to_string(&c).unwrap();
        let back: Competitor = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
