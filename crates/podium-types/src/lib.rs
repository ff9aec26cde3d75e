//! # podium-types
//!
//! Shared types, errors, and configuration for the **Podium** match
//! resolution and settlement engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`WagerId`], [`MatchId`], [`CompetitorId`], [`Position`], [`RecordPointer`]
//! - **Match model**: [`Competitor`], [`OutcomeKind`], [`MatchOutcome`], [`RankingTable`], [`Violation`]
//! - **Wager model**: [`Wager`], [`WagerStatus`], [`Selection`], [`Resolution`], [`WinningParty`], [`StatusUpdate`]
//! - **Settlement model**: [`SettlementOutcome`], [`SettlementStage`], [`LedgerReceipt`]
//! - **Reporting**: [`ResolutionReport`], [`WagerFailure`], [`RunPhase`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`PodiumError`] with `PD_ERR_` prefix codes
//! - **Constants**: engine-wide limits and defaults

pub mod competitor;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod outcome;
pub mod ranking;
pub mod report;
pub mod settlement;
pub mod wager;

// Re-export all primary types at crate root for ergonomic imports:
//   use podium_types::{Wager, MatchOutcome, RankingTable, ...};

pub use competitor::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use outcome::*;
pub use ranking::*;
pub use report::*;
pub use settlement::*;
pub use wager::*;

// Constants are accessed via `podium_types::constants::FOO`
// (not re-exported to avoid name collisions).
