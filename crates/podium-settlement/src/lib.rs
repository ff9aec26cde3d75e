//! # podium-settlement
//!
//! **Finality Plane**: turns a declared match outcome into settled,
//! consistent state across the ledger and the off-chain record store.
//!
//! ## Architecture
//!
//! The [`ResolutionCoordinator`] receives a [`MatchOutcome`] and a batch of
//! wagers and, for each wager in order, runs the [`SettlementPipeline`]:
//! 1. Resolve the winner ([`resolve_winner`], pure)
//! 2. Build the resolved wager record
//! 3. Upload the record to the off-chain store → content pointer
//! 4. Commit the resolution to the ledger (authoritative, not idempotent)
//! 5. Update the wager status in the off-chain store
//!
//! A failed wager never aborts the batch: every per-wager `Result` is folded
//! into one [`ResolutionReport`]. Only an all-failed batch and setup errors
//! propagate to the caller.
//!
//! ## Write ordering
//!
//! Steps run strictly 2 → 3 → 4 → 5 and step 5 never runs unless step 4
//! succeeded. A wager whose ledger commit succeeded but whose status update
//! failed is kept as a [`PendingStatusUpdate`] and only step 5 is retried
//! (see [`ResolutionCoordinator::reconcile`]).
//!
//! [`MatchOutcome`]: podium_types::MatchOutcome
//! [`ResolutionReport`]: podium_types::ResolutionReport

pub mod coordinator;
pub mod memory;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod scheduler;
pub mod session;
pub mod traits;

pub use coordinator::{BusyFlag, BusyGuard, ResolutionCoordinator};
pub use memory::{InMemoryLedger, InMemoryRecordStore, StaticMatchData};
pub use pipeline::{PendingStatusUpdate, SettlementPipeline, StageFailure};
pub use progress::{ProgressEvent, ProgressProducer, WagerProgress, progress_channel};
pub use resolver::{WinnerDecision, resolve_winner};
pub use scheduler::{AdvanceFn, AdvanceScheduler};
pub use session::{ResolutionSession, open_collector};
pub use traits::{Ledger, MatchDataProvider, RecordStore};
