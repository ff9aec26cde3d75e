//! Interfaces to the external systems the engine settles against.
//!
//! The ledger and the record store are shared services with their own
//! concurrency control; the engine never assumes it owns them. The match-data
//! provider is read-only.

use std::sync::Arc;

use podium_types::{
    Competitor, CompetitorId, LedgerReceipt, MatchId, OutcomeKind, RecordPointer, Result,
    StatusUpdate, Wager, WagerId,
};

/// The write-once financial ledger.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    /// Commit the resolution of `wager_id`, releasing funds to the holder of
    /// `winning_competitor_id`'s side. `pointer` is stored as the auditable
    /// reference to the off-chain record.
    ///
    /// Not idempotent: a second commit for an already-resolved wager must
    /// fail with `Ledger { kind: AlreadyResolved, .. }` and must never pay
    /// twice.
    async fn resolve(
        &self,
        wager_id: WagerId,
        winning_competitor_id: &CompetitorId,
        pointer: &RecordPointer,
    ) -> Result<LedgerReceipt>;

    /// The receipt of an earlier commit for `wager_id`, if the ledger holds
    /// one. Used to adopt a commit whose confirmation was lost.
    async fn receipt_for(&self, wager_id: WagerId) -> Result<Option<LedgerReceipt>>;
}

/// The off-chain metadata / status store that owns wager records.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Persist the full wager record and return a content pointer to it.
    /// Idempotent: uploading the same record twice yields a valid pointer
    /// both times.
    async fn upload(&self, wager_id: WagerId, record: &Wager) -> Result<RecordPointer>;

    /// Update the wager's status fields.
    async fn update_status(&self, wager_id: WagerId, update: &StatusUpdate) -> Result<()>;
}

/// Read-only source of match metadata.
#[allow(async_fn_in_trait)]
pub trait MatchDataProvider {
    /// Competitors of the match, in provider order.
    async fn list_competitors(&self, match_id: &MatchId) -> Result<Vec<Competitor>>;

    /// Which outcome shape the match category uses.
    async fn outcome_kind(&self, match_id: &MatchId) -> Result<OutcomeKind>;
}

impl<T: Ledger> Ledger for Arc<T> {
    async fn resolve(
        &self,
        wager_id: WagerId,
        winning_competitor_id: &CompetitorId,
        pointer: &RecordPointer,
    ) -> Result<LedgerReceipt> {
        (**self).resolve(wager_id, winning_competitor_id, pointer).await
    }

    async fn receipt_for(&self, wager_id: WagerId) -> Result<Option<LedgerReceipt>> {
        (**self).receipt_for(wager_id).await
    }
}

impl<T: RecordStore> RecordStore for Arc<T> {
    async fn upload(&self, wager_id: WagerId, record: &Wager) -> Result<RecordPointer> {
        (**self).upload(wager_id, record).await
    }

    async fn update_status(&self, wager_id: WagerId, update: &StatusUpdate) -> Result<()> {
        (**self).update_status(wager_id, update).await
    }
}

impl<T: MatchDataProvider> MatchDataProvider for Arc<T> {
    async fn list_competitors(&self, match_id: &MatchId) -> Result<Vec<Competitor>> {
        (**self).list_competitors(match_id).await
    }

    async fn outcome_kind(&self, match_id: &MatchId) -> Result<OutcomeKind> {
        (**self).outcome_kind(match_id).await
    }
}
