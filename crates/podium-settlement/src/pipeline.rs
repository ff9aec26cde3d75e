//! Per-wager settlement pipeline.
//!
//! Carries one wager from "outcome known" to "settled" with a fixed write
//! order:
//! 1. Resolve the winner (in-memory)
//! 2. Build the resolved wager record
//! 3. Upload the record to the off-chain store → content pointer
//! 4. Commit to the ledger with the pointer as auditable reference
//! 5. Update the wager status in the off-chain store
//!
//! Steps 3–5 are suspension points, each bounded by the configured write
//! timeout. Any failure aborts this wager only. No rollback of step 3 is
//! attempted: the uploaded record is content-addressed and a later retry
//! uploads again. A failure at step 5 leaves the ledger ahead of the store;
//! the failure then carries a [`PendingStatusUpdate`] so step 5 can be
//! retried on its own without touching the ledger again.
//!
//! A timeout or transport failure at step 4 leaves the commit unconfirmed:
//! the ledger may have applied it. Such wagers are retried through
//! [`SettlementPipeline::settle_unconfirmed`], which adopts the earlier
//! commit when the ledger reports the wager as already settled.

use std::{future::Future, time::Duration};

use chrono::Utc;
use podium_types::{
    EngineConfig, LedgerErrorKind, LedgerReceipt, MatchOutcome, PodiumError, Resolution, Result,
    SettlementOutcome, SettlementStage, StatusUpdate, Wager, WagerFailure, WagerId,
};

use crate::{
    resolver::resolve_winner,
    traits::{Ledger, RecordStore},
};

/// A wager the ledger has settled whose status update has not landed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingStatusUpdate {
    /// The resolved record as uploaded in step 3.
    pub record: Wager,
    /// The step-5 write still owed to the store.
    pub update: StatusUpdate,
    /// The settlement as confirmed by the ledger.
    pub outcome: SettlementOutcome,
}

/// Why a wager's settlement stopped, and where.
#[derive(Debug)]
pub struct StageFailure {
    pub wager_id: WagerId,
    pub stage: SettlementStage,
    pub error: PodiumError,
    /// Set only when the ledger committed but the status update did not.
    pub pending: Option<PendingStatusUpdate>,
}

impl StageFailure {
    pub(crate) fn new(wager_id: WagerId, stage: SettlementStage, error: PodiumError) -> Self {
        Self {
            wager_id,
            stage,
            error,
            pending: None,
        }
    }

    /// The report entry for this failure.
    #[must_use]
    pub fn to_wager_failure(&self) -> WagerFailure {
        WagerFailure {
            wager_id: self.wager_id,
            stage: self.stage,
            message: self.error.to_string(),
        }
    }

    /// Whether the ledger already holds this wager's settlement.
    #[must_use]
    pub fn ledger_committed(&self) -> bool {
        self.pending.is_some()
    }

    /// The ledger commit ended without a verdict and may have been applied.
    #[must_use]
    pub fn commit_unconfirmed(&self) -> bool {
        self.stage == SettlementStage::LedgerCommit
            && matches!(
                self.error,
                PodiumError::Timeout { .. }
                    | PodiumError::Ledger {
                        kind: LedgerErrorKind::Network,
                        ..
                    }
            )
    }
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "wager {} failed at {}: {}", self.wager_id, self.stage, self.error)
    }
}

/// Settles one wager at a time against a ledger and a record store.
pub struct SettlementPipeline<L, S> {
    ledger: L,
    store: S,
    write_timeout: Duration,
    write_timeout_ms: u64,
}

impl<L: Ledger, S: RecordStore> SettlementPipeline<L, S> {
    #[must_use]
    pub fn new(ledger: L, store: S, config: &EngineConfig) -> Self {
        Self {
            ledger,
            store,
            write_timeout: config.write_timeout,
            write_timeout_ms: config.write_timeout_ms(),
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run steps 1–5 for `wager` under `outcome`.
    ///
    /// # Errors
    /// A [`StageFailure`] naming the step that failed. Step 5 is attempted
    /// only after step 4 succeeded.
    pub async fn settle(
        &self,
        wager: &Wager,
        outcome: &MatchOutcome,
    ) -> std::result::Result<SettlementOutcome, StageFailure> {
        self.run(wager, outcome, false).await
    }

    /// Run steps 1–5 for a wager whose previous ledger commit is
    /// unconfirmed. If the ledger answers `AlreadyResolved`, its existing
    /// receipt is taken as the step-4 result and step 5 proceeds.
    ///
    /// # Errors
    /// As [`Self::settle`].
    pub async fn settle_unconfirmed(
        &self,
        wager: &Wager,
        outcome: &MatchOutcome,
    ) -> std::result::Result<SettlementOutcome, StageFailure> {
        self.run(wager, outcome, true).await
    }

    async fn run(
        &self,
        wager: &Wager,
        outcome: &MatchOutcome,
        adopt_existing: bool,
    ) -> std::result::Result<SettlementOutcome, StageFailure> {
        let wager_id = wager.id;

        // 1. Resolve
        let decision = resolve_winner(wager, outcome)
            .map_err(|e| StageFailure::new(wager_id, SettlementStage::Resolve, e))?;

        // 2. Build the resolved record
        let resolution = Resolution {
            winning_competitor_id: decision.competitor_id.clone(),
            winning_username: decision.username.clone(),
            winning_party: decision.party,
            resolved_at: Utc::now(),
        };
        let record = wager.resolved_with(resolution.clone());
        tracing::debug!(
            wager = %wager_id,
            party = %decision.party,
            competitor = %decision.competitor_id,
            "Winner resolved"
        );

        // 3. Upload
        let pointer = self
            .bounded(SettlementStage::Upload, self.store.upload(wager_id, &record))
            .await
            .map_err(|e| StageFailure::new(wager_id, SettlementStage::Upload, e))?;
        tracing::debug!(wager = %wager_id, %pointer, "Record uploaded");

        // 4. Ledger commit
        let committed = self
            .bounded(
                SettlementStage::LedgerCommit,
                self.ledger
                    .resolve(wager_id, &decision.competitor_id, &pointer),
            )
            .await;
        let committed = match committed {
            Err(
                error @ PodiumError::Ledger {
                    kind: LedgerErrorKind::AlreadyResolved,
                    ..
                },
            ) if adopt_existing => self.adopt_commit(wager_id, error).await,
            other => other,
        };
        let receipt = committed
            .map_err(|e| StageFailure::new(wager_id, SettlementStage::LedgerCommit, e))?;
        tracing::debug!(
            wager = %wager_id,
            tx = %receipt.tx_id,
            sequence = receipt.sequence,
            "Ledger commit confirmed"
        );

        let pending = PendingStatusUpdate {
            record,
            update: StatusUpdate::resolved(resolution),
            outcome: SettlementOutcome {
                wager_id,
                winning_party: decision.party,
                winning_competitor_id: decision.competitor_id,
                winning_username: decision.username,
                record_pointer: pointer,
                receipt,
                non_participant_winner: decision.non_participant_winner,
            },
        };

        // 5. Status update
        self.complete_status_update(pending).await
    }

    /// Run step 5 alone for a wager the ledger has already settled.
    ///
    /// # Errors
    /// A `StatusUpdate` [`StageFailure`] that hands `pending` back for a
    /// later retry.
    pub async fn complete_status_update(
        &self,
        pending: PendingStatusUpdate,
    ) -> std::result::Result<SettlementOutcome, StageFailure> {
        let wager_id = pending.outcome.wager_id;
        match self
            .bounded(
                SettlementStage::StatusUpdate,
                self.store.update_status(wager_id, &pending.update),
            )
            .await
        {
            Ok(()) => {
                tracing::debug!(wager = %wager_id, "Status updated");
                Ok(pending.outcome)
            }
            Err(error) => {
                tracing::error!(
                    wager = %wager_id,
                    tx = %pending.outcome.receipt.tx_id,
                    %error,
                    "Ledger settled but status update failed; store is behind the ledger"
                );
                Err(StageFailure {
                    wager_id,
                    stage: SettlementStage::StatusUpdate,
                    error,
                    pending: Some(pending),
                })
            }
        }
    }

    async fn adopt_commit(&self, wager_id: WagerId, refusal: PodiumError) -> Result<LedgerReceipt> {
        let existing = self
            .bounded(SettlementStage::LedgerCommit, self.ledger.receipt_for(wager_id))
            .await?;
        match existing {
            Some(receipt) => {
                tracing::warn!(
                    wager = %wager_id,
                    tx = %receipt.tx_id,
                    "Adopting earlier ledger commit whose confirmation was lost"
                );
                Ok(receipt)
            }
            None => Err(refusal),
        }
    }

    async fn bounded<T>(
        &self,
        stage: SettlementStage,
        write: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.write_timeout, write).await {
            Ok(result) => result,
            Err(_) => Err(PodiumError::Timeout {
                stage,
                after_ms: self.write_timeout_ms,
            }),
        }
    }
}
