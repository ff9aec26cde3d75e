//! Batch coordination for one match.
//!
//! The [`ResolutionCoordinator`] drives the [`SettlementPipeline`] over every
//! wager of a match in input order, isolates per-wager failures, folds the
//! results into a [`ResolutionReport`] and decides whether to auto-advance.
//!
//! Processing is serialized: ledger commits from one submitting account need
//! strictly increasing sequence numbers, so wagers never settle in parallel.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use podium_types::{
    EngineConfig, MatchId, MatchOutcome, PodiumError, ResolutionReport, Result, RunPhase,
    SettlementOutcome, SettlementStage, Wager, WagerFailure, WagerId, constants,
};

use crate::{
    pipeline::{PendingStatusUpdate, SettlementPipeline, StageFailure},
    progress::{ProgressEvent, ProgressProducer, WagerProgress},
    scheduler::{AdvanceFn, AdvanceScheduler},
    traits::{Ledger, RecordStore},
};

// ---------------------------------------------------------------------------
// Busy flag
// ---------------------------------------------------------------------------

/// Shared "a resolution run is in flight" flag. Clone it into the
/// presentation layer to gate resubmission.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Claim the flag. `None` if it is already held.
    #[must_use]
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(self.0.clone()))
    }
}

/// Holds the [`BusyFlag`]; releases it on drop.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Settles all wagers of one match.
pub struct ResolutionCoordinator<L, S> {
    match_id: MatchId,
    pipeline: SettlementPipeline<L, S>,
    config: EngineConfig,
    busy: BusyFlag,
    phase: RunPhase,
    last_report: Option<ResolutionReport>,
    /// Ledger committed, status update still owed.
    pending: BTreeMap<WagerId, PendingStatusUpdate>,
    /// Ledger commit timed out or lost its reply; it may have landed.
    unconfirmed: HashSet<WagerId>,
    progress: Option<ProgressProducer>,
    advance_hook: Option<AdvanceFn>,
    scheduler: AdvanceScheduler,
}

impl<L: Ledger, S: RecordStore> ResolutionCoordinator<L, S> {
    #[must_use]
    pub fn new(
        match_id: MatchId,
        pipeline: SettlementPipeline<L, S>,
        config: EngineConfig,
    ) -> Self {
        tracing::debug!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            %match_id,
            "Resolution coordinator created"
        );
        Self {
            match_id,
            pipeline,
            config,
            busy: BusyFlag::new(),
            phase: RunPhase::Idle,
            last_report: None,
            pending: BTreeMap::new(),
            unconfirmed: HashSet::new(),
            progress: None,
            advance_hook: None,
            scheduler: AdvanceScheduler::new(),
        }
    }

    /// Publish a [`ProgressEvent`] per completed wager.
    #[must_use]
    pub fn with_progress(mut self, producer: ProgressProducer) -> Self {
        self.progress = Some(producer);
        self
    }

    /// Called once, after the configured delay, following a fully
    /// successful batch.
    #[must_use]
    pub fn with_advance(mut self, hook: AdvanceFn) -> Self {
        self.advance_hook = Some(hook);
        self
    }

    /// Share an existing busy flag instead of the coordinator's own.
    #[must_use]
    pub fn with_busy_flag(mut self, busy: BusyFlag) -> Self {
        self.busy = busy;
        self
    }

    #[must_use]
    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    #[must_use]
    pub fn is_resolving(&self) -> bool {
        self.busy.is_busy()
    }

    #[must_use]
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    #[must_use]
    pub fn pipeline(&self) -> &SettlementPipeline<L, S> {
        &self.pipeline
    }

    #[must_use]
    pub fn last_report(&self) -> Option<&ResolutionReport> {
        self.last_report.as_ref()
    }

    /// Wagers that failed in the last batch, in batch order.
    #[must_use]
    pub fn failed_wager_ids(&self) -> Vec<WagerId> {
        self.last_report
            .as_ref()
            .map(ResolutionReport::failed_wager_ids)
            .unwrap_or_default()
    }

    /// Wagers settled on the ledger whose status update has not landed.
    pub fn pending_status_updates(&self) -> impl Iterator<Item = &PendingStatusUpdate> {
        self.pending.values()
    }

    /// Wagers whose ledger commit ended without a verdict. The next retry
    /// adopts the ledger's existing commit if there is one.
    #[must_use]
    pub fn is_commit_unconfirmed(&self, wager_id: &WagerId) -> bool {
        self.unconfirmed.contains(wager_id)
    }

    #[must_use]
    pub fn is_advance_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Settle `wagers` under `outcome`, one at a time in input order.
    ///
    /// # Errors
    /// - `AlreadyResolving` if a run holds the busy flag
    /// - `NoWagers` for an empty batch
    /// - `AggregateFailure` if every wager failed; the report is still
    ///   available through [`Self::last_report`]
    pub async fn submit_outcome(
        &mut self,
        outcome: &MatchOutcome,
        wagers: &[Wager],
    ) -> Result<ResolutionReport> {
        let Some(_guard) = self.busy.try_acquire() else {
            tracing::warn!(
                match_id = %self.match_id,
                "Submission rejected; resolution already running"
            );
            return Err(PodiumError::AlreadyResolving);
        };
        if wagers.is_empty() {
            return Err(PodiumError::NoWagers(self.match_id.clone()));
        }
        if self.phase != RunPhase::Idle {
            self.acknowledge();
        }

        self.phase = RunPhase::Running;
        tracing::info!(
            match_id = %self.match_id,
            kind = %outcome.kind(),
            wagers = wagers.len(),
            "Resolution started"
        );

        let report = self.run_batch(outcome, wagers).await;
        self.finish(report)
    }

    /// Re-run only the wagers the last report listed as failed.
    ///
    /// # Errors
    /// `NoWagers` if none of `wagers` failed last time, otherwise as
    /// [`Self::submit_outcome`].
    pub async fn retry_failed(
        &mut self,
        outcome: &MatchOutcome,
        wagers: &[Wager],
    ) -> Result<ResolutionReport> {
        let failed: HashSet<WagerId> = self.failed_wager_ids().into_iter().collect();
        let retry: Vec<Wager> = wagers
            .iter()
            .filter(|w| failed.contains(&w.id))
            .cloned()
            .collect();
        if retry.is_empty() {
            return Err(PodiumError::NoWagers(self.match_id.clone()));
        }
        tracing::info!(
            match_id = %self.match_id,
            retrying = retry.len(),
            "Retrying failed wagers"
        );
        self.submit_outcome(outcome, &retry).await
    }

    /// Retry the status update of every wager the ledger has settled but
    /// the store has not caught up with. Leaves the run phase untouched.
    ///
    /// # Errors
    /// `AlreadyResolving` if a run holds the busy flag.
    pub async fn reconcile(&mut self) -> Result<ResolutionReport> {
        let Some(_guard) = self.busy.try_acquire() else {
            return Err(PodiumError::AlreadyResolving);
        };
        let mut report = ResolutionReport::new(self.match_id.clone());
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return Ok(report);
        }
        tracing::info!(
            match_id = %self.match_id,
            pending = pending.len(),
            "Reconciling status updates"
        );

        for update in pending.into_values() {
            let result = self.pipeline.complete_status_update(update).await;
            let result = self.absorb(result);
            report.record(result);
        }
        tracing::info!(
            match_id = %self.match_id,
            reconciled = report.succeeded,
            still_pending = report.failed,
            "Reconciliation finished"
        );
        Ok(report)
    }

    /// Leave a terminal phase and cancel any pending auto-advance.
    pub fn acknowledge(&mut self) {
        self.scheduler.cancel();
        let abandoned = self.phase == RunPhase::Running && !self.busy.is_busy();
        if self.phase.is_terminal() || abandoned {
            tracing::debug!(match_id = %self.match_id, from = %self.phase, "Phase acknowledged");
            self.phase = RunPhase::Idle;
        }
    }

    /// Cancel the pending auto-advance. Returns `true` if one was waiting.
    pub fn cancel_advance(&mut self) -> bool {
        self.scheduler.cancel()
    }

    async fn run_batch(&mut self, outcome: &MatchOutcome, wagers: &[Wager]) -> ResolutionReport {
        let total = wagers.len();
        let mut report = ResolutionReport::new(self.match_id.clone());

        for (index, wager) in wagers.iter().enumerate() {
            let result = self.settle_one(wager, outcome).await;
            let result = self.absorb(result);
            let progress = match &result {
                Ok(settled) => WagerProgress::Settled {
                    winning_party: settled.winning_party,
                },
                Err(failure) => WagerProgress::Failed {
                    stage: failure.stage,
                    message: failure.message.clone(),
                },
            };
            report.record(result);

            if let Some(producer) = &self.progress {
                producer.publish(ProgressEvent {
                    match_id: self.match_id.clone(),
                    wager_id: wager.id,
                    completed: index + 1,
                    total,
                    progress,
                });
            }
        }
        report
    }

    async fn settle_one(
        &self,
        wager: &Wager,
        outcome: &MatchOutcome,
    ) -> std::result::Result<SettlementOutcome, StageFailure> {
        if wager.match_id != self.match_id {
            return Err(StageFailure::new(
                wager.id,
                SettlementStage::Resolve,
                PodiumError::WrongMatch {
                    wager_id: wager.id,
                    expected: self.match_id.clone(),
                    actual: wager.match_id.clone(),
                },
            ));
        }
        if let Some(pending) = self.pending.get(&wager.id) {
            tracing::debug!(
                wager = %wager.id,
                "Ledger already settled; retrying status update only"
            );
            return self.pipeline.complete_status_update(pending.clone()).await;
        }
        if self.unconfirmed.contains(&wager.id) {
            return self.pipeline.settle_unconfirmed(wager, outcome).await;
        }
        self.pipeline.settle(wager, outcome).await
    }

    /// Track pending status updates and unconfirmed commits, and turn a
    /// stage failure into a report entry.
    fn absorb(
        &mut self,
        result: std::result::Result<SettlementOutcome, StageFailure>,
    ) -> std::result::Result<SettlementOutcome, WagerFailure> {
        match result {
            Ok(settled) => {
                self.pending.remove(&settled.wager_id);
                self.unconfirmed.remove(&settled.wager_id);
                Ok(settled)
            }
            Err(mut failure) => {
                tracing::warn!(
                    wager = %failure.wager_id,
                    stage = %failure.stage,
                    error = %failure.error,
                    "Wager settlement failed"
                );
                let entry = failure.to_wager_failure();
                if failure.commit_unconfirmed() {
                    self.unconfirmed.insert(failure.wager_id);
                }
                if let Some(pending) = failure.pending.take() {
                    self.unconfirmed.remove(&failure.wager_id);
                    self.pending.insert(failure.wager_id, pending);
                }
                Err(entry)
            }
        }
    }

    fn finish(&mut self, report: ResolutionReport) -> Result<ResolutionReport> {
        let phase = report.phase();
        self.phase = phase;
        self.last_report = Some(report.clone());

        match phase {
            RunPhase::FullSuccess => {
                tracing::info!(
                    match_id = %self.match_id,
                    settled = report.succeeded,
                    "{}",
                    report.summary()
                );
                self.schedule_advance();
                Ok(report)
            }
            RunPhase::PartialSuccess => {
                tracing::info!(
                    match_id = %self.match_id,
                    settled = report.succeeded,
                    failed = report.failed,
                    "{}",
                    report.summary()
                );
                Ok(report)
            }
            _ => {
                tracing::error!(
                    match_id = %self.match_id,
                    failed = report.failed,
                    "{}",
                    report.summary()
                );
                Err(PodiumError::AggregateFailure {
                    failed: report.failed,
                })
            }
        }
    }

    fn schedule_advance(&mut self) {
        match &self.advance_hook {
            Some(hook) => self.scheduler.schedule(
                self.config.auto_advance_delay,
                self.match_id.clone(),
                hook.clone(),
            ),
            None => {
                tracing::debug!(match_id = %self.match_id, "No advance hook; staying on match");
            }
        }
    }
}
