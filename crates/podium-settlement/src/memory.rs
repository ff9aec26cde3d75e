//! In-memory implementations of the external interfaces.
//!
//! Used by tests and local runs. Each backend supports fault injection and
//! artificial latency so failure paths can be driven deterministically.

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use chrono::Utc;
use podium_types::{
    Competitor, CompetitorId, LedgerErrorKind, LedgerReceipt, MatchId, OutcomeKind,
    PodiumError, RecordPointer, Result, StatusUpdate, Wager, WagerId,
};
use tokio::sync::Mutex;

use crate::traits::{Ledger, MatchDataProvider, RecordStore};

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// A settled wager as the ledger recorded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub winning_competitor_id: CompetitorId,
    pub pointer: RecordPointer,
    pub receipt: LedgerReceipt,
}

#[derive(Default)]
struct LedgerState {
    sequence: u64,
    /// Every commit ever accepted; never evicted.
    entries: HashMap<WagerId, LedgerEntry>,
    failing: HashMap<WagerId, LedgerErrorKind>,
    fail_next: Option<LedgerErrorKind>,
    latency: Duration,
}

/// Write-once ledger. A second commit for the same wager is rejected with
/// `AlreadyResolved` and never produces a second entry.
#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every commit for `wager_id` with `kind`.
    pub async fn fail_wager(&self, wager_id: WagerId, kind: LedgerErrorKind) {
        self.state.lock().await.failing.insert(wager_id, kind);
    }

    /// Reject only the next commit, whichever wager it is for.
    pub async fn fail_next(&self, kind: LedgerErrorKind) {
        self.state.lock().await.fail_next = Some(kind);
    }

    pub async fn clear_faults(&self) {
        let mut state = self.state.lock().await;
        state.failing.clear();
        state.fail_next = None;
    }

    pub async fn set_latency(&self, latency: Duration) {
        self.state.lock().await.latency = latency;
    }

    pub async fn is_resolved(&self, wager_id: &WagerId) -> bool {
        self.state.lock().await.entries.contains_key(wager_id)
    }

    pub async fn entry(&self, wager_id: &WagerId) -> Option<LedgerEntry> {
        self.state.lock().await.entries.get(wager_id).cloned()
    }

    /// Number of commits accepted so far.
    pub async fn commit_count(&self) -> usize {
        self.state.lock().await.entries.len()
    }
}

impl Ledger for InMemoryLedger {
    async fn resolve(
        &self,
        wager_id: WagerId,
        winning_competitor_id: &CompetitorId,
        pointer: &RecordPointer,
    ) -> Result<LedgerReceipt> {
        let latency = self.state.lock().await.latency;
        simulate_latency(latency).await;

        let mut state = self.state.lock().await;
        if let Some(kind) = state.fail_next.take() {
            return Err(PodiumError::ledger(kind, "injected failure"));
        }
        if let Some(kind) = state.failing.get(&wager_id) {
            return Err(PodiumError::ledger(
                *kind,
                format!("injected failure for wager {wager_id}"),
            ));
        }
        if let Some(existing) = state.entries.get(&wager_id) {
            return Err(PodiumError::ledger(
                LedgerErrorKind::AlreadyResolved,
                format!(
                    "wager {wager_id} already settled in {}",
                    existing.receipt.tx_id
                ),
            ));
        }

        state.sequence += 1;
        let receipt = LedgerReceipt {
            tx_id: format!("tx-{:08}", state.sequence),
            sequence: state.sequence,
            committed_at: Utc::now(),
        };
        state.entries.insert(
            wager_id,
            LedgerEntry {
                winning_competitor_id: winning_competitor_id.clone(),
                pointer: pointer.clone(),
                receipt: receipt.clone(),
            },
        );
        tracing::debug!(wager = %wager_id, sequence = receipt.sequence, "Ledger entry written");
        Ok(receipt)
    }

    async fn receipt_for(&self, wager_id: WagerId) -> Result<Option<LedgerReceipt>> {
        Ok(self
            .state
            .lock()
            .await
            .entries
            .get(&wager_id)
            .map(|entry| entry.receipt.clone()))
    }
}

// ---------------------------------------------------------------------------
// Record store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    records: HashMap<WagerId, (RecordPointer, Wager)>,
    statuses: HashMap<WagerId, StatusUpdate>,
    upload_faults: HashSet<WagerId>,
    status_faults: HashSet<WagerId>,
    status_faults_once: HashSet<WagerId>,
    latency: Duration,
    uploads: usize,
}

/// Content-addressed record store. Re-uploading an identical record yields
/// the same pointer.
#[derive(Default)]
pub struct InMemoryRecordStore {
    state: Mutex<StoreState>,
}

impl InMemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_uploads(&self, wager_id: WagerId) {
        self.state.lock().await.upload_faults.insert(wager_id);
    }

    pub async fn fail_status_updates(&self, wager_id: WagerId) {
        self.state.lock().await.status_faults.insert(wager_id);
    }

    /// Fail the next status update for `wager_id`, then succeed.
    pub async fn fail_status_update_once(&self, wager_id: WagerId) {
        self.state.lock().await.status_faults_once.insert(wager_id);
    }

    pub async fn clear_faults(&self) {
        let mut state = self.state.lock().await;
        state.upload_faults.clear();
        state.status_faults.clear();
        state.status_faults_once.clear();
    }

    pub async fn set_latency(&self, latency: Duration) {
        self.state.lock().await.latency = latency;
    }

    /// The last status written for `wager_id`.
    pub async fn status_of(&self, wager_id: &WagerId) -> Option<StatusUpdate> {
        self.state.lock().await.statuses.get(wager_id).cloned()
    }

    /// The last record uploaded for `wager_id`.
    pub async fn record(&self, wager_id: &WagerId) -> Option<Wager> {
        self.state
            .lock()
            .await
            .records
            .get(wager_id)
            .map(|(_, record)| record.clone())
    }

    pub async fn pointer_of(&self, wager_id: &WagerId) -> Option<RecordPointer> {
        self.state
            .lock()
            .await
            .records
            .get(wager_id)
            .map(|(pointer, _)| pointer.clone())
    }

    /// Total successful uploads, including re-uploads.
    pub async fn upload_count(&self) -> usize {
        self.state.lock().await.uploads
    }
}

impl RecordStore for InMemoryRecordStore {
    async fn upload(&self, wager_id: WagerId, record: &Wager) -> Result<RecordPointer> {
        let latency = self.state.lock().await.latency;
        simulate_latency(latency).await;

        let content = serde_json::to_vec(record)?;
        let mut state = self.state.lock().await;
        if state.upload_faults.contains(&wager_id) {
            return Err(PodiumError::storage(format!(
                "injected upload failure for wager {wager_id}"
            )));
        }
        let pointer = RecordPointer::for_content(&content);
        state
            .records
            .insert(wager_id, (pointer.clone(), record.clone()));
        state.uploads += 1;
        Ok(pointer)
    }

    async fn update_status(&self, wager_id: WagerId, update: &StatusUpdate) -> Result<()> {
        let latency = self.state.lock().await.latency;
        simulate_latency(latency).await;

        let mut state = self.state.lock().await;
        if state.status_faults.contains(&wager_id) || state.status_faults_once.remove(&wager_id) {
            return Err(PodiumError::storage(format!(
                "injected status failure for wager {wager_id}"
            )));
        }
        state.statuses.insert(wager_id, update.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Match data
// ---------------------------------------------------------------------------

/// Fixed match metadata keyed by match.
#[derive(Debug, Clone, Default)]
pub struct StaticMatchData {
    matches: HashMap<MatchId, (OutcomeKind, Vec<Competitor>)>,
}

impl StaticMatchData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_match(
        mut self,
        match_id: MatchId,
        kind: OutcomeKind,
        competitors: Vec<Competitor>,
    ) -> Self {
        self.insert(match_id, kind, competitors);
        self
    }

    pub fn insert(&mut self, match_id: MatchId, kind: OutcomeKind, competitors: Vec<Competitor>) {
        self.matches.insert(match_id, (kind, competitors));
    }

    fn lookup(&self, match_id: &MatchId) -> Result<&(OutcomeKind, Vec<Competitor>)> {
        self.matches
            .get(match_id)
            .ok_or_else(|| PodiumError::MatchData {
                reason: format!("unknown {match_id}"),
            })
    }
}

impl MatchDataProvider for StaticMatchData {
    async fn list_competitors(&self, match_id: &MatchId) -> Result<Vec<Competitor>> {
        Ok(self.lookup(match_id)?.1.clone())
    }

    async fn outcome_kind(&self, match_id: &MatchId) -> Result<OutcomeKind> {
        Ok(self.lookup(match_id)?.0)
    }
}

#[cfg(test)]
mod tests {
    use podium_types::{MatchOutcome, Resolution, WinningParty};

    use super::*;

    #[tokio::test]
    async fn ledger_sequences_are_monotonic() {
        let ledger = InMemoryLedger::new();
        let pointer = RecordPointer::new("p");
        let a = ledger
            .resolve(WagerId::new(), &CompetitorId::new("A"), &pointer)
            .await
            .unwrap();
        let b = ledger
            .resolve(WagerId::new(), &CompetitorId::new("A"), &pointer)
            .await
            .unwrap();
        assert!(b.sequence > a.sequence);
        assert_ne!(a.tx_id, b.tx_id);
        assert_eq!(ledger.commit_count().await, 2);
    }

    #[tokio::test]
    async fn ledger_never_pays_twice() {
        let ledger = InMemoryLedger::new();
        let id = WagerId::new();
        let pointer = RecordPointer::new("p");
        ledger
            .resolve(id, &CompetitorId::new("A"), &pointer)
            .await
            .unwrap();
        let err = ledger
            .resolve(id, &CompetitorId::new("B"), &pointer)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PodiumError::Ledger {
                kind: LedgerErrorKind::AlreadyResolved,
                ..
            }
        ));
        let entry = ledger.entry(&id).await.unwrap();
        assert_eq!(entry.winning_competitor_id.as_str(), "A");
    }

    #[tokio::test]
    async fn ledger_remembers_every_commit() {
        let ledger = InMemoryLedger::new();
        let pointer = RecordPointer::new("p");
        let first = WagerId::new();
        let receipt = ledger
            .resolve(first, &CompetitorId::new("A"), &pointer)
            .await
            .unwrap();
        for _ in 0..500 {
            ledger
                .resolve(WagerId::new(), &CompetitorId::new("A"), &pointer)
                .await
                .unwrap();
        }

        let err = ledger
            .resolve(first, &CompetitorId::new("A"), &pointer)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PodiumError::Ledger {
                kind: LedgerErrorKind::AlreadyResolved,
                ..
            }
        ));
        assert_eq!(ledger.commit_count().await, 501);
        assert_eq!(ledger.receipt_for(first).await.unwrap(), Some(receipt));
        assert_eq!(ledger.receipt_for(WagerId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn ledger_fail_next_is_one_shot() {
        let ledger = InMemoryLedger::new();
        ledger.fail_next(LedgerErrorKind::Network).await;
        let id = WagerId::new();
        let pointer = RecordPointer::new("p");
        let err = ledger
            .resolve(id, &CompetitorId::new("A"), &pointer)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(!ledger.is_resolved(&id).await);
        ledger
            .resolve(id, &CompetitorId::new("A"), &pointer)
            .await
            .unwrap();
        assert!(ledger.is_resolved(&id).await);
    }

    #[tokio::test]
    async fn identical_records_share_a_pointer() {
        let store = InMemoryRecordStore::new();
        let wager = Wager::dummy_accepted(&MatchId::new("m"), "A", "B");
        let p1 = store.upload(wager.id, &wager).await.unwrap();
        let p2 = store.upload(wager.id, &wager).await.unwrap();
        assert_eq!(p1, p2);
        assert!(p1.as_str().starts_with("sha256:"));
        assert_eq!(store.upload_count().await, 2);
        assert_eq!(store.record(&wager.id).await.unwrap(), wager);
    }

    #[tokio::test]
    async fn status_fault_once_then_succeeds() {
        let store = InMemoryRecordStore::new();
        let id = WagerId::new();
        store.fail_status_update_once(id).await;
        let update = StatusUpdate::resolved(Resolution {
            winning_competitor_id: CompetitorId::new("A"),
            winning_username: "alice".into(),
            winning_party: WinningParty::Creator,
            resolved_at: Utc::now(),
        });
        assert!(store.update_status(id, &update).await.is_err());
        assert!(store.status_of(&id).await.is_none());
        store.update_status(id, &update).await.unwrap();
        assert_eq!(store.status_of(&id).await.unwrap(), update);
    }

    #[tokio::test]
    async fn upload_fault_is_storage_error() {
        let store = InMemoryRecordStore::new();
        let wager = Wager::dummy_accepted(&MatchId::new("m"), "A", "B");
        store.fail_uploads(wager.id).await;
        let err = store.upload(wager.id, &wager).await.unwrap_err();
        assert!(matches!(err, PodiumError::Storage { .. }));
        assert!(store.pointer_of(&wager.id).await.is_none());
    }

    #[tokio::test]
    async fn unknown_match_is_match_data_error() {
        let data = StaticMatchData::new().with_match(
            MatchId::new("final"),
            OutcomeKind::SingleWinner,
            vec![Competitor::new("r", "Red", "RED")],
        );
        assert_eq!(
            data.outcome_kind(&MatchId::new("final")).await.unwrap(),
            MatchOutcome::winner("r").kind()
        );
        assert_eq!(
            data.list_competitors(&MatchId::new("final"))
                .await
                .unwrap()
                .len(),
            1
        );
        let err = data.list_competitors(&MatchId::new("nope")).await.unwrap_err();
        assert!(matches!(err, PodiumError::MatchData { .. }));
    }
}
