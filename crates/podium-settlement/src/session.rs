//! One match's resolution, from operator input to settled wagers.

use podium_collector::OutcomeCollector;
use podium_types::{
    EngineConfig, MatchId, OutcomeKind, PodiumError, ResolutionReport, Result, Wager,
};

use crate::{
    coordinator::ResolutionCoordinator,
    pipeline::SettlementPipeline,
    traits::{Ledger, MatchDataProvider, RecordStore},
};

/// Build a collector for `match_id` from the provider's competitor list and
/// outcome kind.
///
/// # Errors
/// Provider failures, or a collector setup error (empty or duplicate field).
pub async fn open_collector<P: MatchDataProvider>(
    provider: &P,
    match_id: &MatchId,
) -> Result<OutcomeCollector> {
    let kind = provider.outcome_kind(match_id).await?;
    let competitors = provider.list_competitors(match_id).await?;
    tracing::debug!(%match_id, %kind, competitors = competitors.len(), "Opening outcome collector");
    OutcomeCollector::new(match_id.clone(), kind, competitors)
}

pub struct ResolutionSession<L, S> {
    kind: OutcomeKind,
    collector: OutcomeCollector,
    coordinator: ResolutionCoordinator<L, S>,
}

impl<L: Ledger, S: RecordStore> ResolutionSession<L, S> {
    /// # Errors
    /// As [`open_collector`], or `Configuration` for an invalid `config`.
    pub async fn open<P: MatchDataProvider>(
        provider: &P,
        match_id: MatchId,
        pipeline: SettlementPipeline<L, S>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let coordinator = ResolutionCoordinator::new(match_id, pipeline, config);
        Self::from_coordinator(provider, coordinator).await
    }

    /// Open a session around an already-configured coordinator, e.g. one
    /// with a progress channel or advance hook. The collector is built for
    /// the coordinator's match.
    ///
    /// # Errors
    /// As [`open_collector`].
    pub async fn from_coordinator<P: MatchDataProvider>(
        provider: &P,
        coordinator: ResolutionCoordinator<L, S>,
    ) -> Result<Self> {
        let collector = open_collector(provider, coordinator.match_id()).await?;
        let kind = collector.state().kind();
        Ok(Self {
            kind,
            collector,
            coordinator,
        })
    }

    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    #[must_use]
    pub fn collector(&self) -> &OutcomeCollector {
        &self.collector
    }

    pub fn collector_mut(&mut self) -> &mut OutcomeCollector {
        &mut self.collector
    }

    #[must_use]
    pub fn coordinator(&self) -> &ResolutionCoordinator<L, S> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut ResolutionCoordinator<L, S> {
        &mut self.coordinator
    }

    /// Finalize the collected outcome and settle `wagers` under it.
    ///
    /// # Errors
    /// `IncompleteOutcome` while input is incomplete, `OutcomeKindMismatch`
    /// if the outcome shape disagrees with the category, otherwise as
    /// [`ResolutionCoordinator::submit_outcome`].
    pub async fn submit(&mut self, wagers: &[Wager]) -> Result<ResolutionReport> {
        let outcome = self.collector.finalize()?;
        if outcome.kind() != self.kind {
            return Err(PodiumError::OutcomeKindMismatch {
                expected: self.kind,
                actual: outcome.kind(),
            });
        }
        self.coordinator.submit_outcome(&outcome, wagers).await
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use podium_types::{Competitor, Position, RunPhase, Violation, WinningParty};

    use super::*;
    use crate::{
        memory::{InMemoryLedger, InMemoryRecordStore, StaticMatchData},
        progress::progress_channel,
    };

    fn provider() -> StaticMatchData {
        StaticMatchData::new()
            .with_match(
                MatchId::new("gp"),
                OutcomeKind::Ranking,
                vec![
                    Competitor::new("VER", "Max Verstappen", "VER"),
                    Competitor::new("HAM", "Lewis Hamilton", "HAM"),
                    Competitor::new("LEC", "Charles Leclerc", "LEC"),
                ],
            )
            .with_match(
                MatchId::new("bout"),
                OutcomeKind::SingleWinner,
                vec![
                    Competitor::new("red", "Red Corner", "RED"),
                    Competitor::new("blue", "Blue Corner", "BLU"),
                ],
            )
    }

    async fn session(
        match_id: &str,
    ) -> ResolutionSession<Arc<InMemoryLedger>, Arc<InMemoryRecordStore>> {
        let config = EngineConfig::default();
        let pipeline = SettlementPipeline::new(
            Arc::new(InMemoryLedger::new()),
            Arc::new(InMemoryRecordStore::new()),
            &config,
        );
        ResolutionSession::open(&provider(), MatchId::new(match_id), pipeline, config)
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn configured_coordinator_is_kept() {
        let config = EngineConfig::default();
        let pipeline = SettlementPipeline::new(
            Arc::new(InMemoryLedger::new()),
            Arc::new(InMemoryRecordStore::new()),
            &config,
        );
        let advanced = Arc::new(AtomicUsize::new(0));
        let counter = advanced.clone();
        let (producer, mut rx) = progress_channel(4);
        let coordinator = ResolutionCoordinator::new(MatchId::new("bout"), pipeline, config)
            .with_progress(producer)
            .with_advance(Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));

        let mut s = ResolutionSession::from_coordinator(&provider(), coordinator)
            .await
            .unwrap();
        assert_eq!(s.collector().state().match_id(), s.coordinator().match_id());
        assert_eq!(s.kind(), OutcomeKind::SingleWinner);

        s.collector_mut().select_winner("blue");
        let wagers = vec![Wager::dummy_accepted(&MatchId::new("bout"), "red", "blue")];
        s.submit(&wagers).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().wager_id, wagers[0].id);
        assert!(s.coordinator().is_advance_pending());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(advanced.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn coordinator_for_unknown_match_fails_to_open() {
        let config = EngineConfig::default();
        let pipeline = SettlementPipeline::new(
            Arc::new(InMemoryLedger::new()),
            Arc::new(InMemoryRecordStore::new()),
            &config,
        );
        let coordinator = ResolutionCoordinator::new(MatchId::new("nope"), pipeline, config);
        let result = ResolutionSession::from_coordinator(&provider(), coordinator).await;
        assert!(matches!(result, Err(PodiumError::MatchData { .. })));
    }

    fn p(n: u16) -> Position {
        Position::new(n).unwrap()
    }

    #[tokio::test]
    async fn unknown_match_fails_to_open() {
        let err = open_collector(&provider(), &MatchId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, PodiumError::MatchData { .. }));
    }

    #[tokio::test]
    async fn incomplete_ranking_is_not_submitted() {
        let mut s = session("gp").await;
        s.collector_mut().assign(p(1), "HAM");
        let wagers = vec![Wager::dummy_accepted(&MatchId::new("gp"), "VER", "HAM")];

        let err = s.submit(&wagers).await.unwrap_err();
        let PodiumError::IncompleteOutcome { violations } = err else {
            panic!("expected IncompleteOutcome, got {err:?}");
        };
        assert!(violations.contains(&Violation::MissingPosition(p(2))));
        assert_eq!(s.coordinator().phase(), RunPhase::Idle);
    }

    #[tokio::test]
    async fn ranking_session_settles() {
        let mut s = session("gp").await;
        assert_eq!(s.kind(), OutcomeKind::Ranking);
        s.collector_mut().assign(p(1), "HAM");
        s.collector_mut().assign(p(2), "VER");
        s.collector_mut().assign(p(3), "LEC");
        assert!(s.collector().is_complete());

        let wagers = vec![Wager::dummy_accepted(&MatchId::new("gp"), "VER", "HAM")];
        let report = s.submit(&wagers).await.unwrap();
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.settled[0].winning_party, WinningParty::Acceptor);
        assert_eq!(s.coordinator().phase(), RunPhase::FullSuccess);
    }

    #[tokio::test]
    async fn single_winner_session_settles() {
        let mut s = session("bout").await;
        assert_eq!(s.kind(), OutcomeKind::SingleWinner);
        s.collector_mut().select_winner("red");

        let wagers = vec![Wager::dummy_accepted(&MatchId::new("bout"), "red", "blue")];
        let report = s.submit(&wagers).await.unwrap();
        assert_eq!(report.settled[0].winning_party, WinningParty::Creator);
        assert!(!report.settled[0].non_participant_winner);
    }
}
