use std::{num::NonZeroU32, sync::Arc, time::SystemTime};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{player_store::PlayerStore, storage::StorageError},
    services::blind_alerter::{AlertSink, BlindAlertScheduler, ScheduledAlerts},
    state::state_machine::{GameEvent, GameStateMachine, InvalidTransition, SessionId, Snapshot},
};

/// Failures surfaced by [`Game`] operations.
#[derive(Debug, Error)]
pub enum GameError {
    /// A game needs at least one player.
    #[error("player count must be positive (got {0})")]
    InvalidPlayerCount(u32),
    /// Another game already owns the table.
    #[error("a game is already running")]
    SessionActive(#[source] InvalidTransition),
    /// The win could not be persisted; the session is closed regardless.
    #[error("failed to record win")]
    Storage(#[from] StorageError),
}

/// Result of declaring a winner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishOutcome {
    /// The session was closed and the win recorded.
    Recorded {
        /// Session that was closed.
        session_id: SessionId,
        /// Player credited with the win.
        winner: String,
    },
    /// No game was running; nothing happened.
    NoActiveSession,
}

/// Public view of the running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Identifier handed to the connection that started the game.
    pub id: SessionId,
    /// Players seated when the game started.
    pub player_count: NonZeroU32,
    /// Wall-clock start time.
    pub started_at: SystemTime,
}

/// Point-in-time view of the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStatus {
    /// Phase and version of the state machine.
    pub snapshot: Snapshot,
    /// Running session, if any.
    pub session: Option<SessionInfo>,
}

/// Live data of the game in progress.
struct GameSession {
    info: SessionInfo,
    alerts: ScheduledAlerts,
}

struct GameInner {
    machine: GameStateMachine,
    session: Option<GameSession>,
}

/// The single shared table: owns the blind alerts of the running game and records its winner.
pub struct Game {
    store: Arc<dyn PlayerStore>,
    alerter: Arc<dyn BlindAlertScheduler>,
    inner: Mutex<GameInner>,
}

impl Game {
    /// Idle table recording wins in `store` and arming blinds through `alerter`.
    pub fn new(store: Arc<dyn PlayerStore>, alerter: Arc<dyn BlindAlertScheduler>) -> Self {
        Self {
            store,
            alerter,
            inner: Mutex::new(GameInner {
                machine: GameStateMachine::new(),
                session: None,
            }),
        }
    }

    /// Start a game for `player_count` players, pushing blind alerts to `sink`.
    ///
    /// Rejected while another game is running.
    pub async fn start(
        &self,
        player_count: u32,
        sink: Arc<dyn AlertSink>,
    ) -> Result<SessionId, GameError> {
        let player_count =
            NonZeroU32::new(player_count).ok_or(GameError::InvalidPlayerCount(player_count))?;

        let mut inner = self.inner.lock().await;
        let session_id = Uuid::new_v4();
        let event = GameEvent::Start {
            session_id,
            player_count,
        };
        inner.machine.check(event).map_err(GameError::SessionActive)?;

        // Arm the blinds before committing so a failing scheduler leaves the table idle.
        let alerts = self.alerter.schedule(player_count, sink);
        if alerts.is_empty() {
            warn!(%session_id, "no blind level could be scheduled");
        }
        inner.machine.apply(event).map_err(GameError::SessionActive)?;
        info!(%session_id, %player_count, levels = alerts.len(), "game started");

        inner.session = Some(GameSession {
            info: SessionInfo {
                id: session_id,
                player_count,
                started_at: SystemTime::now(),
            },
            alerts,
        });
        Ok(session_id)
    }

    /// Declare `winner`, stopping the blinds and recording the win.
    ///
    /// Calling this with no game running is a no-op.
    pub async fn finish(&self, winner: &str) -> Result<FinishOutcome, GameError> {
        let mut inner = self.inner.lock().await;
        let Some(session) = inner.session.take() else {
            debug!(winner, "finish ignored; no game is running");
            return Ok(FinishOutcome::NoActiveSession);
        };

        session.alerts.cancel();
        if let Err(err) = inner.machine.apply(GameEvent::Finish) {
            warn!(error = %err, "state machine out of sync with session");
        }
        let session_id = session.info.id;
        info!(%session_id, winner, "game finished");

        // The lock is still held so a new game cannot start before the win is stored.
        self.store.record_win(winner.to_string()).await?;
        Ok(FinishOutcome::Recorded {
            session_id,
            winner: winner.to_string(),
        })
    }

    /// Abandon `session_id` without a winner. Returns `false` when that session is not running.
    pub async fn cancel(&self, session_id: SessionId) -> bool {
        let mut inner = self.inner.lock().await;
        if inner
            .session
            .as_ref()
            .is_none_or(|session| session.info.id != session_id)
        {
            return false;
        }

        if let Some(session) = inner.session.take() {
            session.alerts.cancel();
        }
        if let Err(err) = inner.machine.apply(GameEvent::Cancel) {
            warn!(error = %err, "state machine out of sync with session");
        }
        info!(%session_id, "game cancelled");
        true
    }

    /// Current phase and running session.
    pub async fn status(&self) -> GameStatus {
        let inner = self.inner.lock().await;
        GameStatus {
            snapshot: inner.machine.snapshot(),
            session: inner.session.as_ref().map(|session| session.info.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        time::Duration,
    };

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        dao::{models::PlayerEntity, player_store::InMemoryPlayerStore, storage::StorageResult},
        services::blind_alerter::{TokioBlindAlerter, tests::RecordingSink},
        state::state_machine::GamePhase,
    };

    /// Store whose disk is gone: reads work, every write fails.
    struct UnwritableStore;

    impl PlayerStore for UnwritableStore {
        fn league(&self) -> BoxFuture<'static, Vec<PlayerEntity>> {
            Box::pin(async { Vec::new() })
        }

        fn player_score(&self, _name: String) -> BoxFuture<'static, u64> {
            Box::pin(async { 0 })
        }

        fn record_win(&self, _name: String) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async {
                Err(StorageError::io("league.json", std::io::Error::other("disk full")))
            })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    /// Scheduler that blows up the first time it is asked to arm a game.
    #[derive(Default)]
    struct FailsOnceAlerter {
        failed: AtomicBool,
        inner: TokioBlindAlerter,
    }

    impl BlindAlertScheduler for FailsOnceAlerter {
        fn schedule(&self, player_count: NonZeroU32, sink: Arc<dyn AlertSink>) -> ScheduledAlerts {
            if !self.failed.swap(true, Ordering::SeqCst) {
                panic!("scheduler failure");
            }
            self.inner.schedule(player_count, sink)
        }
    }

    fn game() -> (Game, Arc<InMemoryPlayerStore>) {
        let store = Arc::new(InMemoryPlayerStore::new());
        let game = Game::new(store.clone(), Arc::new(TokioBlindAlerter::default()));
        (game, store)
    }

    #[tokio::test(start_paused = true)]
    async fn start_sends_first_blind() {
        let (game, _) = game();
        let sink = Arc::new(RecordingSink::default());

        let session_id = game.start(3, sink.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(sink.alerts(), ["Blind is 100"]);
        let status = game.status().await;
        assert_eq!(
            status.snapshot.phase,
            GamePhase::Running {
                session_id,
                player_count: NonZeroU32::new(3).unwrap()
            }
        );
        assert_eq!(status.session.map(|s| s.id), Some(session_id));
    }

    #[tokio::test(start_paused = true)]
    async fn finish_records_win_and_silences_alerts() {
        let (game, store) = game();
        let sink = Arc::new(RecordingSink::default());

        let session_id = game.start(5, sink.clone()).await.unwrap();
        let outcome = game.finish("Ruth").await.unwrap();

        assert_eq!(
            outcome,
            FinishOutcome::Recorded {
                session_id,
                winner: "Ruth".into()
            }
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(sink.alerts().is_empty());
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(sink.alerts().is_empty());

        assert_eq!(store.player_score("Ruth".into()).await, 1);
        assert_eq!(game.status().await.snapshot.phase, GamePhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_players_is_rejected() {
        let (game, _) = game();
        let err = game
            .start(0, Arc::new(RecordingSink::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidPlayerCount(0)));
        assert_eq!(game.status().await.snapshot.phase, GamePhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_rejected_while_running() {
        let (game, _) = game();
        let first = game
            .start(3, Arc::new(RecordingSink::default()))
            .await
            .unwrap();

        let err = game
            .start(4, Arc::new(RecordingSink::default()))
            .await
            .unwrap_err();

        assert!(matches!(err, GameError::SessionActive(_)));
        assert_eq!(game.status().await.session.map(|s| s.id), Some(first));
    }

    #[tokio::test(start_paused = true)]
    async fn finish_without_game_is_a_no_op() {
        let (game, store) = game();

        assert_eq!(
            game.finish("Ghost").await.unwrap(),
            FinishOutcome::NoActiveSession
        );

        game.start(2, Arc::new(RecordingSink::default()))
            .await
            .unwrap();
        game.finish("Ruth").await.unwrap();
        assert_eq!(
            game.finish("Ruth").await.unwrap(),
            FinishOutcome::NoActiveSession
        );

        assert_eq!(store.player_score("Ruth".into()).await, 1);
        assert_eq!(store.player_score("Ghost".into()).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_only_affects_its_own_session() {
        let (game, store) = game();
        let sink = Arc::new(RecordingSink::default());
        let session_id = game.start(3, sink.clone()).await.unwrap();

        assert!(!game.cancel(Uuid::new_v4()).await);
        assert!(game.cancel(session_id).await);
        assert!(!game.cancel(session_id).await);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(sink.alerts().is_empty());
        assert!(store.league().await.is_empty());
        assert_eq!(game.status().await.snapshot.phase, GamePhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_persist_still_closes_the_session() {
        let game = Game::new(
            Arc::new(UnwritableStore),
            Arc::new(TokioBlindAlerter::default()),
        );
        let sink = Arc::new(RecordingSink::default());
        game.start(3, sink.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let err = game.finish("Ruth").await.unwrap_err();

        assert!(matches!(err, GameError::Storage(StorageError::Io { .. })));
        let status = game.status().await;
        assert_eq!(status.snapshot.phase, GamePhase::Idle);
        assert!(status.session.is_none());
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(sink.alerts(), ["Blind is 100"]);

        game.start(2, Arc::new(RecordingSink::default()))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn scheduler_failure_leaves_the_table_idle() {
        let game = Arc::new(Game::new(
            Arc::new(InMemoryPlayerStore::new()),
            Arc::new(FailsOnceAlerter::default()),
        ));

        let first = tokio::spawn({
            let game = game.clone();
            async move { game.start(1, Arc::new(RecordingSink::default())).await }
        });
        assert!(first.await.unwrap_err().is_panic());
        assert_eq!(game.status().await.snapshot.phase, GamePhase::Idle);

        let sink = Arc::new(RecordingSink::default());
        let session_id = game.start(1, sink.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(sink.alerts(), ["Blind is 100"]);
        assert_eq!(game.status().await.session.map(|s| s.id), Some(session_id));
    }
}
