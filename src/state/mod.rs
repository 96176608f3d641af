/// The shared table and its session bookkeeping.
pub mod game;
/// Phase transitions of the shared table.
pub mod state_machine;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    dao::player_store::PlayerStore,
    services::blind_alerter::{BlindAlertScheduler, TokioBlindAlerter},
    state::game::Game,
};

/// Handle to [`AppState`] shared by every route and socket.
pub type SharedState = Arc<AppState>;

/// Central application state: the player store and the single shared table.
pub struct AppState {
    store: Arc<dyn PlayerStore>,
    game: Game,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: &AppConfig, store: Arc<dyn PlayerStore>) -> SharedState {
        let alerter = Arc::new(TokioBlindAlerter::new(config.blinds().clone()));
        Self::with_alerter(store, alerter)
    }

    /// Same as [`AppState::new`] with a caller-provided blind scheduler.
    pub fn with_alerter(
        store: Arc<dyn PlayerStore>,
        alerter: Arc<dyn BlindAlertScheduler>,
    ) -> SharedState {
        Arc::new(Self {
            game: Game::new(store.clone(), alerter),
            store,
        })
    }

    /// Obtain a handle to the player store.
    pub fn store(&self) -> Arc<dyn PlayerStore> {
        self.store.clone()
    }

    /// The table shared by every connection.
    pub fn game(&self) -> &Game {
        &self.game
    }
}
