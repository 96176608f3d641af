//! Service helpers for the league table and per-player scores.

use tracing::info;

use crate::{dto::player::PlayerSummary, error::ServiceError, state::SharedState};

/// Return every player ranked by wins, highest first.
pub async fn get_league(state: &SharedState) -> Vec<PlayerSummary> {
    state
        .store()
        .league()
        .await
        .into_iter()
        .map(PlayerSummary::from)
        .collect()
}

/// Return the wins of `name`.
///
/// A player who never won is indistinguishable from an unknown one and both are reported as
/// not found.
pub async fn get_player_score(state: &SharedState, name: String) -> Result<u64, ServiceError> {
    match state.store().player_score(name.clone()).await {
        0 => Err(ServiceError::NotFound(format!("player `{name}` has no wins"))),
        wins => Ok(wins),
    }
}

/// Record one win for `name` and persist it.
pub async fn record_win(state: &SharedState, name: String) -> Result<(), ServiceError> {
    state.store().record_win(name.clone()).await?;
    info!(player = %name, "win recorded");
    Ok(())
}
