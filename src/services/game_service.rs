use crate::{dto::game::GameStatusResponse, state::SharedState};

/// Return the phase of the shared table and details of the running game, if any.
pub async fn get_game_status(state: &SharedState) -> GameStatusResponse {
    state.game().status().await.into()
}
