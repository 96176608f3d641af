use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::game::GameStatusResponse, services::game_service, state::SharedState};

/// Read-only view of the shared table.
pub fn router() -> Router<SharedState> {
    Router::new().route("/game", get(get_game_status))
}

#[utoipa::path(
    get,
    path = "/game",
    tag = "game",
    responses((status = 200, description = "Current game status", body = GameStatusResponse))
)]
/// Return whether a game is running and, if so, since when and for how many players.
pub async fn get_game_status(State(state): State<SharedState>) -> Json<GameStatusResponse> {
    Json(game_service::get_game_status(&state).await)
}
