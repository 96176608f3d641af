use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::player::PlayerSummary, services::league_service, state::SharedState};

/// League table endpoint.
pub fn router() -> Router<SharedState> {
    Router::new().route("/league", get(get_league))
}

#[utoipa::path(
    get,
    path = "/league",
    tag = "players",
    responses((status = 200, description = "Players ranked by wins", body = [PlayerSummary]))
)]
/// Return every player ranked by wins, highest first.
pub async fn get_league(State(state): State<SharedState>) -> Json<Vec<PlayerSummary>> {
    Json(league_service::get_league(&state).await)
}
