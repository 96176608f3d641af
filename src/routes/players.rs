use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::{error::AppError, services::league_service, state::SharedState};

/// Per-player score endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/players/{name}", get(get_player_score).post(record_win))
}

#[utoipa::path(
    get,
    path = "/players/{name}",
    tag = "players",
    params(("name" = String, Path, description = "Player name")),
    responses(
        (status = 200, description = "Number of wins", content_type = "text/plain", body = String),
        (status = 404, description = "Player has no recorded win")
    )
)]
/// Return the decimal win count of a player.
pub async fn get_player_score(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<String, AppError> {
    let wins = league_service::get_player_score(&state, name).await?;
    Ok(wins.to_string())
}

#[utoipa::path(
    post,
    path = "/players/{name}",
    tag = "players",
    params(("name" = String, Path, description = "Player name")),
    responses(
        (status = 202, description = "Win recorded"),
        (status = 503, description = "Win could not be persisted")
    )
)]
/// Record one win for a player.
pub async fn record_win(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    league_service::record_win(&state, name).await?;
    Ok(StatusCode::ACCEPTED)
}
