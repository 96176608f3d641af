use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI document.
pub mod docs;
/// Game status route.
pub mod game;
/// Health check route.
pub mod health;
/// League table route.
pub mod league;
/// Player score routes.
pub mod players;
/// Game socket upgrade route.
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(league::router())
        .merge(players::router())
        .merge(game::router())
        .merge(websocket::router());

    api_router.merge(docs::router()).with_state(state)
}
