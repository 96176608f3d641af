use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the poker league server.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::league::get_league,
        crate::routes::players::get_player_score,
        crate::routes::players::record_win,
        crate::routes::game::get_game_status,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::player::PlayerSummary,
            crate::dto::game::GameStatusResponse,
            crate::dto::game::PublicPhase,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "players", description = "League table and player scores"),
        (name = "game", description = "Live game socket and status"),
    )
)]
pub struct ApiDoc;
