/// Blind schedule computation and timed alert delivery.
pub mod blind_alerter;
/// OpenAPI documentation generation.
pub mod documentation;
/// Read-only game status projection.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// League table and player score operations.
pub mod league_service;
/// Game socket connection handling.
pub mod websocket_service;
