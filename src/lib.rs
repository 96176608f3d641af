//! Library crate for poker-league, exposing modules for binaries and integration tests.

pub mod config;
/// Player storage backends.
pub mod dao;
/// Request and response payloads.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP and WebSocket routes.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Shared application state and the game table.
pub mod state;
