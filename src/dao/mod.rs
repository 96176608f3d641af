/// Persisted record definitions.
pub mod models;
/// Player win-count stores.
pub mod player_store;
/// Storage error types shared by every backend.
pub mod storage;
