use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::format_system_time,
    state::{game::GameStatus, state_machine::GamePhase},
};

/// Coarse phase of the shared table.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PublicPhase {
    /// Waiting for a connection to announce a player count.
    Idle,
    /// Blinds are escalating.
    Running,
}

impl From<&GamePhase> for PublicPhase {
    fn from(phase: &GamePhase) -> Self {
        match phase {
            GamePhase::Idle => PublicPhase::Idle,
            GamePhase::Running { .. } => PublicPhase::Running,
        }
    }
}

/// Response exposing the current state of the table.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameStatusResponse {
    /// Whether a game is running.
    pub phase: PublicPhase,
    /// Incremented on every start, finish, or cancellation.
    pub version: usize,
    /// Session of the running game.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    /// Players seated in the running game.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_count: Option<u32>,
    /// RFC 3339 start time of the running game.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
}

impl From<GameStatus> for GameStatusResponse {
    fn from(status: GameStatus) -> Self {
        let session = status.session;
        Self {
            phase: (&status.snapshot.phase).into(),
            version: status.snapshot.version,
            session_id: session.as_ref().map(|s| s.id),
            player_count: session.as_ref().map(|s| s.player_count.get()),
            started_at: session.map(|s| format_system_time(s.started_at)),
        }
    }
}
