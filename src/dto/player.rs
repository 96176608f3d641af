use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dao::models::PlayerEntity;

/// League row: a player and their cumulative wins.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PlayerSummary {
    /// Player name, as posted.
    pub name: String,
    /// Games won.
    pub wins: u64,
}

impl From<PlayerEntity> for PlayerSummary {
    fn from(entity: PlayerEntity) -> Self {
        Self {
            name: entity.name,
            wins: entity.wins,
        }
    }
}
