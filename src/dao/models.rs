use serde::{Deserialize, Serialize};

/// Persisted record for a single player, one element of the stored JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Unique player name.
    pub name: String,
    /// Cumulative number of recorded wins.
    pub wins: u64,
}
