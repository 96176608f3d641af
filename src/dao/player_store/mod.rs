mod file;
mod memory;

pub use self::{file::FileSystemPlayerStore, memory::InMemoryPlayerStore};

use futures::future::BoxFuture;
use indexmap::IndexMap;

use crate::dao::{models::PlayerEntity, storage::StorageResult};

/// Abstraction over the durable mapping of player names to win counts.
pub trait PlayerStore: Send + Sync {
    /// Snapshot of every player sorted by wins, highest first.
    fn league(&self) -> BoxFuture<'static, Vec<PlayerEntity>>;
    /// Current wins for `name`, `0` when the player has never won.
    fn player_score(&self, name: String) -> BoxFuture<'static, u64>;
    /// Add one win for `name` (inserting it with one win when unseen) and persist the full set.
    fn record_win(&self, name: String) -> BoxFuture<'static, StorageResult<()>>;
    /// Confirm the backing storage is still reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Rank the roster by wins descending; ties keep insertion order.
pub(crate) fn ranked(players: &IndexMap<String, u64>) -> Vec<PlayerEntity> {
    let mut league: Vec<PlayerEntity> = players
        .iter()
        .map(|(name, wins)| PlayerEntity {
            name: name.clone(),
            wins: *wins,
        })
        .collect();
    league.sort_by(|a, b| b.wins.cmp(&a.wins));
    league
}
