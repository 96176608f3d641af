use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::dao::{
    models::PlayerEntity,
    player_store::{PlayerStore, ranked},
    storage::StorageResult,
};

/// Volatile player store; wins are lost when the process exits.
#[derive(Clone, Default)]
pub struct InMemoryPlayerStore {
    players: Arc<RwLock<IndexMap<String, u64>>>,
}

impl InMemoryPlayerStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records, later duplicates overwriting earlier ones.
    pub fn with_players(players: impl IntoIterator<Item = PlayerEntity>) -> Self {
        let players = players
            .into_iter()
            .map(|PlayerEntity { name, wins }| (name, wins))
            .collect();
        Self {
            players: Arc::new(RwLock::new(players)),
        }
    }
}

impl PlayerStore for InMemoryPlayerStore {
    fn league(&self) -> BoxFuture<'static, Vec<PlayerEntity>> {
        let players = self.players.clone();
        Box::pin(async move { ranked(&*players.read().await) })
    }

    fn player_score(&self, name: String) -> BoxFuture<'static, u64> {
        let players = self.players.clone();
        Box::pin(async move { players.read().await.get(&name).copied().unwrap_or(0) })
    }

    fn record_win(&self, name: String) -> BoxFuture<'static, StorageResult<()>> {
        let players = self.players.clone();
        Box::pin(async move {
            *players.write().await.entry(name).or_insert(0) += 1;
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
