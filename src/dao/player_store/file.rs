//! JSON file backed [`PlayerStore`] that rewrites the whole league on every win.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
    sync::RwLock,
};
use tracing::{debug, info};

use crate::dao::{
    models::PlayerEntity,
    player_store::{PlayerStore, ranked},
    storage::{StorageError, StorageResult},
};

/// Player store persisted as a single JSON array on disk.
///
/// The file is read once in [`FileSystemPlayerStore::open`]; afterwards memory is the source of
/// truth and every recorded win truncates and rewrites the file from it. The write lock is held
/// for the whole read-modify-persist sequence so concurrent wins are serialized.
///
/// When persisting fails the error is returned and memory keeps the last value that was
/// successfully written, but the file itself may have been left truncated.
#[derive(Clone)]
pub struct FileSystemPlayerStore {
    path: Arc<Path>,
    players: Arc<RwLock<IndexMap<String, u64>>>,
}

impl FileSystemPlayerStore {
    /// Load the store from `path`, creating an empty file when it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path: PathBuf = path.into();

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "player store not found; creating an empty one");
                fs::write(&path, b"[]")
                    .await
                    .map_err(|source| StorageError::io(&path, source))?;
                String::new()
            }
            Err(source) => return Err(StorageError::io(&path, source)),
        };

        let players = decode(&path, &contents)?;
        info!(path = %path.display(), players = players.len(), "loaded player store");

        Ok(Self {
            path: Arc::from(path),
            players: Arc::new(RwLock::new(players)),
        })
    }
}

impl PlayerStore for FileSystemPlayerStore {
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
        let path = self.path.clone();
        Box::pin(async move {
            let mut guard = players.write().await;
            let mut next = guard.clone();
            *next.entry(name.clone()).or_insert(0) += 1;

            persist(&path, &next).await?;
            debug!(player = %name, wins = next[&name], "persisted win");
            *guard = next;
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path.clone();
        Box::pin(async move {
            fs::metadata(&path)
                .await
                .map(|_| ())
                .map_err(|source| StorageError::io(&*path, source))
        })
    }
}

/// Decode the persisted array, treating blank content as an empty league.
fn decode(path: &Path, contents: &str) -> StorageResult<IndexMap<String, u64>> {
    if contents.trim().is_empty() {
        return Ok(IndexMap::new());
    }

    let records: Vec<PlayerEntity> =
        serde_json::from_str(contents).map_err(|source| StorageError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut players = IndexMap::with_capacity(records.len());
    for PlayerEntity { name, wins } in records {
        if players.contains_key(&name) {
            return Err(StorageError::DuplicatePlayer {
                path: path.to_path_buf(),
                name,
            });
        }
        players.insert(name, wins);
    }
    Ok(players)
}

/// Truncate the file and write the full league back.
async fn persist(path: &Path, players: &IndexMap<String, u64>) -> StorageResult<()> {
    let records: Vec<PlayerEntity> = players
        .iter()
        .map(|(name, wins)| PlayerEntity {
            name: name.clone(),
            wins: *wins,
        })
        .collect();
    let payload = serde_json::to_vec(&records).map_err(|source| StorageError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|source| StorageError::io(path, source))?;
    file.write_all(&payload)
        .await
        .map_err(|source| StorageError::io(path, source))?;
    file.sync_all()
        .await
        .map_err(|source| StorageError::io(path, source))?;
    Ok(())
}
