//! Engine registry: process-wide `game_id → Shard` mapping.
//!
//! The registry is an owned value threaded through request handlers, not a
//! global. `shard()` is idempotent and hands back the same `Arc<Shard>` for
//! a given id for the life of the process. The first request for a game
//! constructs and recovers its shard under the map's entry lock, so
//! concurrent first-gets produce exactly one shard and block until it is
//! ready to serve. Shards are never evicted.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use podium_core::limits::validate_game_id;
use podium_core::types::ScoreEntry;
use podium_core::{PodiumError, PodiumResult};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::EngineConfig;
use crate::shard::Shard;

/// The leaderboard engine: configuration plus all live shards.
pub struct Engine {
    config: EngineConfig,
    shards: DashMap<String, Arc<Shard>>,
}

impl Engine {
    /// Open the engine.
    ///
    /// Validates the configuration and creates the data directory. An
    /// uncreatable data directory is fatal: nothing durable could be
    /// written, so the process should not come up.
    pub fn open(config: EngineConfig) -> PodiumResult<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.data_dir).map_err(|e| {
            PodiumError::internal(format!(
                "cannot create data directory {}: {}",
                config.data_dir.display(),
                e
            ))
        })?;
        info!(
            target: "podium::engine",
            data_dir = %config.data_dir.display(),
            "engine open"
        );
        Ok(Engine {
            config,
            shards: DashMap::new(),
        })
    }

    /// Get the shard for a game, constructing and recovering it on first use.
    pub fn shard(&self, game_id: &str) -> PodiumResult<Arc<Shard>> {
        validate_game_id(game_id)?;
        if let Some(shard) = self.shards.get(game_id) {
            return Ok(Arc::clone(&shard));
        }
        // Single-flight construction: the vacant entry holds the map lock,
        // so a concurrent first-get for the same id waits here and then
        // finds the occupied entry.
        match self.shards.entry(game_id.to_string()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let shard = Arc::new(Shard::open(game_id, &self.config)?);
                entry.insert(Arc::clone(&shard));
                Ok(shard)
            }
        }
    }

    /// Route a score update to its game's shard.
    pub fn update_score(&self, entry: &ScoreEntry) -> PodiumResult<()> {
        entry.validate()?;
        self.shard(&entry.game_id)?.update_score(entry)
    }

    /// Number of live shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// The configured data directory.
    pub fn data_dir(&self) -> &Path {
        self.config.data_dir()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("data_dir", &self.config.data_dir)
            .field("shard_count", &self.shard_count())
            .finish()
    }
}
