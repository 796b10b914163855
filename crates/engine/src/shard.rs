//! Per-game shard coordinator.
//!
//! A shard owns one ranking index and one WAL and enforces the write
//! protocol: validate, append durably, then update the index. Reads go
//! straight to the index under a shared lock and never touch the WAL.
//!
//! # Locking
//!
//! - `index`: reader-writer lock over the whole skip list. Writers hold it
//!   exclusively only for the in-memory upsert, after WAL durability.
//! - `write_gate`: taken shared by every write, exclusively by
//!   `checkpoint()`. This keeps the checkpoint snapshot and the WAL
//!   truncation atomic with respect to in-flight writes; an acknowledged
//!   record can never fall between the snapshot and the truncate.

use parking_lot::RwLock;
use podium_core::limits::validate_user_id;
use podium_core::types::{LeaderboardRow, ScoreEntry};
use podium_core::{PodiumError, PodiumResult};
use podium_durability::checkpoint::write_checkpoint;
use podium_durability::record::WalRecord;
use podium_durability::wal::WalAppender;
use podium_index::RankIndex;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::EngineConfig;
use crate::recovery;

/// Per-game leaderboard shard.
pub struct Shard {
    game_id: String,
    index: RwLock<RankIndex>,
    wal: WalAppender,
    checkpoint_path: PathBuf,
    write_gate: RwLock<()>,
    score_min: i64,
    score_max: i64,
    max_top_k: usize,
}

impl Shard {
    /// Open a shard, recovering its durable state before first use.
    pub(crate) fn open(game_id: &str, config: &EngineConfig) -> PodiumResult<Self> {
        let wal_path = config.wal_path(game_id);
        let checkpoint_path = config.checkpoint_path(game_id);

        let (index, _stats) = recovery::recover(game_id, &wal_path, &checkpoint_path)?;
        let wal = WalAppender::open(wal_path, config.wal.clone())?;

        Ok(Shard {
            game_id: game_id.to_string(),
            index: RwLock::new(index),
            wal,
            checkpoint_path,
            write_gate: RwLock::new(()),
            score_min: config.score_min,
            score_max: config.score_max,
            max_top_k: config.max_top_k,
        })
    }

    /// The game this shard serves.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Accept a score update.
    ///
    /// The entry's WAL record is durable before the index changes; on any
    /// WAL failure the index is untouched and the error is retryable.
    pub fn update_score(&self, entry: &ScoreEntry) -> PodiumResult<()> {
        entry.validate()?;
        if entry.game_id != self.game_id {
            return Err(PodiumError::invalid_input(format!(
                "entry for game '{}' routed to shard '{}'",
                entry.game_id, self.game_id
            )));
        }
        if entry.score < self.score_min || entry.score > self.score_max {
            return Err(PodiumError::invalid_input(format!(
                "score {} outside accepted range [{}, {}]",
                entry.score, self.score_min, self.score_max
            )));
        }

        let _gate = self.write_gate.read();
        self.wal.append(&WalRecord::from_entry(entry))?;
        self.index.write().upsert(&entry.user_id, entry.score);
        Ok(())
    }

    /// The top `k` rows in ranking order.
    ///
    /// Returns fewer than `k` rows when the shard is smaller; `k = 0`
    /// returns an empty list. `k` beyond the configured limit is invalid.
    pub fn top_k(&self, k: usize) -> PodiumResult<Vec<LeaderboardRow>> {
        if k > self.max_top_k {
            return Err(PodiumError::invalid_input(format!(
                "k {} exceeds the configured limit {}",
                k, self.max_top_k
            )));
        }
        let index = self.index.read();
        Ok(index
            .top_k(k)
            .into_iter()
            .map(|entry| LeaderboardRow {
                user_id: entry.user_id.to_string(),
                score: entry.score,
                rank: entry.rank,
                game_id: self.game_id.clone(),
            })
            .collect())
    }

    /// The user's 1-based rank, or `None` if the user has no score.
    pub fn rank_of(&self, user_id: &str) -> PodiumResult<Option<u64>> {
        validate_user_id(user_id)?;
        Ok(self.index.read().rank_of(user_id))
    }

    /// The user's current score, or `None` if the user has no score.
    pub fn score_of(&self, user_id: &str) -> PodiumResult<Option<i64>> {
        validate_user_id(user_id)?;
        Ok(self.index.read().score_of(user_id))
    }

    /// Number of users on this shard's board.
    pub fn user_count(&self) -> usize {
        self.index.read().len()
    }

    /// Compact durable state: snapshot the board, then truncate the WAL.
    ///
    /// Holds the write gate exclusively for the duration, so concurrent
    /// writes wait rather than race the truncation. Returns the number of
    /// users captured.
    pub fn checkpoint(&self) -> PodiumResult<usize> {
        let _gate = self.write_gate.write();
        let count = {
            let index = self.index.read();
            write_checkpoint(&self.checkpoint_path, index.iter_ordered())?
        };
        self.wal.truncate()?;
        info!(
            target: "podium::checkpoint",
            game_id = %self.game_id,
            users = count,
            "checkpoint written, wal truncated"
        );
        Ok(count)
    }

    /// Path of this shard's WAL file.
    pub fn wal_path(&self) -> &Path {
        self.wal.path()
    }

    /// Path of this shard's checkpoint file.
    pub fn checkpoint_path(&self) -> &Path {
        &self.checkpoint_path
    }
}

impl std::fmt::Debug for Shard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shard")
            .field("game_id", &self.game_id)
            .field("users", &self.user_count())
            .finish()
    }
}
