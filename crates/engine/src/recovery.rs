//! Shard recovery.
//!
//! Rebuilds a shard's ranking index from its durable state: checkpoint
//! first (when present and valid), then WAL replay in file order with
//! last-write-wins upserts. Malformed WAL lines are skipped and counted by
//! the reader; a checkpoint that fails its integrity check aborts recovery.

use podium_core::PodiumResult;
use podium_durability::checkpoint::load_checkpoint;
use podium_durability::wal::WalReplay;
use podium_index::RankIndex;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Counters from one shard recovery.
#[derive(Debug, Clone)]
pub struct RecoveryStats {
    /// Users loaded from the checkpoint.
    pub checkpoint_users: usize,
    /// WAL records applied after the checkpoint.
    pub replayed_records: usize,
    /// Malformed WAL lines skipped (crash-truncated tails).
    pub skipped_malformed: usize,
    /// Wall time the recovery took.
    pub elapsed: Duration,
}

/// Rebuild the index for one shard.
pub(crate) fn recover(
    game_id: &str,
    wal_path: &Path,
    checkpoint_path: &Path,
) -> PodiumResult<(RankIndex, RecoveryStats)> {
    let started = Instant::now();
    let mut index = RankIndex::new();

    let checkpoint_users = match load_checkpoint(checkpoint_path)? {
        Some(entries) => {
            let count = entries.len();
            for (user_id, score) in entries {
                index.upsert(&user_id, score);
            }
            count
        }
        None => 0,
    };

    let mut replay = WalReplay::open(wal_path)?;
    let mut replayed_records = 0usize;
    for record in replay.by_ref() {
        index.upsert(&record.user_id, record.score);
        replayed_records += 1;
    }

    let stats = RecoveryStats {
        checkpoint_users,
        replayed_records,
        skipped_malformed: replay.skipped_malformed(),
        elapsed: started.elapsed(),
    };
    info!(
        target: "podium::recovery",
        game_id,
        checkpoint_users = stats.checkpoint_users,
        replayed_records = stats.replayed_records,
        skipped_malformed = stats.skipped_malformed,
        users = index.len(),
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "shard recovered"
    );
    Ok((index, stats))
}
