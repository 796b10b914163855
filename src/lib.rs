//! # Podium
//!
//! Real-time per-game leaderboard engine: a durable, in-memory ranking
//! store accepting score submissions and serving top-K and per-user
//! rank/score queries.
//!
//! Each game gets its own shard: a span-augmented skip list ordered by
//! `(score desc, user_id asc)` paired with a group-committed write-ahead
//! log. A write is acknowledged only after its WAL record is fsynced;
//! recovery replays checkpoint + WAL back to the exact acknowledged state.
//!
//! ```ignore
//! use podium::{Engine, EngineConfig, ScoreEntry};
//!
//! let engine = Engine::open(EngineConfig::from_env()?)?;
//! engine.update_score(&ScoreEntry::new("alice", "tetris", 4200))?;
//!
//! let shard = engine.shard("tetris")?;
//! let top = shard.top_k(10)?;
//! let rank = shard.rank_of("alice")?;
//! ```

#![warn(missing_docs)]

pub use podium_core::error::{PodiumError, PodiumResult};
pub use podium_core::limits::{
    validate_game_id, validate_user_id, MAX_GAME_ID_BYTES, MAX_USER_ID_BYTES,
};
pub use podium_core::types::{LeaderboardRow, RankKey, ScoreEntry};

pub use podium_engine::{Engine, EngineConfig, RecoveryStats, Shard, WalConfig, WalConfigError};

pub use podium_index::{RankIndex, RankedEntry, UpsertOutcome, MAX_LEVEL};

pub use podium_durability::record::{RecordParseError, WalRecord};
pub use podium_durability::wal::WalReplay;
