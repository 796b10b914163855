//! Score submissions, leaderboard rows, and the ranking order
//!
//! `RankKey` defines the single total order the whole engine agrees on:
//! higher score first, ties broken by byte-lexicographically smaller
//! `user_id`. "Less" means "ranks earlier".

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::PodiumResult;
use crate::limits::{validate_game_id, validate_user_id};

/// A score submission
///
/// The write input of the engine and the payload of a WAL record.
/// `ctime` is captured at construction (epoch milliseconds) and recorded in
/// the WAL only; it never participates in ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Opaque user identifier, unique within a game
    pub user_id: String,
    /// Identifier of the game whose shard receives this entry
    pub game_id: String,
    /// Submitted score
    pub score: i64,
    /// Acceptance timestamp, epoch milliseconds
    pub ctime: i64,
}

impl ScoreEntry {
    /// Create an entry stamped with the current wall-clock time.
    pub fn new(user_id: impl Into<String>, game_id: impl Into<String>, score: i64) -> Self {
        ScoreEntry {
            user_id: user_id.into(),
            game_id: game_id.into(),
            score,
            ctime: Utc::now().timestamp_millis(),
        }
    }

    /// Validate the identifier fields.
    ///
    /// Score bounds are configuration-dependent and checked by the shard.
    pub fn validate(&self) -> PodiumResult<()> {
        validate_user_id(&self.user_id)?;
        validate_game_id(&self.game_id)?;
        Ok(())
    }
}

/// One row of a leaderboard read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    /// User identifier
    pub user_id: String,
    /// Current score
    pub score: i64,
    /// 1-based dense rank
    pub rank: u64,
    /// Game this row belongs to
    pub game_id: String,
}

/// Borrowed ranking key: `(score, user_id)` under the leaderboard order.
///
/// `a < b` iff `a.score > b.score`, or the scores are equal and
/// `a.user_id < b.user_id` byte-lexicographically. The order is total:
/// within a shard no two live keys share a `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankKey<'a> {
    /// Score component (descending)
    pub score: i64,
    /// Tie-break component (ascending)
    pub user_id: &'a str,
}

impl<'a> RankKey<'a> {
    /// Create a key.
    #[inline]
    pub fn new(score: i64, user_id: &'a str) -> Self {
        RankKey { score, user_id }
    }
}

impl Ord for RankKey<'_> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.user_id.cmp(other.user_id))
    }
}

impl PartialOrd for RankKey<'_> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
