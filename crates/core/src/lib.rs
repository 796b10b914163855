//! Core types for the Podium leaderboard engine
//!
//! This crate defines the foundational types shared by every layer:
//! - ScoreEntry: a validated score submission (write input, WAL payload)
//! - LeaderboardRow: a ranked read result
//! - RankKey: the total order over (score, user_id)
//! - PodiumError: the unified error model
//! - limits: identifier validation and size caps

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod limits;
pub mod types;

pub use error::{PodiumError, PodiumResult};
pub use limits::{validate_game_id, validate_user_id, MAX_GAME_ID_BYTES, MAX_USER_ID_BYTES};
pub use types::{LeaderboardRow, RankKey, ScoreEntry};
