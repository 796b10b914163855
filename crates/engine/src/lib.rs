//! Leaderboard engine for Podium
//!
//! This crate orchestrates the lower layers:
//! - Shard: per-game coordinator enforcing WAL-first writes and serving reads
//! - Engine: process-wide registry of shards with single-flight lazy recovery
//! - EngineConfig: data directory, score bounds, read limits, WAL tuning
//!
//! The engine is the only component that knows about:
//! - The write protocol ordering (durable WAL record before index update)
//! - Recovery (checkpoint load, then WAL replay, last write wins)
//! - Checkpoint scheduling relative to live writes

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod recovery;
pub mod registry;
pub mod shard;

pub use config::EngineConfig;
pub use recovery::RecoveryStats;
pub use registry::Engine;
pub use shard::Shard;

// Re-export the WAL tuning knobs alongside the engine config.
pub use podium_durability::wal::{WalConfig, WalConfigError};
