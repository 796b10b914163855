//! Durability layer for Podium
//!
//! One append-only WAL file per game shard plus an optional compacted
//! checkpoint. The WAL is the commit point: a score update is acknowledged
//! only after its record is fsynced. Recovery loads the checkpoint (if any)
//! and replays the WAL in file order.
//!
//! - `record`: the delimited text record codec
//! - `wal`: group-commit appender and tolerant replay reader
//! - `checkpoint`: atomic compacted snapshots with CRC32 integrity

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checkpoint;
pub mod record;
pub mod wal;

pub use checkpoint::{load_checkpoint, write_checkpoint};
pub use record::{RecordParseError, WalRecord};
pub use wal::{WalAppender, WalConfig, WalConfigError, WalReplay};
