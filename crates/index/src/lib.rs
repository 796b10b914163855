//! In-memory ranking index for Podium
//!
//! A probabilistic skip list over `(score desc, user_id asc)` with
//! span-augmented forward pointers, giving O(log n) expected rank queries
//! and ordered top-K walks, plus a `user_id → node` side map for O(1)
//! existence and score lookups.
//!
//! The index is single-writer by construction (`upsert` takes `&mut self`);
//! callers that need concurrent access wrap it in a reader-writer lock.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod skiplist;

pub use skiplist::{OrderedIter, RankIndex, RankedEntry, UpsertOutcome, MAX_LEVEL};
