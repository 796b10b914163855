//! Shard recovery tests
//!
//! Verify that acknowledged writes survive crash + replay:
//! - WAL-only recovery, with and without overwrites
//! - Checkpoint + post-checkpoint WAL recovery
//! - Torn-tail tolerance

use podium_core::types::ScoreEntry;
use podium_engine::{Engine, EngineConfig};
use std::path::Path;
use tempfile::TempDir;

fn open_engine(path: &Path) -> Engine {
    Engine::open(EngineConfig::for_testing(path)).unwrap()
}

fn entry(user: &str, game: &str, score: i64) -> ScoreEntry {
    ScoreEntry::new(user, game, score)
}

#[test]
fn test_scores_survive_recovery() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = open_engine(temp_dir.path());
        let shard = engine.shard("alpha").unwrap();
        shard.update_score(&entry("u1", "alpha", 10)).unwrap();
        shard.update_score(&entry("u2", "alpha", 20)).unwrap();
        shard.update_score(&entry("u3", "alpha", 20)).unwrap();
        // Simulate crash: all acks given, process dies.
    }

    let engine = open_engine(temp_dir.path());
    let shard = engine.shard("alpha").unwrap();

    assert_eq!(shard.user_count(), 3);
    assert_eq!(shard.score_of("u1").unwrap(), Some(10));
    assert_eq!(shard.rank_of("u2").unwrap(), Some(1));
    assert_eq!(shard.rank_of("u3").unwrap(), Some(2));
    assert_eq!(shard.rank_of("u1").unwrap(), Some(3));

    // Writes keep working after recovery.
    shard.update_score(&entry("u4", "alpha", 5)).unwrap();
    assert_eq!(shard.rank_of("u4").unwrap(), Some(4));
}

#[test]
fn test_recovery_applies_last_write_per_user() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = open_engine(temp_dir.path());
        let shard = engine.shard("alpha").unwrap();
        for round in 0..5i64 {
            for user in 0..10 {
                shard
                    .update_score(&entry(&format!("u{}", user), "alpha", round * 100 + user))
                    .unwrap();
            }
        }
    }

    let engine = open_engine(temp_dir.path());
    let shard = engine.shard("alpha").unwrap();
    assert_eq!(shard.user_count(), 10);
    for user in 0..10i64 {
        assert_eq!(
            shard.score_of(&format!("u{}", user)).unwrap(),
            Some(400 + user)
        );
    }
}

#[test]
fn test_recovery_from_checkpoint_plus_wal() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = open_engine(temp_dir.path());
        let shard = engine.shard("alpha").unwrap();
        for user in 0..50i64 {
            shard
                .update_score(&entry(&format!("u{:02}", user), "alpha", user))
                .unwrap();
        }
        assert_eq!(shard.checkpoint().unwrap(), 50);

        // Post-checkpoint traffic lands only in the fresh WAL.
        shard.update_score(&entry("u00", "alpha", 999)).unwrap();
        shard.update_score(&entry("new", "alpha", 500)).unwrap();
    }

    let engine = open_engine(temp_dir.path());
    let shard = engine.shard("alpha").unwrap();

    assert_eq!(shard.user_count(), 51);
    assert_eq!(shard.score_of("u00").unwrap(), Some(999));
    assert_eq!(shard.score_of("new").unwrap(), Some(500));
    assert_eq!(shard.rank_of("u00").unwrap(), Some(1));
    assert_eq!(shard.rank_of("new").unwrap(), Some(2));
    assert_eq!(shard.score_of("u07").unwrap(), Some(7));
}

#[test]
fn test_recovery_tolerates_torn_wal_tail() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = open_engine(temp_dir.path());
        let shard = engine.shard("alpha").unwrap();
        shard.update_score(&entry("u1", "alpha", 10)).unwrap();
        shard.update_score(&entry("u2", "alpha", 20)).unwrap();
    }

    // Simulate a crash mid-append: a partial record with no newline.
    let wal_path = temp_dir.path().join("alpha.wal");
    let mut contents = std::fs::read(&wal_path).unwrap();
    contents.extend_from_slice(b"u3\t3");
    std::fs::write(&wal_path, contents).unwrap();

    let engine = open_engine(temp_dir.path());
    let shard = engine.shard("alpha").unwrap();

    // The unacknowledged torn record does not appear.
    assert_eq!(shard.user_count(), 2);
    assert_eq!(shard.score_of("u3").unwrap(), None);

    // New writes do not glue onto the torn fragment.
    shard.update_score(&entry("u4", "alpha", 40)).unwrap();
    let engine2 = {
        drop(engine);
        open_engine(temp_dir.path())
    };
    let shard = engine2.shard("alpha").unwrap();
    assert_eq!(shard.score_of("u4").unwrap(), Some(40));
    assert_eq!(shard.score_of("u3").unwrap(), None);
}

#[test]
fn test_shards_recover_independently() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = open_engine(temp_dir.path());
        engine.update_score(&entry("u1", "alpha", 1)).unwrap();
        engine.update_score(&entry("u1", "beta", 2)).unwrap();
    }

    let engine = open_engine(temp_dir.path());
    // Touch only one shard; the other's state stays on disk untouched.
    assert_eq!(
        engine.shard("alpha").unwrap().score_of("u1").unwrap(),
        Some(1)
    );
    assert_eq!(engine.shard_count(), 1);
    assert_eq!(
        engine.shard("beta").unwrap().score_of("u1").unwrap(),
        Some(2)
    );
    assert_eq!(engine.shard_count(), 2);
}
