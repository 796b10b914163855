//! Crash-recovery equivalence through the public engine API.
//!
//! The engine is opened, loaded with traffic, dropped (simulating a hard
//! kill after all acks), and reopened; every query API must answer exactly
//! as it did before the crash.

use podium::{Engine, EngineConfig, ScoreEntry, WalRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tempfile::TempDir;

fn open_engine(dir: &TempDir) -> Engine {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Engine::open(EngineConfig::for_testing(dir.path())).unwrap()
}

#[test]
fn test_thousand_users_with_overwrites_survive_crash() {
    let dir = TempDir::new().unwrap();
    let mut rng = StdRng::seed_from_u64(2024);
    let mut expected: HashMap<String, i64> = HashMap::new();

    {
        let engine = open_engine(&dir);
        let shard = engine.shard("arena").unwrap();

        // 1,000 distinct users with random scores.
        for i in 0..1000 {
            let user = format!("user{:04}", i);
            let score = rng.gen_range(0..1_000_000);
            shard
                .update_score(&ScoreEntry::new(&user, "arena", score))
                .unwrap();
            expected.insert(user, score);
        }
        // 1,000 overwrite updates against random existing users.
        for _ in 0..1000 {
            let user = format!("user{:04}", rng.gen_range(0..1000));
            let score = rng.gen_range(0..1_000_000);
            shard
                .update_score(&ScoreEntry::new(&user, "arena", score))
                .unwrap();
            expected.insert(user, score);
        }
    }

    let engine = open_engine(&dir);
    let shard = engine.shard("arena").unwrap();

    assert_eq!(shard.user_count(), 1000);
    for (user, score) in &expected {
        assert_eq!(shard.score_of(user).unwrap(), Some(*score), "user {}", user);
    }

    // Full board is identically ordered and densely ranked.
    let rows = shard.top_k(1000).unwrap();
    assert_eq!(rows.len(), 1000);
    for (pos, row) in rows.iter().enumerate() {
        assert_eq!(row.rank, pos as u64 + 1);
        assert_eq!(shard.rank_of(&row.user_id).unwrap(), Some(row.rank));
        assert_eq!(expected[&row.user_id], row.score);
    }
}

#[test]
fn test_recovery_is_idempotent() {
    let dir = TempDir::new().unwrap();
    {
        let engine = open_engine(&dir);
        let shard = engine.shard("arena").unwrap();
        for i in 0..100i64 {
            shard
                .update_score(&ScoreEntry::new(&format!("u{}", i), "arena", i % 13))
                .unwrap();
        }
    }

    let first = {
        let engine = open_engine(&dir);
        engine.shard("arena").unwrap().top_k(100).unwrap()
    };
    let second = {
        let engine = open_engine(&dir);
        engine.shard("arena").unwrap().top_k(100).unwrap()
    };
    assert_eq!(first, second);
}

#[test]
fn test_every_acknowledged_write_is_in_the_wal() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir);
    let shard = engine.shard("arena").unwrap();

    let mut acked: Vec<(String, i64)> = Vec::new();
    for i in 0..50i64 {
        let user = format!("u{}", i);
        shard
            .update_score(&ScoreEntry::new(&user, "arena", i))
            .unwrap();
        acked.push((user, i));
    }

    // Observable index state implies a durable WAL record: every ack is
    // already on disk with identical (user_id, score).
    let wal = std::fs::read_to_string(shard.wal_path()).unwrap();
    let records: Vec<WalRecord> = wal.lines().map(|l| WalRecord::parse(l).unwrap()).collect();
    assert_eq!(records.len(), acked.len());
    for ((user, score), record) in acked.iter().zip(&records) {
        assert_eq!(&record.user_id, user);
        assert_eq!(record.score, *score);
    }
}

#[test]
fn test_wal_round_trip_preserves_ctime() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir);
    let shard = engine.shard("arena").unwrap();

    let entry = ScoreEntry::new("alice", "arena", 77);
    shard.update_score(&entry).unwrap();

    let wal = std::fs::read_to_string(shard.wal_path()).unwrap();
    let record = WalRecord::parse(wal.lines().next().unwrap()).unwrap();
    assert_eq!(record.user_id, entry.user_id);
    assert_eq!(record.score, entry.score);
    assert_eq!(record.ctime, entry.ctime);
}

#[test]
fn test_checkpoint_then_crash_recovers_identically() {
    let dir = TempDir::new().unwrap();
    let before = {
        let engine = open_engine(&dir);
        let shard = engine.shard("arena").unwrap();
        for i in 0..300i64 {
            shard
                .update_score(&ScoreEntry::new(&format!("u{:03}", i), "arena", i * 7 % 97))
                .unwrap();
        }
        shard.checkpoint().unwrap();
        for i in 0..50i64 {
            shard
                .update_score(&ScoreEntry::new(&format!("u{:03}", i), "arena", 1000 + i))
                .unwrap();
        }
        shard.top_k(300).unwrap()
    };

    let engine = open_engine(&dir);
    let shard = engine.shard("arena").unwrap();
    let after = shard.top_k(300).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_empty_engine_reopens_cleanly() {
    let dir = TempDir::new().unwrap();
    {
        let engine = open_engine(&dir);
        engine.shard("arena").unwrap();
    }
    let engine = open_engine(&dir);
    let shard = engine.shard("arena").unwrap();
    assert_eq!(shard.user_count(), 0);
    assert!(shard.top_k(10).unwrap().is_empty());
}
