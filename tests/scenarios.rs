//! End-to-end query semantics through the public engine API.

use podium::{Engine, EngineConfig, ScoreEntry};
use tempfile::TempDir;

fn open_engine(dir: &TempDir) -> Engine {
    Engine::open(EngineConfig::for_testing(dir.path())).unwrap()
}

fn entry(user: &str, game: &str, score: i64) -> ScoreEntry {
    ScoreEntry::new(user, game, score)
}

#[test]
fn test_empty_shard() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir);
    let shard = engine.shard("empty").unwrap();

    assert!(shard.top_k(10).unwrap().is_empty());
    assert_eq!(shard.rank_of("u1").unwrap(), None);
    assert_eq!(shard.score_of("u1").unwrap(), None);
}

#[test]
fn test_three_users_with_tie() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir);
    let shard = engine.shard("game").unwrap();

    shard.update_score(&entry("u1", "game", 10)).unwrap();
    shard.update_score(&entry("u2", "game", 20)).unwrap();
    shard.update_score(&entry("u3", "game", 20)).unwrap();

    let rows = shard.top_k(3).unwrap();
    let got: Vec<(&str, i64, u64)> = rows
        .iter()
        .map(|r| (r.user_id.as_str(), r.score, r.rank))
        .collect();
    assert_eq!(got, vec![("u2", 20, 1), ("u3", 20, 2), ("u1", 10, 3)]);
    assert_eq!(shard.rank_of("u3").unwrap(), Some(2));
}

#[test]
fn test_overwrite_repositions() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir);
    let shard = engine.shard("game").unwrap();

    shard.update_score(&entry("u1", "game", 10)).unwrap();
    shard.update_score(&entry("u2", "game", 20)).unwrap();
    shard.update_score(&entry("u3", "game", 20)).unwrap();
    shard.update_score(&entry("u1", "game", 25)).unwrap();

    let rows = shard.top_k(3).unwrap();
    let got: Vec<(&str, i64, u64)> = rows
        .iter()
        .map(|r| (r.user_id.as_str(), r.score, r.rank))
        .collect();
    assert_eq!(got, vec![("u1", 25, 1), ("u2", 20, 2), ("u3", 20, 3)]);
    assert_eq!(shard.score_of("u1").unwrap(), Some(25));
    assert_eq!(shard.user_count(), 3);
}

#[test]
fn test_tie_break_is_stable_across_insertion_order() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir);
    let shard = engine.shard("game").unwrap();

    shard.update_score(&entry("b", "game", 5)).unwrap();
    shard.update_score(&entry("a", "game", 5)).unwrap();

    let rows = shard.top_k(2).unwrap();
    assert_eq!(rows[0].user_id, "a");
    assert_eq!(rows[0].rank, 1);
    assert_eq!(rows[1].user_id, "b");
    assert_eq!(rows[1].rank, 2);

    // Stable across repeated reads while no writes intervene.
    let again = shard.top_k(2).unwrap();
    assert_eq!(rows, again);
}

#[test]
fn test_rank_agrees_with_full_ordering() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir);
    let shard = engine.shard("game").unwrap();

    for i in 0..200i64 {
        shard
            .update_score(&entry(&format!("user{:03}", i), "game", (i * 37) % 101))
            .unwrap();
    }

    let rows = shard.top_k(shard.user_count()).unwrap();
    assert_eq!(rows.len(), 200);
    for (pos, row) in rows.iter().enumerate() {
        assert_eq!(row.rank, pos as u64 + 1);
        assert_eq!(shard.rank_of(&row.user_id).unwrap(), Some(pos as u64 + 1));
        assert_eq!(shard.score_of(&row.user_id).unwrap(), Some(row.score));
        if pos > 0 {
            let prev = &rows[pos - 1];
            assert!(
                prev.score > row.score
                    || (prev.score == row.score && prev.user_id < row.user_id),
                "ordering violated between rank {} and {}",
                prev.rank,
                row.rank
            );
        }
    }
}

#[test]
fn test_k_larger_than_population() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir);
    let shard = engine.shard("game").unwrap();

    shard.update_score(&entry("u1", "game", 1)).unwrap();
    assert_eq!(shard.top_k(1000).unwrap().len(), 1);
}

#[test]
fn test_rows_carry_game_id() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir);
    let shard = engine.shard("tetris").unwrap();
    shard.update_score(&entry("u1", "tetris", 10)).unwrap();

    let rows = shard.top_k(1).unwrap();
    assert_eq!(rows[0].game_id, "tetris");
}
