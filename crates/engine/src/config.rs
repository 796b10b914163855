//! Engine configuration.
//!
//! Controls the data directory, score validation bounds, the top-K read
//! limit, and WAL tuning. Every knob has an environment override so a
//! deployment can configure the engine without code changes.

use podium_core::{PodiumError, PodiumResult};
use podium_durability::wal::WalConfig;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding `<game_id>.wal` and `<game_id>.checkpoint` files.
    pub data_dir: PathBuf,
    /// Inclusive lower bound on accepted scores.
    pub score_min: i64,
    /// Inclusive upper bound on accepted scores.
    pub score_max: i64,
    /// Largest `k` a top-K read may request.
    pub max_top_k: usize,
    /// WAL group-commit tuning.
    pub wal: WalConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            data_dir: PathBuf::from("./data"),
            score_min: 0,
            score_max: i64::MAX,
            max_top_k: 1000,
            wal: WalConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data directory (builder pattern).
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the accepted score range (builder pattern).
    pub fn with_score_bounds(mut self, min: i64, max: i64) -> Self {
        self.score_min = min;
        self.score_max = max;
        self
    }

    /// Set the top-K read limit (builder pattern).
    pub fn with_max_top_k(mut self, max_top_k: usize) -> Self {
        self.max_top_k = max_top_k;
        self
    }

    /// Set the WAL configuration (builder pattern).
    pub fn with_wal_config(mut self, wal: WalConfig) -> Self {
        self.wal = wal;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> PodiumResult<()> {
        if self.score_min > self.score_max {
            return Err(PodiumError::invalid_input(format!(
                "score_min {} exceeds score_max {}",
                self.score_min, self.score_max
            )));
        }
        if self.max_top_k == 0 {
            return Err(PodiumError::invalid_input("max_top_k must be at least 1"));
        }
        self.wal
            .validate()
            .map_err(|e| PodiumError::invalid_input(e.to_string()))?;
        Ok(())
    }

    /// Configuration for tests: given data directory, small WAL batches.
    pub fn for_testing(data_dir: impl Into<PathBuf>) -> Self {
        EngineConfig {
            data_dir: data_dir.into(),
            wal: WalConfig::for_testing(),
            ..Default::default()
        }
    }

    /// Build a configuration from the environment.
    ///
    /// Recognized variables: `PODIUM_DATA_DIR`, `PODIUM_SCORE_MIN`,
    /// `PODIUM_SCORE_MAX`, `PODIUM_MAX_TOP_K`,
    /// `PODIUM_WAL_BATCH_MAX_RECORDS`, `PODIUM_WAL_COMMIT_INTERVAL_MS`.
    /// Unset variables keep their defaults; malformed values are rejected.
    pub fn from_env() -> PodiumResult<Self> {
        let mut config = EngineConfig::default();
        if let Some(dir) = std::env::var_os("PODIUM_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(min) = env_parse::<i64>("PODIUM_SCORE_MIN")? {
            config.score_min = min;
        }
        if let Some(max) = env_parse::<i64>("PODIUM_SCORE_MAX")? {
            config.score_max = max;
        }
        if let Some(k) = env_parse::<usize>("PODIUM_MAX_TOP_K")? {
            config.max_top_k = k;
        }
        if let Some(records) = env_parse::<usize>("PODIUM_WAL_BATCH_MAX_RECORDS")? {
            config.wal.batch_max_records = records;
        }
        if let Some(ms) = env_parse::<u64>("PODIUM_WAL_COMMIT_INTERVAL_MS")? {
            config.wal.commit_interval_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }

    /// WAL file path for a game.
    pub fn wal_path(&self, game_id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.wal", game_id))
    }

    /// Checkpoint file path for a game.
    pub fn checkpoint_path(&self, game_id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.checkpoint", game_id))
    }

    /// The configured data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn env_parse<T: FromStr>(name: &str) -> PodiumResult<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value.parse::<T>().map(Some).map_err(|_| {
            PodiumError::invalid_input(format!("{} has an unparseable value '{}'", name, value))
        }),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(PodiumError::invalid_input(format!(
            "{} is not valid unicode",
            name
        ))),
    }
}
