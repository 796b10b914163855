//! WAL configuration.

/// WAL configuration parameters.
#[derive(Debug, Clone)]
pub struct WalConfig {
    /// Maximum records the commit queue may hold (default: 512).
    ///
    /// Appends arriving while the queue is full are rejected with a
    /// retryable backpressure error instead of growing memory unboundedly.
    pub batch_max_records: usize,

    /// Upper bound on group-commit latency in milliseconds (default: 10).
    ///
    /// Waiters re-check commit progress at this interval; a batch normally
    /// completes as soon as its leader's fsync returns.
    pub commit_interval_ms: u64,
}

impl Default for WalConfig {
    fn default() -> Self {
        WalConfig {
            batch_max_records: 512,
            commit_interval_ms: 10,
        }
    }
}

impl WalConfig {
    /// Create a new WAL configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the commit-queue bound (builder pattern).
    pub fn with_batch_max_records(mut self, records: usize) -> Self {
        self.batch_max_records = records;
        self
    }

    /// Set the commit-latency bound (builder pattern).
    pub fn with_commit_interval_ms(mut self, ms: u64) -> Self {
        self.commit_interval_ms = ms;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), WalConfigError> {
        if self.batch_max_records == 0 {
            return Err(WalConfigError::BatchBoundZero);
        }
        if self.commit_interval_ms == 0 {
            return Err(WalConfigError::CommitIntervalZero);
        }
        Ok(())
    }

    /// Configuration for tests: tiny batches, short waits.
    pub fn for_testing() -> Self {
        WalConfig {
            batch_max_records: 8,
            commit_interval_ms: 5,
        }
    }
}

/// WAL configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalConfigError {
    /// The commit queue must admit at least one record.
    #[error("batch_max_records must be at least 1")]
    BatchBoundZero,

    /// The commit interval must be non-zero.
    #[error("commit_interval_ms must be at least 1")]
    CommitIntervalZero,
}
