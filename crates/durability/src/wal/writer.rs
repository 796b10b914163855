//! Group-commit WAL appender.
//!
//! All appenders for a shard funnel into one commit queue. The first caller
//! to find no leader active becomes the leader: it takes the queued batch,
//! writes and fsyncs it outside the state lock, then wakes every waiter the
//! fsync covered. `append` returns only after the fsync covering its bytes
//! has succeeded, so an acknowledged record is always durable.
//!
//! # Failure handling
//!
//! A failed batch write rolls the file back to the last durable length
//! before reporting, so no torn record survives a retried append. Callers
//! in the failed batch get a retryable error; the caller must not apply the
//! update anywhere else.
//!
//! # Backpressure
//!
//! The commit queue is bounded by `batch_max_records`. Appends arriving
//! while it is full fail fast with a retryable error instead of queueing
//! unbounded memory.

use parking_lot::{Condvar, Mutex, MutexGuard};
use podium_core::{PodiumError, PodiumResult};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use crate::record::WalRecord;
use crate::wal::config::WalConfig;

/// Handle to a shard's write-ahead log. Cheap to clone.
#[derive(Clone)]
pub struct WalAppender {
    shared: Arc<Shared>,
}

struct Shared {
    path: PathBuf,
    config: WalConfig,
    /// The file is locked independently of `state` so the leader can write
    /// and fsync without holding the commit queue closed.
    file: Mutex<File>,
    state: Mutex<AppendState>,
    commit_done: Condvar,
}

struct AppendState {
    /// Encoded records awaiting the next group commit.
    pending: Vec<u8>,
    pending_records: usize,
    /// Sequence of the most recently enqueued record.
    next_seq: u64,
    /// Highest sequence covered by a successful fsync.
    durable_seq: u64,
    /// Byte length of the durable file prefix.
    durable_len: u64,
    leader_active: bool,
    /// Sequence ranges of batches that failed to commit. Never cleared:
    /// a straggling waiter from a failed batch must still find its range
    /// after later batches have moved `durable_seq` past it. Grows only
    /// on fsync failure, so it stays tiny.
    failed: Vec<FailedBatch>,
}

struct FailedBatch {
    /// Last sequence durable before the failed batch (exclusive bound).
    from_seq: u64,
    through_seq: u64,
    message: String,
}

impl FailedBatch {
    fn covers(&self, seq: u64) -> bool {
        seq > self.from_seq && seq <= self.through_seq
    }
}

impl WalAppender {
    /// Open (or create) the WAL file at `path`.
    ///
    /// A torn final line left by a crash is trimmed back to the last
    /// newline so post-restart appends can never glue onto a partial
    /// record. The parent directory entry is fsynced after creation.
    pub fn open(path: impl Into<PathBuf>, config: WalConfig) -> PodiumResult<Self> {
        let path = path.into();
        config
            .validate()
            .map_err(|e| PodiumError::internal(format!("invalid wal config: {}", e)))?;

        let existed = path.exists();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let durable_len = trim_torn_tail(&mut file, &path)?;
        file.seek(SeekFrom::End(0))?;

        if !existed {
            sync_parent_dir(&path);
        }

        Ok(WalAppender {
            shared: Arc::new(Shared {
                path,
                config,
                file: Mutex::new(file),
                state: Mutex::new(AppendState {
                    pending: Vec::new(),
                    pending_records: 0,
                    next_seq: 0,
                    durable_seq: 0,
                    durable_len,
                    leader_active: false,
                    failed: Vec::new(),
                }),
                commit_done: Condvar::new(),
            }),
        })
    }

    /// Path of the underlying WAL file.
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Append a record and return once it is durable.
    ///
    /// Blocks until the fsync covering this record's bytes has succeeded.
    /// Returns a retryable error if the commit queue is full or the
    /// covering batch failed to reach stable storage.
    pub fn append(&self, record: &WalRecord) -> PodiumResult<()> {
        let mut encoded = Vec::with_capacity(48);
        record.encode_into(&mut encoded);

        let mut state = self.shared.state.lock();
        if state.pending_records >= self.shared.config.batch_max_records {
            return Err(PodiumError::retryable("wal commit queue is full"));
        }
        state.next_seq += 1;
        let seq = state.next_seq;
        state.pending.extend_from_slice(&encoded);
        state.pending_records += 1;

        loop {
            // The failed-range check must precede the durable check: a later
            // successful batch advances durable_seq past a rolled-back one,
            // and a record in a failed range must never be acknowledged.
            if let Some(failed) = state.failed.iter().find(|f| f.covers(seq)) {
                return Err(PodiumError::retryable(format!(
                    "wal append failed: {}",
                    failed.message
                )));
            }
            if state.durable_seq >= seq {
                return Ok(());
            }

            if !state.leader_active {
                state.leader_active = true;
                let batch = std::mem::take(&mut state.pending);
                let batch_records = state.pending_records;
                state.pending_records = 0;
                let through_seq = state.next_seq;
                let from_seq = state.durable_seq;
                let durable_len = state.durable_len;

                let result = MutexGuard::unlocked(&mut state, || {
                    self.commit_batch(&batch, durable_len)
                });

                match result {
                    Ok(()) => {
                        state.durable_seq = through_seq;
                        state.durable_len = durable_len + batch.len() as u64;
                    }
                    Err(e) => {
                        error!(
                            target: "podium::wal",
                            path = %self.shared.path.display(),
                            records = batch_records,
                            error = %e,
                            "wal batch commit failed"
                        );
                        state.failed.push(FailedBatch {
                            from_seq,
                            through_seq,
                            message: e.to_string(),
                        });
                    }
                }
                state.leader_active = false;
                self.shared.commit_done.notify_all();
            } else {
                let timeout = Duration::from_millis(self.shared.config.commit_interval_ms);
                let _ = self.shared.commit_done.wait_for(&mut state, timeout);
            }
        }
    }

    /// Write and fsync one batch; roll back the file on failure.
    fn commit_batch(&self, batch: &[u8], durable_len: u64) -> std::io::Result<()> {
        let mut file = self.shared.file.lock();
        let result = file
            .seek(SeekFrom::End(0))
            .and_then(|_| file.write_all(batch))
            .and_then(|_| file.sync_data());
        if result.is_err() {
            // Restore the durable prefix so no torn record survives.
            if let Err(rollback) = file.set_len(durable_len).and_then(|_| file.sync_data()) {
                warn!(
                    target: "podium::wal",
                    path = %self.shared.path.display(),
                    error = %rollback,
                    "failed to roll wal back to durable length"
                );
                // Last resort: delimit the torn bytes so a later append
                // cannot form a parseable ghost record against them.
                let _ = file.write_all(b"\n");
            }
        }
        result
    }

    /// Truncate the log after its contents have been checkpointed.
    ///
    /// The caller must have quiesced writes (the shard holds its write gate
    /// exclusively); any straggling commit is waited out first.
    pub fn truncate(&self) -> PodiumResult<()> {
        let mut state = self.shared.state.lock();
        while state.leader_active || state.pending_records > 0 {
            let timeout = Duration::from_millis(self.shared.config.commit_interval_ms);
            let _ = self.shared.commit_done.wait_for(&mut state, timeout);
        }
        let mut file = self.shared.file.lock();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.sync_data()?;
        state.durable_len = 0;
        Ok(())
    }
}

impl std::fmt::Debug for WalAppender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("WalAppender")
            .field("path", &self.shared.path)
            .field("durable_seq", &state.durable_seq)
            .field("durable_len", &state.durable_len)
            .field("pending_records", &state.pending_records)
            .finish()
    }
}

/// Trim a crash-torn final line, returning the durable length.
///
/// The durable prefix of a WAL file always ends with a newline (or is
/// empty). Anything after the last newline is a partial record from an
/// interrupted write and must not remain, or the next append would glue
/// onto it and corrupt a future replay.
fn trim_torn_tail(file: &mut File, path: &Path) -> std::io::Result<u64> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(0);
    }

    file.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::with_capacity(len as usize);
    file.read_to_end(&mut buf)?;

    let valid_len = match buf.iter().rposition(|&b| b == b'\n') {
        Some(pos) => (pos + 1) as u64,
        None => 0,
    };
    if valid_len < len {
        warn!(
            target: "podium::wal",
            path = %path.display(),
            torn_bytes = len - valid_len,
            "trimming torn record from wal tail"
        );
        file.set_len(valid_len)?;
        file.sync_data()?;
    }
    Ok(valid_len)
}

/// Best-effort fsync of the parent directory entry after file creation.
fn sync_parent_dir(path: &Path) {
    if let Some(parent) = path.parent() {
        match File::open(parent).and_then(|dir| dir.sync_all()) {
            Ok(()) => {}
            Err(e) => warn!(
                target: "podium::wal",
                dir = %parent.display(),
                error = %e,
                "could not fsync wal parent directory"
            ),
        }
    }
}
