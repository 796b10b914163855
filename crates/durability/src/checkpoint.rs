//! Compacted checkpoint files.
//!
//! A checkpoint is the current `user → score` map of a shard, written so
//! the WAL can be truncated and recovery can skip replaying overwritten
//! history.
//!
//! # File layout
//!
//! ```text
//! podium-checkpoint v1 <count> <crc32-hex>\n     header
//! <user_id>\t<score>\n                           one line per user
//! ```
//!
//! The CRC32 covers the body bytes (everything after the header line).
//!
//! # Crash safety
//!
//! Checkpoints are written with the write-fsync-rename pattern:
//! 1. Write to a temporary file in the same directory
//! 2. fsync the temporary file
//! 3. Atomic rename onto the final path
//! 4. fsync the parent directory
//!
//! Either the complete checkpoint is visible or the previous state is; a
//! partial checkpoint can never be observed. A checkpoint that fails its
//! integrity check on load is fatal corruption, not something to skip.

use podium_core::{PodiumError, PodiumResult};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Magic token opening every checkpoint header.
pub const CHECKPOINT_MAGIC: &str = "podium-checkpoint";

/// Current checkpoint format version token.
pub const CHECKPOINT_VERSION: &str = "v1";

/// Write a checkpoint atomically. Returns the number of users written.
pub fn write_checkpoint<'a, I>(path: &Path, entries: I) -> PodiumResult<usize>
where
    I: Iterator<Item = (&'a str, i64)>,
{
    let mut body = Vec::new();
    let mut count = 0usize;
    for (user_id, score) in entries {
        body.extend_from_slice(user_id.as_bytes());
        body.push(b'\t');
        body.extend_from_slice(score.to_string().as_bytes());
        body.push(b'\n');
        count += 1;
    }
    let crc = crc32fast::hash(&body);

    let file_name = path
        .file_name()
        .ok_or_else(|| PodiumError::internal("checkpoint path has no file name"))?
        .to_string_lossy();
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&temp_path)?;
    writeln!(
        file,
        "{} {} {} {:08x}",
        CHECKPOINT_MAGIC, CHECKPOINT_VERSION, count, crc
    )?;
    file.write_all(&body)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&temp_path, path)?;
    if let Some(parent) = path.parent() {
        match File::open(parent).and_then(|dir| dir.sync_all()) {
            Ok(()) => {}
            Err(e) => warn!(
                target: "podium::checkpoint",
                dir = %parent.display(),
                error = %e,
                "could not fsync checkpoint directory"
            ),
        }
    }
    Ok(count)
}

/// Load a checkpoint.
///
/// Returns `Ok(None)` when no checkpoint exists. A present checkpoint that
/// fails any integrity check (header shape, CRC, line format, count) is a
/// `Corruption` error; the shard must not come up from bad state.
pub fn load_checkpoint(path: &Path) -> PodiumResult<Option<Vec<(String, i64)>>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let (header, body) = match contents.split_once('\n') {
        Some(split) => split,
        None => {
            return Err(PodiumError::corruption(format!(
                "checkpoint {} has no header line",
                path.display()
            )))
        }
    };

    let mut tokens = header.split(' ');
    let magic = tokens.next().unwrap_or("");
    let version = tokens.next().unwrap_or("");
    if magic != CHECKPOINT_MAGIC || version != CHECKPOINT_VERSION {
        return Err(PodiumError::corruption(format!(
            "checkpoint {} has unrecognized header '{}'",
            path.display(),
            header
        )));
    }
    let count: usize = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| PodiumError::corruption("checkpoint header count is invalid"))?;
    let expected_crc: u32 = tokens
        .next()
        .and_then(|t| u32::from_str_radix(t, 16).ok())
        .ok_or_else(|| PodiumError::corruption("checkpoint header crc is invalid"))?;
    if tokens.next().is_some() {
        return Err(PodiumError::corruption(
            "checkpoint header has trailing tokens",
        ));
    }

    let actual_crc = crc32fast::hash(body.as_bytes());
    if actual_crc != expected_crc {
        return Err(PodiumError::corruption(format!(
            "checkpoint {} crc mismatch: expected {:08x}, got {:08x}",
            path.display(),
            expected_crc,
            actual_crc
        )));
    }

    let mut entries = Vec::with_capacity(count);
    for line in body.lines() {
        let (user_id, score) = line.split_once('\t').ok_or_else(|| {
            PodiumError::corruption(format!(
                "checkpoint {} has a malformed entry line",
                path.display()
            ))
        })?;
        let score: i64 = score.parse().map_err(|_| {
            PodiumError::corruption(format!(
                "checkpoint {} has a non-integer score",
                path.display()
            ))
        })?;
        entries.push((user_id.to_string(), score));
    }
    if entries.len() != count {
        return Err(PodiumError::corruption(format!(
            "checkpoint {} entry count mismatch: header says {}, found {}",
            path.display(),
            count,
            entries.len()
        )));
    }
    Ok(Some(entries))
}
