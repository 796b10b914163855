//! WAL record format.
//!
//! Records are newline-delimited text lines:
//!
//! ```text
//! <user_id>\t<score>\t<ctime_epoch_millis>\n
//! ```
//!
//! `game_id` is implied by the filename and never serialized. TAB is a safe
//! delimiter because identifier validation rejects control characters, so
//! no escaping is needed on the wire.

use podium_core::types::ScoreEntry;
use thiserror::Error;

/// Field delimiter inside a record line.
pub const FIELD_DELIMITER: char = '\t';

/// A single WAL record: one accepted score update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalRecord {
    /// User identifier.
    pub user_id: String,
    /// Accepted score.
    pub score: i64,
    /// Acceptance timestamp, epoch milliseconds.
    pub ctime: i64,
}

impl WalRecord {
    /// Create a record.
    pub fn new(user_id: impl Into<String>, score: i64, ctime: i64) -> Self {
        WalRecord {
            user_id: user_id.into(),
            score,
            ctime,
        }
    }

    /// Build the WAL record for an accepted entry.
    pub fn from_entry(entry: &ScoreEntry) -> Self {
        WalRecord {
            user_id: entry.user_id.clone(),
            score: entry.score,
            ctime: entry.ctime,
        }
    }

    /// Append the encoded record line (including the trailing newline).
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.user_id.as_bytes());
        buf.push(b'\t');
        buf.extend_from_slice(self.score.to_string().as_bytes());
        buf.push(b'\t');
        buf.extend_from_slice(self.ctime.to_string().as_bytes());
        buf.push(b'\n');
    }

    /// Parse one line (without its newline).
    ///
    /// Strict: exactly three fields, integer score and ctime, non-empty
    /// user. Anything else is rejected so crash-truncated tails are skipped
    /// rather than misread.
    pub fn parse(line: &str) -> Result<WalRecord, RecordParseError> {
        let mut fields = line.split(FIELD_DELIMITER);
        let user_id = fields.next().unwrap_or("");
        if user_id.is_empty() {
            return Err(RecordParseError::EmptyUserId);
        }
        let score = fields
            .next()
            .ok_or(RecordParseError::MissingField("score"))?
            .parse::<i64>()
            .map_err(|_| RecordParseError::InvalidScore)?;
        let ctime = fields
            .next()
            .ok_or(RecordParseError::MissingField("ctime"))?
            .parse::<i64>()
            .map_err(|_| RecordParseError::InvalidTimestamp)?;
        if fields.next().is_some() {
            return Err(RecordParseError::TrailingFields);
        }
        Ok(WalRecord {
            user_id: user_id.to_string(),
            score,
            ctime,
        })
    }
}

/// Reasons a WAL line fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordParseError {
    /// A required field is absent.
    #[error("record is missing the {0} field")]
    MissingField(&'static str),
    /// The user_id field is empty.
    #[error("record has an empty user_id")]
    EmptyUserId,
    /// The score field is not a base-10 integer.
    #[error("record score is not a valid integer")]
    InvalidScore,
    /// The ctime field is not a base-10 integer.
    #[error("record ctime is not a valid integer")]
    InvalidTimestamp,
    /// More than three fields are present.
    #[error("record has trailing fields")]
    TrailingFields,
}
