//! WAL replay reader.
//!
//! Replay is tolerant by design: a crash can leave a truncated final line,
//! so malformed lines are skipped with a warning rather than failing the
//! whole recovery. Only failing to open an existing file is an error; a
//! missing file is an empty log.

use podium_core::PodiumResult;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::PathBuf;
use tracing::warn;

use crate::record::WalRecord;

/// Lazy iterator over the records of one WAL file, in file order.
pub struct WalReplay {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    skipped_malformed: usize,
}

impl WalReplay {
    /// Open a WAL file for replay.
    ///
    /// A missing file yields an empty replay. Any other open failure is
    /// returned: recovery must not serve from a log it cannot read.
    pub fn open(path: impl Into<PathBuf>) -> PodiumResult<Self> {
        let path = path.into();
        let lines = match File::open(&path) {
            Ok(file) => Some(BufReader::new(file).lines()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(WalReplay {
            path,
            lines,
            skipped_malformed: 0,
        })
    }

    /// Number of malformed lines skipped so far.
    pub fn skipped_malformed(&self) -> usize {
        self.skipped_malformed
    }
}

impl Iterator for WalReplay {
    type Item = WalRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;
        loop {
            match lines.next() {
                None => return None,
                Some(Err(e)) => {
                    // Mid-file read failure: stop replaying rather than
                    // yield records past a hole.
                    warn!(
                        target: "podium::recovery",
                        path = %self.path.display(),
                        error = %e,
                        "wal read failed mid-replay"
                    );
                    self.lines = None;
                    return None;
                }
                Some(Ok(line)) => {
                    if line.is_empty() {
                        continue;
                    }
                    match WalRecord::parse(&line) {
                        Ok(record) => return Some(record),
                        Err(e) => {
                            warn!(
                                target: "podium::recovery",
                                path = %self.path.display(),
                                error = %e,
                                "skipping malformed wal record"
                            );
                            self.skipped_malformed += 1;
                        }
                    }
                }
            }
        }
    }
}
