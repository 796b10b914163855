//! Identifier validation and size caps
//!
//! `user_id` is opaque to the engine but ends up on the WAL wire, where
//! fields are TAB-delimited; `game_id` names a file on disk. Both are
//! therefore restricted at the boundary so the inner layers never need to
//! escape anything.

use crate::error::{PodiumError, PodiumResult};

/// Maximum `user_id` length in bytes
pub const MAX_USER_ID_BYTES: usize = 256;

/// Maximum `game_id` length in bytes
pub const MAX_GAME_ID_BYTES: usize = 128;

/// Validate a `user_id`
///
/// Must be non-empty, at most [`MAX_USER_ID_BYTES`], and free of ASCII
/// control characters. The control-character ban covers TAB, LF and CR,
/// which keeps the WAL's delimited record format unambiguous.
pub fn validate_user_id(user_id: &str) -> PodiumResult<()> {
    if user_id.is_empty() {
        return Err(PodiumError::invalid_input("user_id must not be empty"));
    }
    if user_id.len() > MAX_USER_ID_BYTES {
        return Err(PodiumError::invalid_input(format!(
            "user_id exceeds {} bytes",
            MAX_USER_ID_BYTES
        )));
    }
    if user_id.bytes().any(|b| b.is_ascii_control()) {
        return Err(PodiumError::invalid_input(
            "user_id must not contain control characters",
        ));
    }
    Ok(())
}

/// Validate a `game_id`
///
/// Must be non-empty, at most [`MAX_GAME_ID_BYTES`], composed of
/// `[A-Za-z0-9._-]`, and must not start with `.`. The charset keeps
/// `<game_id>.wal` a safe filename on every platform we run on.
pub fn validate_game_id(game_id: &str) -> PodiumResult<()> {
    if game_id.is_empty() {
        return Err(PodiumError::invalid_input("game_id must not be empty"));
    }
    if game_id.len() > MAX_GAME_ID_BYTES {
        return Err(PodiumError::invalid_input(format!(
            "game_id exceeds {} bytes",
            MAX_GAME_ID_BYTES
        )));
    }
    if game_id.starts_with('.') {
        return Err(PodiumError::invalid_input("game_id must not start with '.'"));
    }
    if !game_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-')
    {
        return Err(PodiumError::invalid_input(
            "game_id may only contain [A-Za-z0-9._-]",
        ));
    }
    Ok(())
}
