//! WAL (Write-Ahead Log) module
//!
//! - `config`: WAL configuration (WalConfig, WalConfigError)
//! - `writer`: group-commit appender (WalAppender)
//! - `reader`: tolerant replay reader (WalReplay)

pub mod config;
pub mod reader;
pub mod writer;

pub use config::{WalConfig, WalConfigError};
pub use reader::WalReplay;
pub use writer::WalAppender;
