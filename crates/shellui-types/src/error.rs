//! Error types for ShellUI.
//!
//! User input never produces an error: unknown commands and argument
//! validation failures are reported as registry events. These errors cover
//! loading configuration and locale tables, and the host surfaces.

use std::io;

/// Errors produced by the ShellUI crates.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("config error: {0}")]
    Config(String),

    #[error("locale error: {0}")]
    Locale(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ShellError>;
