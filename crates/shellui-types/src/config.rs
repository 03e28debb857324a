//! Shell configuration loaded from TOML.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, ShellError};

/// Top-level shell configuration (`shellui.toml`).
///
/// Every key is optional; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt prefix shown before the input line.
    pub prompt: String,
    /// Highlight color for the selected character (views only).
    pub highlight_color: String,
    /// Register the built-in `help` command.
    pub help_enabled: bool,
    /// Register the built-in `setLang` command.
    pub set_lang_enabled: bool,
    /// Requested locale code.
    pub language: String,
    /// Locale consulted when the requested one lacks a message.
    pub fallback_language: String,
    /// Cancel a running command after this many milliseconds.
    pub command_timeout_ms: Option<u64>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "$".to_string(),
            highlight_color: "#a5a5a5".to_string(),
            help_enabled: true,
            set_lang_enabled: true,
            language: "en".to_string(),
            fallback_language: "en".to_string(),
            command_timeout_ms: None,
        }
    }
}

impl ShellConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no terminal can start with.
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(ShellError::Config("language must not be empty".into()));
        }
        if self.fallback_language.trim().is_empty() {
            return Err(ShellError::Config("fallback_language must not be empty".into()));
        }
        if self.command_timeout_ms == Some(0) {
            return Err(ShellError::Config("command_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// `highlight_color` as RGB, if it is a `#rrggbb` or `#rgb` hex color.
    pub fn highlight_rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.highlight_color.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some((short(0)?, short(1)?, short(2)?))
            },
            _ => None,
        }
    }

    /// The command timeout, if one is configured.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_ms.map(Duration::from_millis)
    }
}
