//! Common paths for Serenity data storage
//!
//! All Serenity data is stored under ~/.config/serenity/ on all platforms:
//! - config.toml - User configuration
//! - session.enc - Encrypted bearer token
//! - serenity.log - Log output while the TUI owns the terminal

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the Serenity data directory (~/.config/serenity/)
pub fn serenity_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let dir = home.join(".config").join("serenity");
    fs::create_dir_all(&dir).context("Failed to create serenity directory")?;
    Ok(dir)
}

/// Get the config file path (~/.config/serenity/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(serenity_dir()?.join("config.toml"))
}

/// Get the session file path (~/.config/serenity/session.enc)
pub fn session_path() -> Result<PathBuf> {
    Ok(serenity_dir()?.join("session.enc"))
}

/// Get the log file path (~/.config/serenity/serenity.log)
pub fn log_path() -> Result<PathBuf> {
    Ok(serenity_dir()?.join("serenity.log"))
}
