//! Configuration loading and management

use std::path::PathBuf;

use anyhow::{bail, Result};

/// Speech command used when none is configured
pub const DEFAULT_SPEECH_COMMAND: &str = "espeak";

/// Daemon configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// JSON file backing the durable key/value store
    pub store_path: PathBuf,

    /// Text-to-speech program spawned for Speak
    pub speech_command: String,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_vars(
            std::env::var("HOME").ok(),
            std::env::var("SWITCH_SCAN_DATA_DIR").ok(),
            std::env::var("SWITCH_SCAN_SPEECH_CMD").ok(),
        )
    }

    /// Build from already-read variable values
    pub fn from_vars(
        home: Option<String>,
        data_dir: Option<String>,
        speech_command: Option<String>,
    ) -> Result<Self> {
        let data_dir = match (data_dir.filter(|d| !d.is_empty()), home) {
            (Some(dir), _) => PathBuf::from(dir),
            (None, Some(home)) => PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("switch-scan"),
            (None, None) => bail!("neither SWITCH_SCAN_DATA_DIR nor HOME is set"),
        };

        let store_path = data_dir.join("store.json");
        let speech_command = speech_command
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_SPEECH_COMMAND.to_string());

        Ok(Self {
            data_dir,
            store_path,
            speech_command,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}
