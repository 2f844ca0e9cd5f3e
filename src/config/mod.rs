pub mod settings;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// User settings persisted between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub last_directory: Option<PathBuf>,
    /// Files are listed next to folders when set; otherwise only folders.
    pub include_files: bool,
    pub min_size_bytes: u64,
    /// `0` means unlimited.
    pub max_depth: usize,
    pub language: String,
    pub click_delay_ms: u64,
    pub metadata_concurrency: usize,
    /// Where `backupItem` copies to. Unset until the user picks a folder.
    #[serde(default)]
    pub backup_directory: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        settings::load_config(None)
    }

    pub fn click_delay(&self) -> Duration {
        Duration::from_millis(self.click_delay_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_directory: None,
            include_files: false,
            min_size_bytes: 0,
            max_depth: 0,
            language: "en".to_string(),
            click_delay_ms: 250,
            metadata_concurrency: 16,
            backup_directory: None,
        }
    }
}
