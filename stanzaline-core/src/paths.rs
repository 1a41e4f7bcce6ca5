//! Path constants for configuration, catalog and log files.

use std::path::{Path, PathBuf};

/// The name of the configuration directory under ~/.config/
pub const CONFIG_DIR_NAME: &str = "stanzaline";

/// The name of the main configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the track catalog inside the transcripts directory
pub const CATALOG_FILE_NAME: &str = "catalog.toml";

/// Default transcripts directory name under the config directory
pub const TRANSCRIPTS_DIR_NAME: &str = "transcripts";

/// The name of the log file written when file logging is enabled
pub const LOG_FILE_NAME: &str = "stanzaline.log";

/// Get the configuration directory path (~/.config/stanzaline/)
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(CONFIG_DIR_NAME)
}

/// Get the config file path (~/.config/stanzaline/config.toml)
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Default transcripts directory (`~/.config/stanzaline/transcripts/`)
#[must_use]
pub fn default_transcripts_dir() -> PathBuf {
    config_dir().join(TRANSCRIPTS_DIR_NAME)
}

/// Catalog path inside a transcripts directory
#[must_use]
pub fn catalog_path(transcripts_dir: &Path) -> PathBuf {
    transcripts_dir.join(CATALOG_FILE_NAME)
}

/// Get the log file path (`~/.config/stanzaline/stanzaline.log`)
#[must_use]
pub fn log_file_path() -> PathBuf {
    config_dir().join(LOG_FILE_NAME)
}
