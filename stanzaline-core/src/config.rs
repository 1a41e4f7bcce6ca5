use crate::error::{CoreError, Result};
use crate::paths::{self, CONFIG_DIR_NAME, TRANSCRIPTS_DIR_NAME};
use const_format::concatcp;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StanzalineConfig {
    #[serde(default)]
    pub transcripts: TranscriptsConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptsConfig {
    /// Directory holding `catalog.toml` and the transcript files.
    /// Empty means `~/.config/stanzaline/transcripts`.
    #[serde(default)]
    pub dir: String,
    /// Source priority: sources are tried in order
    #[serde(default = "default_sources")]
    pub sources: Vec<TranscriptSourceType>,
    /// Base URL for the remote source, e.g. `https://lyrics.example.com/transcripts/`
    #[serde(default)]
    pub remote_base_url: String,
}

fn default_sources() -> Vec<TranscriptSourceType> {
    vec![TranscriptSourceType::File]
}

impl Default for TranscriptsConfig {
    fn default() -> Self {
        Self {
            dir: String::new(),
            sources: default_sources(),
            remote_base_url: String::new(),
        }
    }
}

impl TranscriptsConfig {
    /// Resolved transcripts directory
    #[must_use]
    pub fn dir(&self) -> PathBuf {
        if self.dir.trim().is_empty() {
            paths::default_transcripts_dir()
        } else {
            expand_home(&self.dir)
        }
    }

    /// Remote base URL, if one is configured
    #[must_use]
    pub fn remote_base_url(&self) -> Option<&str> {
        let url = self.remote_base_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSourceType {
    File,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// How often the simulated clock advances and re-resolves
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Position jump that counts as a seek
    #[serde(default = "default_seek_threshold")]
    pub seek_threshold_ms: u64,
}

const fn default_tick_interval() -> u64 {
    50
}

const fn default_seek_threshold() -> u64 {
    2000
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            seek_threshold_ms: default_seek_threshold(),
        }
    }
}

impl PlaybackConfig {
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[must_use]
    pub const fn seek_threshold(&self) -> Duration {
        Duration::from_millis(self.seek_threshold_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Reload the catalog and transcripts when they change on disk
    #[serde(default = "default_true")]
    pub enabled: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to `~/.config/stanzaline/stanzaline.log`
    #[serde(default)]
    pub enabled: bool,
}

/// Config template written on first run.
pub const CONFIG_TEMPLATE: &str = concatcp!(
    r#"# Stanzaline configuration

[transcripts]
# Directory containing catalog.toml and the transcript JSON files.
# Leave empty to use ~/.config/"#,
    CONFIG_DIR_NAME,
    "/",
    TRANSCRIPTS_DIR_NAME,
    r#"
dir = ""
# Sources are tried in order: "file", "http"
sources = ["file"]
# Base URL used by the "http" source
remote_base_url = ""

[playback]
tick_interval_ms = 50
seek_threshold_ms = 2000

[watch]
# Reload the catalog when it changes on disk
enabled = true

[logging]
# Also write logs to ~/.config/"#,
    CONFIG_DIR_NAME,
    r#"/stanzaline.log
enabled = false
"#
);

impl StanzalineConfig {
    /// Get the config file path (~/.config/stanzaline/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        paths::config_path()
    }

    /// Load config from file or create template on first run
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or was just created.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Same as [`Self::load_or_create`] for an explicit path
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or was just created.
    pub fn load_or_create_at(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            // Create config directory if it doesn't exist
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(config_path, CONFIG_TEMPLATE)?;

            return Err(CoreError::ConfigNotFound {
                path: config_path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(config_path)?;
        let config = Self::parse(&content)?;
        Ok(config)
    }

    /// Parse and validate config text
    ///
    /// # Errors
    ///
    /// Returns an error on invalid TOML or inconsistent settings.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.transcripts.sources.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "transcripts.sources must list at least one source".into(),
            });
        }
        if self.transcripts.sources.contains(&TranscriptSourceType::Http)
            && self.transcripts.remote_base_url().is_none()
        {
            return Err(CoreError::ConfigMissingField {
                field: "transcripts.remote_base_url".into(),
            });
        }
        if self.playback.tick_interval_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "playback.tick_interval_ms must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = StanzalineConfig::parse(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.transcripts.sources, vec![TranscriptSourceType::File]);
        assert_eq!(config.playback.tick_interval_ms, 50);
        assert_eq!(config.playback.seek_threshold(), Duration::from_secs(2));
        assert!(config.watch.enabled);
        assert!(!config.logging.enabled);
        assert!(config.transcripts.remote_base_url().is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = StanzalineConfig::parse("").unwrap();
        assert_eq!(config.transcripts.dir(), paths::default_transcripts_dir());
        assert_eq!(config.playback.tick_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_http_source_requires_base_url() {
        let err = StanzalineConfig::parse(
            r#"
[transcripts]
sources = ["http", "file"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::ConfigMissingField { ref field } if field == "transcripts.remote_base_url"));
    }

    #[test]
    fn test_rejects_empty_sources_and_zero_tick() {
        assert!(StanzalineConfig::parse("[transcripts]\nsources = []\n").is_err());
        assert!(StanzalineConfig::parse("[playback]\ntick_interval_ms = 0\n").is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let err = StanzalineConfig::parse("[playback\n").unwrap_err();
        assert!(matches!(err, CoreError::ConfigParseError(_)));
    }

    #[test]
    fn test_load_or_create_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(paths::CONFIG_FILE_NAME);

        let err = StanzalineConfig::load_or_create_at(&path).unwrap_err();
        assert!(matches!(err, CoreError::ConfigNotFound { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);

        // Second run loads the template
        let config = StanzalineConfig::load_or_create_at(&path).unwrap();
        assert!(config.watch.enabled);
    }

    #[test]
    fn test_explicit_dir() {
        let config = StanzalineConfig::parse("[transcripts]\ndir = \"/srv/lyrics\"\n").unwrap();
        assert_eq!(config.transcripts.dir(), PathBuf::from("/srv/lyrics"));
    }
}
