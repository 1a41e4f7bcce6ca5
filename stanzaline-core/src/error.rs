use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - please review it and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Missing required config field: {field}")]
    ConfigMissingField { field: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Transcript errors
    #[error("Failed to parse transcript JSON: {0}")]
    TranscriptParseError(#[from] serde_json::Error),

    #[error("Transcript not found for track: {track_id}")]
    TranscriptNotFound { track_id: String },

    #[error("Transcript source {source_name} failed: {reason}")]
    TranscriptSourceFailed { source_name: String, reason: String },

    // Catalog and registry errors
    #[error("Invalid catalog {path}: {message}")]
    CatalogInvalid { path: PathBuf, message: String },

    #[error("Unknown track: {track_id}")]
    UnknownTrack { track_id: String },

    // Network errors
    #[error("Network request failed: {reason}")]
    NetworkError { reason: String },

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
