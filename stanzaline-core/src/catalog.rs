//! The track catalog: which tracks exist and where their transcripts live.
//!
//! ```toml
//! [[tracks]]
//! id = "night-drive"
//! title = "Night Drive"
//! bpm = 96
//! transcript = "night-drive.json"
//! ```

use crate::error::{CoreError, Result};
use crate::track::TrackId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub tracks: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: TrackId,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_bpm")]
    pub bpm: f32,
    /// Transcript file; defaults to `<id>.json`
    #[serde(default)]
    pub transcript: Option<String>,
}

const fn default_bpm() -> f32 {
    120.0
}

impl CatalogEntry {
    /// Transcript file name for this entry
    #[must_use]
    pub fn transcript_file(&self) -> String {
        self.transcript
            .clone()
            .unwrap_or_else(|| format!("{}.json", self.id))
    }

    /// Display title, falling back to the id
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            self.id.as_str()
        } else {
            &self.title
        }
    }
}

impl Catalog {
    /// Read and validate a catalog file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or lists a track twice.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content).map_err(|e| match e {
            CoreError::ConfigParseError(e) => CoreError::CatalogInvalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
            CoreError::CatalogInvalid { message, .. } => CoreError::CatalogInvalid {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parse catalog text
    ///
    /// # Errors
    ///
    /// Returns an error on invalid TOML, empty ids or duplicate ids.
    pub fn parse(content: &str) -> Result<Self> {
        let catalog: Self = toml::from_str(content)?;

        let mut seen = HashSet::new();
        for entry in &catalog.tracks {
            if entry.id.as_str().trim().is_empty() {
                return Err(CoreError::CatalogInvalid {
                    path: PathBuf::new(),
                    message: "track id must not be empty".into(),
                });
            }
            if !seen.insert(&entry.id) {
                return Err(CoreError::CatalogInvalid {
                    path: PathBuf::new(),
                    message: format!("duplicate track id: {}", entry.id),
                });
            }
        }

        Ok(catalog)
    }

    #[must_use]
    pub fn get(&self, id: &TrackId) -> Option<&CatalogEntry> {
        self.tracks.iter().find(|entry| &entry.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
