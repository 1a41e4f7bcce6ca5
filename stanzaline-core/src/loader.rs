//! Transcript loader that tries sources in priority order and builds the registry.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogEntry};
use crate::error::{CoreError, Result};
use crate::source::{TranscriptRequest, TranscriptResult, TranscriptSource};
use crate::track::{Track, TrackRegistry};

/// Loads transcripts for catalog entries and turns them into tracks
pub struct TranscriptLoader {
    sources: Vec<Box<dyn TranscriptSource>>,
}

impl TranscriptLoader {
    /// Create a new loader
    ///
    /// # Arguments
    /// * `sources` - Transcript sources to try in order
    #[must_use]
    pub fn new(sources: Vec<Box<dyn TranscriptSource>>) -> Self {
        Self { sources }
    }

    /// Names of the configured sources, in priority order
    #[must_use]
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Load a single catalog entry.
    ///
    /// # Errors
    ///
    /// Returns `TranscriptNotFound` if no source has the transcript. Source
    /// failures are logged and the next source is tried.
    pub async fn load_track(&self, entry: &CatalogEntry) -> Result<Track> {
        let request = TranscriptRequest::new(entry.id.clone(), entry.transcript_file());

        for source in &self.sources {
            debug!("Trying source {} for {}", source.name(), entry.id);
            match source.fetch(&request).await {
                Ok(TranscriptResult::Found(transcript)) => {
                    let track = Track::from_transcript(
                        entry.id.clone(),
                        entry.display_title(),
                        entry.bpm,
                        &transcript,
                    );
                    let quality = track.timing_quality();
                    if quality.is_degraded() {
                        warn!(
                            "Track {} has {} word timing, highlighting falls back to synthetic times",
                            entry.id, quality
                        );
                    }
                    info!(
                        "Loaded {} from {} ({} stanzas, {} words)",
                        entry.id,
                        source.name(),
                        track.stanza_index.len(),
                        track.word_map.len()
                    );
                    return Ok(track);
                }
                Ok(TranscriptResult::NotFound) => {
                    debug!("Source {} has no transcript for {}", source.name(), entry.id);
                }
                Err(e) => {
                    warn!("Source {} failed for {}: {}", source.name(), entry.id, e);
                }
            }
        }

        Err(CoreError::TranscriptNotFound {
            track_id: entry.id.to_string(),
        })
    }

    /// Load every catalog entry, skipping those whose transcript cannot be loaded
    pub async fn load_catalog(&self, catalog: &Catalog) -> TrackRegistry {
        info!(
            "Loading {} tracks (sources: {:?})",
            catalog.len(),
            self.source_names()
        );

        let mut registry = TrackRegistry::new();
        for entry in &catalog.tracks {
            match self.load_track(entry).await {
                Ok(track) => registry.insert(track),
                Err(e) => warn!("Skipping track {}: {}", entry.id, e),
            }
        }

        info!("Loaded {} of {} tracks", registry.len(), catalog.len());
        registry
    }

    /// Read a catalog file and load all of its tracks
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog itself cannot be read or parsed.
    pub async fn load_catalog_file(&self, path: &Path) -> Result<(Catalog, TrackRegistry)> {
        let catalog = Catalog::load(path).await?;
        let registry = self.load_catalog(&catalog).await;
        Ok((catalog, registry))
    }
}
