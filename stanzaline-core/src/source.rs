use crate::error::{CoreError, Result};
use crate::track::TrackId;
use crate::transcript::RawTranscript;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What to fetch: the track and the transcript file named by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRequest {
    pub track_id: TrackId,
    /// Transcript file name, relative to the source's root
    pub file: String,
}

impl TranscriptRequest {
    pub fn new(track_id: impl Into<TrackId>, file: impl Into<String>) -> Self {
        Self {
            track_id: track_id.into(),
            file: file.into(),
        }
    }
}

/// Result from a transcript source
#[derive(Debug, Clone)]
pub enum TranscriptResult {
    /// Transcript document was found and parsed
    Found(RawTranscript),
    /// This source has no transcript for the request
    NotFound,
}

impl TranscriptResult {
    /// Check if a transcript was found
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    #[must_use]
    pub fn into_transcript(self) -> Option<RawTranscript> {
        match self {
            Self::Found(transcript) => Some(transcript),
            Self::NotFound => None,
        }
    }
}

/// Trait for transcript sources
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Fetch the transcript for a request
    async fn fetch(&self, request: &TranscriptRequest) -> Result<TranscriptResult>;
}

/// Reads transcript JSON files from a local directory
#[derive(Debug, Clone)]
pub struct FileTranscriptSource {
    root: PathBuf,
}

impl FileTranscriptSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, file: &str) -> Result<PathBuf> {
        let relative = Path::new(file);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(CoreError::TranscriptSourceFailed {
                source_name: self.name().to_string(),
                reason: format!("transcript path escapes the transcripts directory: {file}"),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl TranscriptSource for FileTranscriptSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self, request: &TranscriptRequest) -> Result<TranscriptResult> {
        let path = self.resolve(&request.file)?;
        debug!("Reading transcript for {} from {}", request.track_id, path.display());

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(TranscriptResult::NotFound);
            }
            Err(e) => return Err(e.into()),
        };

        let transcript = RawTranscript::parse(&content)?;
        Ok(TranscriptResult::Found(transcript))
    }
}
