pub mod catalog;
pub mod clock;
pub mod config;
pub mod cursor;
pub mod error;
pub mod loader;
pub mod paths;
pub mod playback;
pub mod resolve;
pub mod source;
pub mod stanza;
pub mod sync;
pub mod time;
pub mod track;
pub mod transcript;
pub mod word_map;

pub use catalog::{Catalog, CatalogEntry};
pub use clock::SimulatedClock;
pub use config::{
    LoggingConfig, PlaybackConfig, StanzalineConfig, TranscriptSourceType, TranscriptsConfig,
    WatchConfig, CONFIG_TEMPLATE,
};

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
pub use cursor::{CursorUpdate, LyricCursor, TimelinePosition};
pub use error::{CoreError, Result};
pub use loader::TranscriptLoader;
pub use paths::{
    catalog_path, config_dir, config_path, default_transcripts_dir, log_file_path,
    CATALOG_FILE_NAME, CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME,
};
pub use playback::{ClockReading, PlaybackState};
pub use resolve::{active_word, resolve_stanza, resolve_word, WordState};
pub use source::{FileTranscriptSource, TranscriptRequest, TranscriptResult, TranscriptSource};
pub use stanza::{Stanza, StanzaIndex};
pub use sync::{SyncEngine, SyncEvent};
pub use time::DurationExt;
pub use track::{RenderedWord, Track, TrackId, TrackRegistry};
pub use transcript::{RawLine, RawSection, RawTranscript, RawWordTiming};
pub use word_map::{build_word_map, BuiltLyrics, TimingQuality, TimingSource, WordEntry, WordMap};
