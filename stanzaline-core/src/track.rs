//! Tracks and the registry that owns them.

use crate::playback::ClockReading;
use crate::resolve::{resolve_stanza, resolve_word, WordState};
use crate::stanza::{line_tokens, Stanza, StanzaIndex};
use crate::time::DurationExt;
use crate::transcript::RawTranscript;
use crate::word_map::{build_word_map, TimingQuality, WordMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Stable identifier of a track
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A track with its lyric timeline, ready for resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    /// Tempo, used only for animation timing
    pub bpm: f32,
    pub stanzas: Vec<Stanza>,
    pub word_map: WordMap,
    pub stanza_index: StanzaIndex,
}

/// One word of a rendered line with its resolved state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedWord<'a> {
    pub text: &'a str,
    pub global_index: usize,
    pub state: WordState,
}

impl Track {
    /// Build a track from a transcript document
    pub fn from_transcript(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        bpm: f32,
        transcript: &RawTranscript,
    ) -> Self {
        let built = build_word_map(transcript);
        Self::new(id, title, bpm, built.stanzas, built.word_map)
    }

    /// Build a track from stanzas and a word map, precomputing stanza boundaries
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        bpm: f32,
        stanzas: Vec<Stanza>,
        word_map: WordMap,
    ) -> Self {
        let stanza_index = StanzaIndex::new(&stanzas);
        Self {
            id: id.into(),
            title: title.into(),
            bpm,
            stanzas,
            word_map,
            stanza_index,
        }
    }

    #[must_use]
    pub fn timing_quality(&self) -> TimingQuality {
        self.word_map.timing_quality()
    }

    /// Time at which the last word window closes
    #[must_use]
    pub fn end_ms(&self) -> u64 {
        (0..self.word_map.len())
            .filter_map(|i| self.word_map.window(i))
            .map(|(_, end)| end)
            .max()
            .unwrap_or(0)
    }

    /// Whether a clock reading belongs to this track
    #[must_use]
    pub fn owns(&self, reading: &ClockReading) -> bool {
        reading.track_id.as_ref() == Some(&self.id)
    }

    /// Active stanza for a clock reading.
    ///
    /// Returns `None` when the clock belongs to a different track, so a stale
    /// reading from the previous track never highlights this one.
    #[must_use]
    pub fn active_stanza(&self, reading: &ClockReading) -> Option<usize> {
        if !self.owns(reading) {
            return None;
        }
        self.active_stanza_at(reading.position.as_millis_u64())
    }

    /// Active stanza at a time on this track's own clock
    #[must_use]
    pub fn active_stanza_at(&self, current_ms: u64) -> Option<usize> {
        resolve_stanza(&self.stanza_index, &self.word_map, current_ms)
    }

    /// State of a word at a time on this track's own clock
    #[must_use]
    pub fn word_state_at(&self, global_index: usize, current_ms: u64) -> WordState {
        resolve_word(&self.word_map, global_index, current_ms)
    }

    /// Resolve every display word of a stanza, line by line.
    ///
    /// Global indices are assigned from the stanza's precomputed start so they
    /// line up with the word map even when lines carry more words than timing.
    #[must_use]
    pub fn render_stanza(&self, stanza: usize, current_ms: u64) -> Option<Vec<Vec<RenderedWord<'_>>>> {
        let lines = self.stanzas.get(stanza)?;
        let mut global_index = self.stanza_index.start_of(stanza)?;

        let rendered = lines
            .iter()
            .map(|line| {
                line_tokens(line)
                    .into_iter()
                    .map(|text| {
                        let word = RenderedWord {
                            text,
                            global_index,
                            state: self.word_state_at(global_index, current_ms),
                        };
                        global_index += 1;
                        word
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Some(rendered)
    }
}

/// Read-only collection of loaded tracks, kept in catalog order
#[derive(Debug, Clone, Default)]
pub struct TrackRegistry {
    order: Vec<TrackId>,
    tracks: HashMap<TrackId, Arc<Track>>,
}

impl TrackRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a track. Replacing keeps the original position.
    pub fn insert(&mut self, track: Track) {
        let id = track.id.clone();
        if self.tracks.insert(id.clone(), Arc::new(track)).is_none() {
            self.order.push(id);
        }
    }

    #[must_use]
    pub fn get(&self, id: &TrackId) -> Option<Arc<Track>> {
        self.tracks.get(id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: &TrackId) -> bool {
        self.tracks.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tracks in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Track>> {
        self.order.iter().filter_map(|id| self.tracks.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word_map::WordEntry;
    use std::time::Duration;

    fn sample_track(id: &str) -> Track {
        Track::new(
            id,
            "Sample",
            92.0,
            vec![
                vec!["a b".to_string()],
                vec!["c".to_string(), "d e f".to_string()],
            ],
            WordMap::new(vec![
                WordEntry::recorded("a", 1000),
                WordEntry::recorded("b", 1500),
                WordEntry::recorded("c", 3000),
                WordEntry::recorded("d", 3500),
            ]),
        )
    }

    fn reading(track: Option<&str>, ms: u64) -> ClockReading {
        ClockReading {
            track_id: track.map(TrackId::from),
            position: Duration::from_millis(ms),
            is_playing: true,
        }
    }

    #[test]
    fn test_active_stanza_for_own_clock() {
        let track = sample_track("t1");
        assert_eq!(track.active_stanza(&reading(Some("t1"), 500)), None);
        assert_eq!(track.active_stanza(&reading(Some("t1"), 1200)), Some(0));
        assert_eq!(track.active_stanza(&reading(Some("t1"), 3000)), Some(1));
    }

    #[test]
    fn test_foreign_clock_has_no_active_stanza() {
        let track = sample_track("t1");
        assert_eq!(track.active_stanza(&reading(Some("t2"), 1200)), None);
        assert_eq!(track.active_stanza(&reading(None, 1200)), None);
    }

    #[test]
    fn test_render_stanza_marks_untimed_words_inert() {
        let track = sample_track("t1");
        let lines = track.render_stanza(1, 3600).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][0].text, "c");
        assert_eq!(lines[0][0].global_index, 2);
        assert!(lines[0][0].state.is_passed());
        assert!(lines[1][0].state.is_active());
        // "e" and "f" have no timing data
        assert_eq!(lines[1][1].state, WordState::Inert);
        assert_eq!(lines[1][2].global_index, 5);
        assert!(track.render_stanza(2, 0).is_none());
    }

    #[test]
    fn test_end_ms() {
        assert_eq!(sample_track("t1").end_ms(), 4100);
        let empty = Track::new("e", "", 0.0, vec![], WordMap::default());
        assert_eq!(empty.end_ms(), 0);
    }

    #[test]
    fn test_from_transcript() {
        let transcript = RawTranscript::parse(
            r#"{ "sections": [{ "lines": [{ "text": "hello world" }] }] }"#,
        )
        .unwrap();
        let track = Track::from_transcript("t", "Title", 120.0, &transcript);
        assert_eq!(track.word_map.len(), 2);
        assert_eq!(track.stanza_index.len(), 1);
        assert_eq!(track.timing_quality(), TimingQuality::Synthetic);
    }

    #[test]
    fn test_registry_order_and_replace() {
        let mut registry = TrackRegistry::new();
        registry.insert(sample_track("b"));
        registry.insert(sample_track("a"));
        let mut replacement = sample_track("b");
        replacement.title = "Replaced".to_string();
        registry.insert(replacement);

        let ids: Vec<_> = registry.iter().map(|t| t.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&TrackId::from("b")).unwrap().title, "Replaced");
        assert!(registry.get(&TrackId::from("missing")).is_none());
    }
}
