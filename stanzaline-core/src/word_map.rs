//! Flat, globally indexed word timeline for a track.

use crate::stanza::{line_tokens, Stanza};
use crate::time::secs_to_millis;
use crate::transcript::{RawLine, RawTranscript};
use serde::Serialize;

/// Spacing between synthetic timestamps when a line has no word timing
pub const SYNTHETIC_WORD_INTERVAL_MS: u64 = 500;

/// Active window of the last word in a track
pub const LAST_WORD_WINDOW_MS: u64 = 600;

/// Where a word's timestamp came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingSource {
    /// Taken from the transcript's word timing
    Recorded,
    /// Derived from the word's position in its line; not tied to the audio
    Synthetic,
}

/// Overall timing quality of a word map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingQuality {
    /// No words at all
    Empty,
    /// Every word has recorded timing
    Recorded,
    /// Some lines fell back to synthetic timing
    Partial,
    /// No recorded timing anywhere
    Synthetic,
}

impl TimingQuality {
    /// Whether any part of the timeline is not aligned to the audio
    #[must_use]
    pub const fn is_degraded(self) -> bool {
        matches!(self, Self::Partial | Self::Synthetic)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Recorded => "recorded",
            Self::Partial => "partial",
            Self::Synthetic => "synthetic",
        }
    }
}

impl std::fmt::Display for TimingQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One word and the playback time at which it becomes active
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordEntry {
    pub text: String,
    pub time_ms: u64,
    pub timing: TimingSource,
}

impl WordEntry {
    pub fn recorded(text: impl Into<String>, time_ms: u64) -> Self {
        Self {
            text: text.into(),
            time_ms,
            timing: TimingSource::Recorded,
        }
    }

    pub fn synthetic(text: impl Into<String>, time_ms: u64) -> Self {
        Self {
            text: text.into(),
            time_ms,
            timing: TimingSource::Synthetic,
        }
    }
}

/// Ordered word timeline spanning a whole track, independent of stanzas.
///
/// Word `i` is active over `[time_ms(i), time_ms(i + 1))`; the last word is
/// active for [`LAST_WORD_WINDOW_MS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WordMap {
    entries: Vec<WordEntry>,
}

impl WordMap {
    #[must_use]
    pub const fn new(entries: Vec<WordEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&WordEntry> {
        self.entries.get(index)
    }

    /// Start time of a word, if it exists
    #[must_use]
    pub fn time_ms(&self, index: usize) -> Option<u64> {
        self.entries.get(index).map(|w| w.time_ms)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WordEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    /// Half-open active window `[start, end)` of a word.
    ///
    /// The end is the next word's start, or `start + 600ms` for the last word.
    #[must_use]
    pub fn window(&self, index: usize) -> Option<(u64, u64)> {
        let start = self.time_ms(index)?;
        let end = self
            .time_ms(index + 1)
            .unwrap_or_else(|| start.saturating_add(LAST_WORD_WINDOW_MS));
        Some((start, end))
    }

    /// Summarize how much of the timeline is backed by recorded timing
    #[must_use]
    pub fn timing_quality(&self) -> TimingQuality {
        let synthetic = self
            .entries
            .iter()
            .filter(|w| w.timing == TimingSource::Synthetic)
            .count();

        match (self.entries.len(), synthetic) {
            (0, _) => TimingQuality::Empty,
            (_, 0) => TimingQuality::Recorded,
            (total, s) if s == total => TimingQuality::Synthetic,
            _ => TimingQuality::Partial,
        }
    }
}

impl<'a> IntoIterator for &'a WordMap {
    type Item = &'a WordEntry;
    type IntoIter = std::slice::Iter<'a, WordEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Stanzas and word timeline built from a transcript
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltLyrics {
    pub stanzas: Vec<Stanza>,
    pub word_map: WordMap,
}

/// Build the stanza list and flat word map from a transcript.
///
/// Lines with word timing contribute one recorded entry per timed word.
/// Lines without it contribute one synthetic entry per display token, spaced
/// [`SYNTHETIC_WORD_INTERVAL_MS`] apart starting at zero for each line.
/// Sections without lines produce no stanza.
#[must_use]
pub fn build_word_map(transcript: &RawTranscript) -> BuiltLyrics {
    let mut stanzas = Vec::with_capacity(transcript.sections.len());
    let mut entries = Vec::new();

    for section in &transcript.sections {
        if section.lines.is_empty() {
            continue;
        }

        let mut stanza = Vec::with_capacity(section.lines.len());
        for line in &section.lines {
            push_line_words(line, &mut entries);
            stanza.push(line.text.clone());
        }
        stanzas.push(stanza);
    }

    BuiltLyrics {
        stanzas,
        word_map: WordMap::new(entries),
    }
}

fn push_line_words(line: &RawLine, entries: &mut Vec<WordEntry>) {
    if let Some(ref words) = line.words {
        entries.extend(words.iter().map(|word| {
            // Timings were validated when the transcript was read
            let time_ms = secs_to_millis(word.start_secs).unwrap_or_default();
            WordEntry::recorded(word.text.clone(), time_ms)
        }));
        return;
    }

    let mut time_ms = 0;
    for token in line_tokens(&line.text) {
        entries.push(WordEntry::synthetic(token, time_ms));
        time_ms += SYNTHETIC_WORD_INTERVAL_MS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{RawSection, RawWordTiming};

    fn timed_line(text: &str, words: &[(&str, f64)]) -> RawLine {
        RawLine {
            text: text.to_string(),
            words: Some(
                words
                    .iter()
                    .map(|(t, s)| RawWordTiming {
                        text: (*t).to_string(),
                        start_secs: *s,
                    })
                    .collect(),
            ),
        }
    }

    fn transcript(sections: Vec<Vec<RawLine>>) -> RawTranscript {
        RawTranscript {
            sections: sections.into_iter().map(|lines| RawSection { lines }).collect(),
        }
    }

    #[test]
    fn test_synthetic_fallback() {
        let built = build_word_map(&transcript(vec![vec![RawLine::plain("hello world")]]));
        assert_eq!(
            built.word_map.entries(),
            &[
                WordEntry::synthetic("hello", 0),
                WordEntry::synthetic("world", 500)
            ]
        );
        assert_eq!(built.stanzas, vec![vec!["hello world".to_string()]]);
        assert_eq!(built.word_map.timing_quality(), TimingQuality::Synthetic);
    }

    #[test]
    fn test_synthetic_timing_restarts_per_line() {
        let built = build_word_map(&transcript(vec![vec![
            RawLine::plain("a b c"),
            RawLine::plain("d e"),
        ]]));
        let times: Vec<_> = built.word_map.iter().map(|w| w.time_ms).collect();
        assert_eq!(times, vec![0, 500, 1000, 0, 500]);
    }

    #[test]
    fn test_recorded_timing() {
        let built = build_word_map(&transcript(vec![vec![timed_line(
            "a b",
            &[("a", 1.0), ("b", 1.5)],
        )]]));
        assert_eq!(
            built.word_map.entries(),
            &[WordEntry::recorded("a", 1000), WordEntry::recorded("b", 1500)]
        );
        assert_eq!(built.word_map.timing_quality(), TimingQuality::Recorded);
    }

    #[test]
    fn test_mixed_timing_is_partial() {
        let built = build_word_map(&transcript(vec![
            vec![timed_line("a", &[("a", 1.0)])],
            vec![RawLine::plain("b c")],
        ]));
        assert_eq!(built.word_map.len(), 3);
        assert_eq!(built.word_map.timing_quality(), TimingQuality::Partial);
        assert!(built.word_map.timing_quality().is_degraded());
    }

    #[test]
    fn test_empty_sections_skipped() {
        let built = build_word_map(&transcript(vec![
            vec![],
            vec![RawLine::plain("only")],
            vec![],
        ]));
        assert_eq!(built.stanzas.len(), 1);
        assert_eq!(built.word_map.len(), 1);
    }

    #[test]
    fn test_blank_line_emits_one_synthetic_word() {
        let built = build_word_map(&transcript(vec![vec![
            RawLine::plain("a"),
            RawLine::plain(""),
            RawLine::plain("b"),
        ]]));
        let texts: Vec<_> = built.word_map.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "", "b"]);
    }

    #[test]
    fn test_timed_words_may_differ_from_text() {
        // Word timing covers fewer words than the display text
        let built = build_word_map(&transcript(vec![vec![timed_line(
            "one two three",
            &[("one", 2.0)],
        )]]));
        assert_eq!(built.word_map.len(), 1);
        assert_eq!(built.stanzas[0][0], "one two three");
    }

    #[test]
    fn test_window() {
        let map = WordMap::new(vec![
            WordEntry::recorded("a", 1000),
            WordEntry::recorded("b", 1500),
            WordEntry::recorded("c", 3000),
        ]);
        assert_eq!(map.window(0), Some((1000, 1500)));
        assert_eq!(map.window(1), Some((1500, 3000)));
        assert_eq!(map.window(2), Some((3000, 3600)));
        assert_eq!(map.window(3), None);
    }

    #[test]
    fn test_empty_map_quality() {
        assert_eq!(WordMap::default().timing_quality(), TimingQuality::Empty);
        assert!(!TimingQuality::Empty.is_degraded());
    }
}
