//! Text and JSON views of tracks for the terminal.

use serde::Serialize;
use stanzaline_core::{
    active_word, RenderedWord, TimingQuality, TimingSource, Track, WordState,
};
use std::fmt::Write;

/// Format one rendered line: the active word is bracketed, words still to
/// come are dimmed with a leading dot.
#[must_use]
pub fn format_line(words: &[RenderedWord<'_>]) -> String {
    words
        .iter()
        .map(|word| match word.state {
            WordState::Active { .. } => format!("[{}]", word.text),
            WordState::Pending => format!("·{}", word.text),
            WordState::Passed | WordState::Inert => word.text.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a stanza at a time, marking the line that holds the active word
#[must_use]
pub fn format_stanza(track: &Track, stanza: usize, current_ms: u64) -> Option<String> {
    let lines = track.render_stanza(stanza, current_ms)?;
    let mut out = String::new();
    for line in &lines {
        let marker = if line.iter().any(|w| w.state.is_active()) {
            '>'
        } else {
            ' '
        };
        let _ = writeln!(out, "{marker} {}", format_line(line));
    }
    Some(out)
}

/// Frame printed during playback when the active word changes: the clock
/// time followed by the whole stanza holding `word`
#[must_use]
pub fn format_frame(track: &Track, word: usize, current_ms: u64) -> Option<String> {
    let stanza = track.stanza_index.stanza_of(word)?;
    let body = format_stanza(track, stanza, current_ms)?;
    Some(format!("[{}]\n{body}", format_ms(current_ms)))
}

#[derive(Debug, Serialize)]
pub struct WordReport<'a> {
    pub index: usize,
    pub text: &'a str,
    pub time_ms: u64,
    pub timing: TimingSource,
}

#[derive(Debug, Serialize)]
pub struct StanzaReport<'a> {
    pub index: usize,
    pub start_word: usize,
    pub lines: &'a [String],
    pub words: Vec<WordReport<'a>>,
}

/// Full description of a track's timeline
#[derive(Debug, Serialize)]
pub struct InspectReport<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub bpm: f32,
    pub timing_quality: TimingQuality,
    pub word_count: usize,
    pub stanzas: Vec<StanzaReport<'a>>,
}

impl<'a> InspectReport<'a> {
    #[must_use]
    pub fn new(track: &'a Track) -> Self {
        let stanzas = track
            .stanza_index
            .ranges()
            .map(|(index, range)| StanzaReport {
                index,
                start_word: range.start,
                lines: &track.stanzas[index],
                words: range
                    .filter_map(|i| {
                        track.word_map.get(i).map(|entry| WordReport {
                            index: i,
                            text: &entry.text,
                            time_ms: entry.time_ms,
                            timing: entry.timing,
                        })
                    })
                    .collect(),
            })
            .collect();

        Self {
            id: track.id.as_str(),
            title: &track.title,
            bpm: track.bpm,
            timing_quality: track.timing_quality(),
            word_count: track.word_map.len(),
            stanzas,
        }
    }

    /// Human readable form
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} ({}) {} bpm, {} words, {} timing",
            self.title, self.id, self.bpm, self.word_count, self.timing_quality
        );

        for stanza in &self.stanzas {
            let _ = writeln!(out, "\nStanza {} (word {})", stanza.index, stanza.start_word);
            for line in stanza.lines {
                let _ = writeln!(out, "  {line}");
            }
            for word in &stanza.words {
                let marker = match word.timing {
                    TimingSource::Recorded => "",
                    TimingSource::Synthetic => " ~",
                };
                let _ = writeln!(
                    out,
                    "    {:>4} {:>9} {}{marker}",
                    word.index,
                    format_ms(word.time_ms),
                    word.text
                );
            }
        }
        out
    }
}

/// Resolution of a track at one point in time
#[derive(Debug, Serialize)]
pub struct AtReport<'a> {
    pub id: &'a str,
    pub time_ms: u64,
    pub stanza: Option<usize>,
    pub word: Option<usize>,
    pub lines: Vec<Vec<RenderedWord<'a>>>,
}

impl<'a> AtReport<'a> {
    #[must_use]
    pub fn new(track: &'a Track, time_ms: u64) -> Self {
        let stanza = track.active_stanza_at(time_ms);
        let lines = stanza
            .and_then(|s| track.render_stanza(s, time_ms))
            .unwrap_or_default();

        Self {
            id: track.id.as_str(),
            time_ms,
            stanza,
            word: active_word(&track.word_map, time_ms),
            lines,
        }
    }

    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} at {}", self.id, format_ms(self.time_ms));
        match self.stanza {
            Some(stanza) => {
                let _ = writeln!(out, "Stanza {stanza}");
                for line in &self.lines {
                    let _ = writeln!(out, "  {}", format_line(line));
                }
            }
            None => {
                let _ = writeln!(out, "No active stanza");
            }
        }
        out
    }
}

/// `m:ss.mmm`
#[must_use]
pub fn format_ms(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{minutes}:{seconds:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use stanzaline_core::{WordEntry, WordMap};

    fn track() -> Track {
        Track::new(
            "t1",
            "Sample",
            100.0,
            vec![vec!["a b".to_string()], vec!["c".to_string()]],
            WordMap::new(vec![
                WordEntry::recorded("a", 1000),
                WordEntry::recorded("b", 1500),
                WordEntry::synthetic("c", 3000),
            ]),
        )
    }

    #[test]
    fn test_format_ms() {
        assert_eq!(format_ms(0), "0:00.000");
        assert_eq!(format_ms(61_250), "1:01.250");
    }

    #[test]
    fn test_format_stanza_marks_active_word() {
        let rendered = format_stanza(&track(), 0, 1600).unwrap();
        assert_eq!(rendered, "> a [b]\n");

        let rendered = format_stanza(&track(), 0, 900).unwrap();
        assert_eq!(rendered, "  ·a ·b\n");
        assert!(format_stanza(&track(), 5, 0).is_none());
    }

    #[test]
    fn test_format_frame_shows_whole_stanza() {
        let track = Track::new(
            "t2",
            "Two lines",
            100.0,
            vec![vec!["a b".to_string(), "c".to_string()]],
            WordMap::new(vec![
                WordEntry::recorded("a", 1000),
                WordEntry::recorded("b", 1500),
                WordEntry::recorded("c", 2000),
            ]),
        );
        let frame = format_frame(&track, 2, 2100).unwrap();
        assert_eq!(frame, "[0:02.100]\n  a b\n> [c]\n");

        let frame = format_frame(&track, 0, 1000).unwrap();
        assert_eq!(frame, "[0:01.000]\n> [a] ·b\n  ·c\n");
        assert!(format_frame(&track, 3, 0).is_none());
    }

    #[test]
    fn test_inspect_report() {
        let track = track();
        let report = InspectReport::new(&track);
        assert_eq!(report.stanzas.len(), 2);
        assert_eq!(report.stanzas[1].start_word, 2);
        assert_eq!(report.timing_quality, TimingQuality::Partial);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stanzas"][1]["words"][0]["timing"], "synthetic");
        assert_eq!(json["stanzas"][0]["words"][1]["time_ms"], 1500);

        let text = report.to_text();
        assert!(text.contains("Stanza 1 (word 2)"));
        assert!(text.contains("c ~"));
    }

    #[test]
    fn test_at_report() {
        let track = track();
        let report = AtReport::new(&track, 1500);
        assert_eq!(report.stanza, Some(0));
        assert_eq!(report.word, Some(1));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["lines"][0][1]["state"]["state"], "active");

        let before = AtReport::new(&track, 10);
        assert_eq!(before.stanza, None);
        assert!(before.to_text().contains("No active stanza"));
    }
}
