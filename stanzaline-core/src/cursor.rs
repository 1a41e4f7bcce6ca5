//! Change tracking for the displayed track's active word and stanza.

use crate::playback::ClockReading;
use crate::resolve::active_word;
use crate::time::DurationExt;
use crate::track::Track;
use serde::Serialize;

/// Active word and stanza of the displayed track at one clock reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimelinePosition {
    pub stanza: Option<usize>,
    pub word: Option<usize>,
}

impl TimelinePosition {
    /// Resolve the position for a reading; nothing is active on a foreign clock
    #[must_use]
    pub fn resolve(track: &Track, reading: &ClockReading) -> Self {
        if !track.owns(reading) {
            return Self::default();
        }

        Self {
            stanza: track.active_stanza(reading),
            word: active_word(&track.word_map, reading.position.as_millis_u64()),
        }
    }
}

/// Result of observing one clock reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorUpdate {
    pub position: TimelinePosition,
    pub word_changed: bool,
    pub stanza_changed: bool,
    /// Stanza that should be scrolled into view, only set while playing
    pub scroll_to: Option<usize>,
}

/// Remembers the last resolved position so callers only react to changes.
#[derive(Debug, Clone, Default)]
pub struct LyricCursor {
    current: TimelinePosition,
}

impl LyricCursor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn position(&self) -> TimelinePosition {
        self.current
    }

    /// Forget the last position, e.g. when the displayed track changes
    pub fn reset(&mut self) {
        self.current = TimelinePosition::default();
    }

    /// Resolve a new reading and report what changed.
    ///
    /// A stanza that newly becomes active is only scrolled to while the
    /// transport is playing, so a paused reader keeps their scroll position.
    pub fn observe(&mut self, track: &Track, reading: &ClockReading) -> CursorUpdate {
        let position = TimelinePosition::resolve(track, reading);
        let word_changed = position.word != self.current.word;
        let stanza_changed = position.stanza != self.current.stanza;

        let scroll_to = if stanza_changed && reading.is_playing {
            position.stanza
        } else {
            None
        };

        self.current = position;

        CursorUpdate {
            position,
            word_changed,
            stanza_changed,
            scroll_to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackId;
    use crate::word_map::{WordEntry, WordMap};
    use std::time::Duration;

    fn track() -> Track {
        Track::new(
            "t1",
            "Sample",
            100.0,
            vec![vec!["a b".to_string()], vec!["c".to_string()]],
            WordMap::new(vec![
                WordEntry::recorded("a", 1000),
                WordEntry::recorded("b", 1500),
                WordEntry::recorded("c", 3000),
            ]),
        )
    }

    fn reading(track: &str, ms: u64, is_playing: bool) -> ClockReading {
        ClockReading {
            track_id: Some(TrackId::from(track)),
            position: Duration::from_millis(ms),
            is_playing,
        }
    }

    #[test]
    fn test_preroll_has_nothing_active() {
        let mut cursor = LyricCursor::new();
        let update = cursor.observe(&track(), &reading("t1", 500, true));
        assert_eq!(update.position, TimelinePosition::default());
        assert!(!update.word_changed);
        assert!(!update.stanza_changed);
        assert_eq!(update.scroll_to, None);
    }

    #[test]
    fn test_scrolls_when_stanza_starts_while_playing() {
        let track = track();
        let mut cursor = LyricCursor::new();

        let update = cursor.observe(&track, &reading("t1", 1000, true));
        assert_eq!(update.position.stanza, Some(0));
        assert_eq!(update.position.word, Some(0));
        assert_eq!(update.scroll_to, Some(0));

        // Same stanza, new word: no scroll
        let update = cursor.observe(&track, &reading("t1", 1600, true));
        assert!(update.word_changed);
        assert!(!update.stanza_changed);
        assert_eq!(update.scroll_to, None);

        let update = cursor.observe(&track, &reading("t1", 3000, true));
        assert_eq!(update.scroll_to, Some(1));
    }

    #[test]
    fn test_no_scroll_while_paused() {
        let track = track();
        let mut cursor = LyricCursor::new();

        let update = cursor.observe(&track, &reading("t1", 3100, false));
        assert!(update.stanza_changed);
        assert_eq!(update.position.stanza, Some(1));
        assert_eq!(update.scroll_to, None);

        // Resuming inside the same stanza does not count as a new stanza
        let update = cursor.observe(&track, &reading("t1", 3200, true));
        assert_eq!(update.scroll_to, None);
    }

    #[test]
    fn test_foreign_clock_clears_position() {
        let track = track();
        let mut cursor = LyricCursor::new();
        cursor.observe(&track, &reading("t1", 1200, true));

        let update = cursor.observe(&track, &reading("other", 1200, true));
        assert_eq!(update.position, TimelinePosition::default());
        assert!(update.stanza_changed);
        assert_eq!(update.scroll_to, None);
    }

    #[test]
    fn test_reset() {
        let track = track();
        let mut cursor = LyricCursor::new();
        cursor.observe(&track, &reading("t1", 1200, true));
        cursor.reset();
        assert_eq!(cursor.position(), TimelinePosition::default());
    }
}
