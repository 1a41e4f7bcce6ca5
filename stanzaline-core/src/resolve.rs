//! Mapping a playback time to the active word and stanza.
//!
//! Everything here is a pure function of its inputs; callers evaluate it on
//! every clock tick and the latest result wins.

use crate::stanza::StanzaIndex;
use crate::word_map::WordMap;
use serde::Serialize;

/// Display state of a single word at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WordState {
    /// No timing exists for this word; render it statically
    Inert,
    /// The word's window has not started yet
    Pending,
    /// The word is being sung. `progress` runs from 0.0 to 1.0 over its window
    Active { progress: f32 },
    /// The word's window has ended
    Passed,
}

impl WordState {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Progress through the word's window, only while active
    #[must_use]
    pub const fn progress(&self) -> Option<f32> {
        match self {
            Self::Active { progress } => Some(*progress),
            _ => None,
        }
    }
}

/// Resolve the state of the word at `index` in the global word sequence.
///
/// The window is half-open: the word is active at exactly its start time and
/// passed at exactly its end time. Indices without timing data are inert.
#[must_use]
pub fn resolve_word(word_map: &WordMap, index: usize, current_ms: u64) -> WordState {
    let Some((start, end)) = word_map.window(index) else {
        return WordState::Inert;
    };

    if start <= current_ms && current_ms < end {
        WordState::Active {
            progress: window_progress(start, end, current_ms),
        }
    } else if current_ms >= end {
        WordState::Passed
    } else {
        WordState::Pending
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn window_progress(start: u64, end: u64, current_ms: u64) -> f32 {
    let span = end.saturating_sub(start);
    if span == 0 {
        return 1.0;
    }
    let elapsed = current_ms.saturating_sub(start);
    ((elapsed as f64 / span as f64) as f32).clamp(0.0, 1.0)
}

/// Index of the first active word at `current_ms`, if any.
#[must_use]
pub fn active_word(word_map: &WordMap, current_ms: u64) -> Option<usize> {
    (0..word_map.len()).find(|&i| resolve_word(word_map, i, current_ms).is_active())
}

/// Resolve the active stanza at `current_ms`.
///
/// A stanza's window opens at the time of its first word (zero if that word
/// has no timing) and closes at the time of the following stanza's first
/// word; the last stanza's window never closes. Stanzas are checked in
/// order and the first match wins. Before the first word's time (pre-roll)
/// there is no active stanza.
#[must_use]
pub fn resolve_stanza(index: &StanzaIndex, word_map: &WordMap, current_ms: u64) -> Option<usize> {
    index.ranges().find_map(|(stanza, words)| {
        let start_ms = word_map.time_ms(words.start).unwrap_or(0);
        let closed = word_map
            .time_ms(words.end)
            .is_some_and(|end_ms| current_ms >= end_ms);

        (start_ms <= current_ms && !closed).then_some(stanza)
    })
}
