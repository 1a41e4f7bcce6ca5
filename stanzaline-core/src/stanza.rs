//! Stanza boundaries within a track's flat word sequence.

use serde::Serialize;
use std::ops::Range;

/// A display group of lyric lines
pub type Stanza = Vec<String>;

/// Word separator set used by transcript tooling: the ECMAScript `\s` class.
///
/// Differs from [`char::is_whitespace`]: U+FEFF separates words, U+0085 does not.
const fn is_word_separator(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn words(line: &str) -> impl Iterator<Item = &str> {
    line.split(is_word_separator).filter(|token| !token.is_empty())
}

/// Split a line into display words.
///
/// Follows the legacy `line.trim().split(/\s+/)` arithmetic: a blank or
/// whitespace-only line yields a single empty token, so it still occupies
/// one slot in the word sequence.
#[must_use]
pub fn line_tokens(line: &str) -> Vec<&str> {
    let tokens: Vec<&str> = words(line).collect();
    if tokens.is_empty() {
        vec![""]
    } else {
        tokens
    }
}

/// Number of words a line contributes to the global word index (always >= 1).
#[must_use]
pub fn line_word_count(line: &str) -> usize {
    words(line).count().max(1)
}

/// Number of words a stanza contributes to the global word index.
#[must_use]
pub fn stanza_word_count(stanza: &[String]) -> usize {
    stanza.iter().map(|line| line_word_count(line)).sum()
}

/// Precomputed starting global word index of every stanza.
///
/// Built once per track with a single in-order fold, so lookups never depend
/// on render or traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StanzaIndex {
    starts: Vec<usize>,
    total_words: usize,
}

impl StanzaIndex {
    /// Build the index for a track's stanzas in document order.
    #[must_use]
    pub fn new(stanzas: &[Stanza]) -> Self {
        let mut starts = Vec::with_capacity(stanzas.len());
        let total_words = stanzas.iter().fold(0, |next_start, stanza| {
            starts.push(next_start);
            next_start + stanza_word_count(stanza)
        });

        Self {
            starts,
            total_words,
        }
    }

    /// Number of stanzas
    #[must_use]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Total number of words across all stanzas
    #[must_use]
    pub const fn total_words(&self) -> usize {
        self.total_words
    }

    /// Inclusive starting global word index of a stanza
    #[must_use]
    pub fn start_of(&self, stanza: usize) -> Option<usize> {
        self.starts.get(stanza).copied()
    }

    /// Exclusive end of a stanza: the first word index of the following stanza
    #[must_use]
    pub fn end_of(&self, stanza: usize) -> Option<usize> {
        if stanza >= self.starts.len() {
            return None;
        }
        Some(
            self.starts
                .get(stanza + 1)
                .copied()
                .unwrap_or(self.total_words),
        )
    }

    /// Global word index range covered by a stanza
    #[must_use]
    pub fn range(&self, stanza: usize) -> Option<Range<usize>> {
        Some(self.start_of(stanza)?..self.end_of(stanza)?)
    }

    /// Iterate over `(stanza, word range)` pairs in order
    pub fn ranges(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        (0..self.starts.len()).filter_map(|s| self.range(s).map(|r| (s, r)))
    }

    /// The stanza containing a global word index
    #[must_use]
    pub fn stanza_of(&self, word: usize) -> Option<usize> {
        if word >= self.total_words {
            return None;
        }
        // Last stanza whose start is <= word
        self.starts
            .partition_point(|&start| start <= word)
            .checked_sub(1)
    }
}
