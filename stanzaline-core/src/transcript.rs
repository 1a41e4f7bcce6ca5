//! Raw transcript documents.
//!
//! Transcripts are JSON documents shaped as
//! `{ sections: [{ lines: [{ text, words?: [{ text, start }] }] }] }` with
//! `start` in seconds. They are authored by hand and by tooling of varying
//! quality, so every field is validated here and anything unexpected is
//! normalized instead of rejected: a line keeps its literal text even when its
//! word timings are unusable, and non-string text is coerced to a string.

use crate::error::Result;
use crate::time::secs_to_millis;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

/// A validated transcript document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTranscript {
    pub sections: Vec<RawSection>,
}

/// One section of a transcript; becomes one stanza when it has lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSection {
    pub lines: Vec<RawLine>,
}

/// A single lyric line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLine {
    /// Literal line text, coerced to a string if the document held another type
    pub text: String,
    /// Word-level timing, `None` when absent or malformed
    pub words: Option<Vec<RawWordTiming>>,
}

/// Word-level timing entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWordTiming {
    pub text: String,
    /// Start time in seconds
    pub start_secs: f64,
}

impl RawTranscript {
    /// Parse a transcript from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error only if the input is not valid JSON. Structurally
    /// unexpected documents produce a (possibly empty) transcript.
    pub fn parse(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        Ok(Self::from_value(&value))
    }

    /// Build a transcript from an already-parsed JSON value.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let sections = value
            .get("sections")
            .and_then(Value::as_array)
            .map(|sections| sections.iter().map(RawSection::from_value).collect())
            .unwrap_or_default();

        Self { sections }
    }

    /// Total number of lines across all sections
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }
}

impl<'de> Deserialize<'de> for RawTranscript {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

impl RawSection {
    fn from_value(value: &Value) -> Self {
        let lines = value
            .get("lines")
            .and_then(Value::as_array)
            .map(|lines| lines.iter().map(RawLine::from_value).collect())
            .unwrap_or_default();

        Self { lines }
    }
}

impl RawLine {
    /// Create a line without word timing
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            words: None,
        }
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(obj) => {
                let text = obj.get("text").map(coerce_text).unwrap_or_default();
                let words = obj.get("words").and_then(|words| parse_word_timings(words, &text));
                Self { text, words }
            }
            // A bare string or scalar in place of a line object is still displayable
            other => Self::plain(coerce_text(other)),
        }
    }
}

/// Validate a `words` array. All entries must be usable or the line degrades
/// to synthetic timing as a whole.
fn parse_word_timings(value: &Value, line_text: &str) -> Option<Vec<RawWordTiming>> {
    let entries = match value {
        Value::Null => return None,
        Value::Array(entries) if !entries.is_empty() => entries,
        Value::Array(_) => {
            debug!("Line {:?} has an empty words array, using synthetic timing", line_text);
            return None;
        }
        _ => {
            debug!("Line {:?} has a non-array words field, using synthetic timing", line_text);
            return None;
        }
    };

    let mut words = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let Some(word) = entry.as_object().and_then(parse_word_timing) else {
            debug!(
                "Line {:?} has malformed word timing at index {}, using synthetic timing",
                line_text, i
            );
            return None;
        };
        words.push(word);
    }

    Some(words)
}

fn parse_word_timing(obj: &Map<String, Value>) -> Option<RawWordTiming> {
    let start_secs = obj.get("start").and_then(Value::as_f64)?;
    // Reject values that cannot become a playback time
    secs_to_millis(start_secs)?;

    Some(RawWordTiming {
        text: obj.get("text").map(coerce_text).unwrap_or_default(),
        start_secs,
    })
}

/// Coerce any JSON value to the string a browser would display for it
/// (`String(value)` semantics).
#[must_use]
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => coerce_number(n),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                // Array.prototype.join renders null entries as empty strings
                Value::Null => String::new(),
                other => coerce_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn coerce_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) => number_to_js_string(f),
        None => n.to_string(),
    }
}

/// ECMAScript `Number::toString` for finite values: plain notation for
/// decimal exponents in `-7..21`, otherwise `d.ddde±x`.
fn number_to_js_string(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }

    // Shortest round-trip digits and exponent, e.g. "1.2345e-7"
    let scientific = format!("{:e}", f.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return f.to_string();
    };
    let Ok(exponent) = exponent.parse::<i64>() else {
        return f.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let Ok(k) = i64::try_from(digits.len()) else {
        return f.to_string();
    };
    // Decimal point position relative to the digit string
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", zeros(n - k))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(usize::try_from(n).unwrap_or_default());
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", zeros(-n))
    } else {
        let (first, rest) = digits.split_at(1);
        let sign = if exponent < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{first}e{sign}{}", exponent.abs())
        } else {
            format!("{first}.{rest}e{sign}{}", exponent.abs())
        }
    };

    if f < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

fn zeros(count: i64) -> String {
    "0".repeat(usize::try_from(count).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_transcript() {
        let input = r#"{
            "sections": [
                { "lines": [ { "text": "hello world" } ] },
                { "lines": [ { "text": "second verse" }, { "text": "more" } ] }
            ]
        }"#;
        let transcript = RawTranscript::parse(input).unwrap();
        assert_eq!(transcript.sections.len(), 2);
        assert_eq!(transcript.sections[0].lines[0].text, "hello world");
        assert!(transcript.sections[0].lines[0].words.is_none());
        assert_eq!(transcript.line_count(), 3);
    }

    #[test]
    fn test_parse_word_timings() {
        let input = r#"{
            "sections": [{ "lines": [{
                "text": "a b",
                "words": [ { "text": "a", "start": 1.0 }, { "text": "b", "start": 1.5 } ]
            }]}]
        }"#;
        let transcript = RawTranscript::parse(input).unwrap();
        let words = transcript.sections[0].lines[0].words.as_ref().unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].text, "b");
        assert!((words[1].start_secs - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(RawTranscript::parse("{ not json").is_err());
    }

    #[test]
    fn test_missing_sections_is_empty() {
        let transcript = RawTranscript::parse(r#"{ "title": "x" }"#).unwrap();
        assert!(transcript.sections.is_empty());

        let transcript = RawTranscript::parse("[1, 2, 3]").unwrap();
        assert!(transcript.sections.is_empty());
    }

    #[test]
    fn test_section_without_lines_has_no_lines() {
        let transcript = RawTranscript::parse(r#"{ "sections": [ {}, { "lines": "oops" } ] }"#).unwrap();
        assert_eq!(transcript.sections.len(), 2);
        assert!(transcript.sections.iter().all(|s| s.lines.is_empty()));
    }

    #[test]
    fn test_non_string_text_is_coerced() {
        let value = json!({ "sections": [{ "lines": [
            { "text": 42 },
            { "text": null },
            { "text": true },
            { "text": ["a", null, 3] },
            { "text": { "k": "v" } },
            {}
        ]}]});
        let transcript = RawTranscript::from_value(&value);
        let texts: Vec<_> = transcript.sections[0]
            .lines
            .iter()
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(texts, vec!["42", "null", "true", "a,,3", "[object Object]", ""]);
    }

    #[test]
    fn test_bare_string_line() {
        let value = json!({ "sections": [{ "lines": [ "just text" ] }] });
        let transcript = RawTranscript::from_value(&value);
        assert_eq!(transcript.sections[0].lines[0], RawLine::plain("just text"));
    }

    #[test]
    fn test_malformed_word_timing_degrades_line() {
        let value = json!({ "sections": [{ "lines": [
            { "text": "a b", "words": [ { "text": "a", "start": 1.0 }, { "text": "b" } ] },
            { "text": "c", "words": [ { "text": "c", "start": "soon" } ] },
            { "text": "d", "words": [ { "text": "d", "start": -2.0 } ] },
            { "text": "e", "words": "e@3" },
            { "text": "f", "words": [] },
            { "text": "g", "words": null }
        ]}]});
        let transcript = RawTranscript::from_value(&value);
        assert!(transcript.sections[0].lines.iter().all(|l| l.words.is_none()));
    }

    #[test]
    fn test_word_text_is_coerced() {
        let value = json!({ "sections": [{ "lines": [
            { "text": "7 up", "words": [ { "text": 7, "start": 0.5 }, { "start": 1 } ] }
        ]}]});
        let transcript = RawTranscript::from_value(&value);
        let words = transcript.sections[0].lines[0].words.as_ref().unwrap();
        assert_eq!(words[0].text, "7");
        assert_eq!(words[1].text, "");
    }

    #[test]
    fn test_coerce_float_numbers() {
        assert_eq!(coerce_text(&json!(1.5)), "1.5");
        assert_eq!(coerce_text(&json!(3.0)), "3");
        assert_eq!(coerce_text(&json!(-2)), "-2");
        assert_eq!(coerce_text(&json!(-0.0)), "0");
    }

    #[test]
    fn test_coerce_number_notation() {
        assert_eq!(coerce_text(&json!(1e21)), "1e+21");
        assert_eq!(coerce_text(&json!(1.5e300)), "1.5e+300");
        assert_eq!(coerce_text(&json!(1e20)), "100000000000000000000");
        assert_eq!(coerce_text(&json!(1e-7)), "1e-7");
        assert_eq!(coerce_text(&json!(-2.5e-10)), "-2.5e-10");
        assert_eq!(coerce_text(&json!(0.000_001)), "0.000001");
        assert_eq!(coerce_text(&json!(123_456.789)), "123456.789");
        assert_eq!(coerce_text(&json!(0.1)), "0.1");
        assert_eq!(coerce_text(&json!(100)), "100");

        let big: Value = serde_json::from_str("1000000000000000000000").unwrap();
        assert_eq!(coerce_text(&big), "1e+21");
    }

    #[test]
    fn test_deserialize_via_serde() {
        let transcript: RawTranscript =
            serde_json::from_str(r#"{ "sections": [{ "lines": [{ "text": "x" }] }] }"#).unwrap();
        assert_eq!(transcript.line_count(), 1);
    }
}
