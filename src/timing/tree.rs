//! Verse → Line → Word timing hierarchy.
//!
//! Timing files are authored by hand alongside the recitation audio, so the
//! loader accepts anything that deserialises and leaves data-quality checks
//! to [`Verse::data_warnings`].  [`TimingTree`] wraps a verse and records
//! once, up front, whether each interval sequence is well ordered; the
//! resolver uses that to choose between binary search and a first-match scan.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// TimingError
// ---------------------------------------------------------------------------

/// Errors from reading a timing file.  Interval problems are not errors.
#[derive(Debug, Error)]
pub enum TimingError {
    #[error("failed to read timing file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse timing data: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Interval
// ---------------------------------------------------------------------------

/// Anything with a `[start, end)` millisecond interval.
pub trait Interval {
    fn start_ms(&self) -> u64;
    fn end_ms(&self) -> u64;

    fn duration_ms(&self) -> u64 {
        self.end_ms().saturating_sub(self.start_ms())
    }
}

// ---------------------------------------------------------------------------
// Word / Line / Verse
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub text: String,
    #[serde(default)]
    pub transliteration: String,
    pub start: u64,
    pub end: u64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            text: text.into(),
            transliteration: String::new(),
            start,
            end,
        }
    }
}

impl Interval for Word {
    fn start_ms(&self) -> u64 {
        self.start
    }
    fn end_ms(&self) -> u64 {
        self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub text: String,
    #[serde(default)]
    pub translation: String,
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub words: Vec<Word>,
}

impl Line {
    /// Build a line whose text is the whitespace-joined word texts.
    pub fn from_words(start: u64, end: u64, words: Vec<Word>) -> Self {
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            text,
            translation: String::new(),
            start,
            end,
            words,
        }
    }
}

impl Interval for Line {
    fn start_ms(&self) -> u64 {
        self.start
    }
    fn end_ms(&self) -> u64 {
        self.end
    }
}

/// One verse with its recitation timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    pub id: String,
    pub text: String,
    /// Audio asset for the recitation, relative to the configured audio dir.
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub lines: Vec<Line>,
}

impl Verse {
    pub fn from_json_str(json: &str) -> Result<Self, TimingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, TimingError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// End of the last-ending line, or 0 for an empty verse.
    pub fn duration_ms(&self) -> u64 {
        self.lines.iter().map(|l| l.end).max().unwrap_or(0)
    }

    /// Every data-quality problem in the timing data.
    ///
    /// Nothing here prevents lookup; callers log these.
    pub fn data_warnings(&self) -> Vec<DataWarning> {
        let mut warnings = Vec::new();

        for (li, line) in self.lines.iter().enumerate() {
            if line.start >= line.end {
                warnings.push(DataWarning::EmptyLine { line: li });
            }
            if li > 0 {
                let prev = &self.lines[li - 1];
                if line.start <= prev.start {
                    warnings.push(DataWarning::LineOutOfOrder { line: li });
                } else if line.start < prev.end {
                    warnings.push(DataWarning::LineOverlap { line: li });
                }
            }

            for (wi, word) in line.words.iter().enumerate() {
                if word.start > word.end {
                    warnings.push(DataWarning::InvertedWord { line: li, word: wi });
                }
                if word.start < line.start || word.end > line.end {
                    warnings.push(DataWarning::WordOutsideLine { line: li, word: wi });
                }
                if wi > 0 {
                    let prev = &line.words[wi - 1];
                    if word.start < prev.start {
                        warnings.push(DataWarning::WordOutOfOrder { line: li, word: wi });
                    } else if word.start < prev.end {
                        warnings.push(DataWarning::WordOverlap { line: li, word: wi });
                    }
                }
            }

            if !line.words.is_empty() {
                let joined = line
                    .words
                    .iter()
                    .map(|w| w.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                if joined != line.text {
                    warnings.push(DataWarning::TextMismatch { line: li });
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// DataWarning
// ---------------------------------------------------------------------------

/// A data-quality issue in authored timing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataWarning {
    /// `start >= end` on a line.
    EmptyLine { line: usize },
    /// Line starts at or before the previous line's start.
    LineOutOfOrder { line: usize },
    /// Line starts before the previous line ends.
    LineOverlap { line: usize },
    /// `start > end` on a word.
    InvertedWord { line: usize, word: usize },
    WordOutsideLine { line: usize, word: usize },
    WordOutOfOrder { line: usize, word: usize },
    WordOverlap { line: usize, word: usize },
    /// Whitespace-joined word texts differ from the line text.
    TextMismatch { line: usize },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::EmptyLine { line } => write!(f, "line {line}: empty or inverted interval"),
            DataWarning::LineOutOfOrder { line } => {
                write!(f, "line {line}: starts before the previous line")
            }
            DataWarning::LineOverlap { line } => {
                write!(f, "line {line}: overlaps the previous line")
            }
            DataWarning::InvertedWord { line, word } => {
                write!(f, "line {line} word {word}: end precedes start")
            }
            DataWarning::WordOutsideLine { line, word } => {
                write!(f, "line {line} word {word}: interval outside its line")
            }
            DataWarning::WordOutOfOrder { line, word } => {
                write!(f, "line {line} word {word}: starts before the previous word")
            }
            DataWarning::WordOverlap { line, word } => {
                write!(f, "line {line} word {word}: overlaps the previous word")
            }
            DataWarning::TextMismatch { line } => {
                write!(f, "line {line}: word texts do not reproduce the line text")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TimingTree
// ---------------------------------------------------------------------------

/// Immutable, lookup-ready view of a [`Verse`].
#[derive(Debug, Clone)]
pub struct TimingTree {
    verse: Verse,
    lines_ordered: bool,
    words_ordered: Vec<bool>,
}

impl TimingTree {
    pub fn new(verse: Verse) -> Self {
        let lines_ordered = is_ordered(&verse.lines);
        let words_ordered = verse.lines.iter().map(|l| is_ordered(&l.words)).collect();
        Self {
            verse,
            lines_ordered,
            words_ordered,
        }
    }

    /// Build a tree and log every data-quality warning at `warn` level.
    pub fn checked(verse: Verse) -> Self {
        for warning in verse.data_warnings() {
            log::warn!("timing data for verse {:?}: {warning}", verse.id);
        }
        Self::new(verse)
    }

    pub fn verse(&self) -> &Verse {
        &self.verse
    }

    pub fn lines(&self) -> &[Line] {
        &self.verse.lines
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.verse.lines.get(index)
    }

    pub fn duration_ms(&self) -> u64 {
        self.verse.duration_ms()
    }

    /// `true` when lines are sorted and non-overlapping.
    pub fn lines_ordered(&self) -> bool {
        self.lines_ordered
    }

    /// `true` when the words of `line` are sorted and non-overlapping.
    pub fn words_ordered(&self, line: usize) -> bool {
        self.words_ordered.get(line).copied().unwrap_or(false)
    }
}

impl From<Verse> for TimingTree {
    fn from(verse: Verse) -> Self {
        Self::new(verse)
    }
}

/// Sorted and non-overlapping: every interval has `start <= end` and ends no
/// later than the next one starts.
fn is_ordered<T: Interval>(items: &[T]) -> bool {
    items.iter().all(|i| i.start_ms() <= i.end_ms())
        && items
            .windows(2)
            .all(|pair| pair[0].end_ms() <= pair[1].start_ms())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const GAYATRI: &str = r#"{
        "id": "gayatri",
        "text": "ॐ भूर्भुवः स्वः",
        "audio": "gayatri.mp3",
        "lines": [
            {
                "text": "ॐ भूर्भुवः स्वः",
                "translation": "Om, earth, atmosphere, heaven",
                "start": 0,
                "end": 5850,
                "words": [
                    { "text": "ॐ", "transliteration": "om", "start": 0, "end": 1150 },
                    { "text": "भूर्भुवः", "transliteration": "bhūr bhuvaḥ", "start": 1150, "end": 2900 },
                    { "text": "स्वः", "transliteration": "svaḥ", "start": 2900, "end": 5850 }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_authored_json() {
        let verse = Verse::from_json_str(GAYATRI).unwrap();
        assert_eq!(verse.id, "gayatri");
        assert_eq!(verse.audio.as_deref(), Some("gayatri.mp3"));
        assert_eq!(verse.lines[0].words[1].transliteration, "bhūr bhuvaḥ");
        assert_eq!(verse.duration_ms(), 5850);
        assert!(verse.data_warnings().is_empty());
    }

    #[test]
    fn optional_fields_default() {
        let json = r#"{"id": "x", "text": "a", "lines": [
            {"text": "a", "start": 0, "end": 10, "words": [{"text": "a", "start": 0, "end": 10}]}
        ]}"#;
        let verse = Verse::from_json_str(json).unwrap();
        assert!(verse.audio.is_none());
        assert!(verse.lines[0].translation.is_empty());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("verse.json");
        std::fs::write(&path, GAYATRI).unwrap();
        let verse = Verse::load(&path).unwrap();
        assert_eq!(verse.lines.len(), 1);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempdir().expect("temp dir");
        let err = Verse::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, TimingError::Io(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = Verse::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, TimingError::Parse(_)));
    }

    #[test]
    fn warnings_flag_malformed_intervals() {
        let verse = Verse {
            id: "bad".into(),
            text: String::new(),
            audio: None,
            lines: vec![
                Line::from_words(0, 100, vec![Word::new("a", 0, 60), Word::new("b", 50, 120)]),
                Line::from_words(90, 90, vec![Word::new("c", 95, 90)]),
            ],
        };
        let warnings = verse.data_warnings();
        assert!(warnings.contains(&DataWarning::WordOverlap { line: 0, word: 1 }));
        assert!(warnings.contains(&DataWarning::WordOutsideLine { line: 0, word: 1 }));
        assert!(warnings.contains(&DataWarning::EmptyLine { line: 1 }));
        assert!(warnings.contains(&DataWarning::LineOverlap { line: 1 }));
        assert!(warnings.contains(&DataWarning::InvertedWord { line: 1, word: 0 }));
    }

    #[test]
    fn warnings_flag_text_mismatch() {
        let mut line = Line::from_words(0, 10, vec![Word::new("a", 0, 5), Word::new("b", 5, 10)]);
        line.text = "a  b".into();
        let verse = Verse {
            id: "x".into(),
            text: String::new(),
            audio: None,
            lines: vec![line],
        };
        assert_eq!(verse.data_warnings(), vec![DataWarning::TextMismatch { line: 0 }]);
    }

    #[test]
    fn tree_records_ordering() {
        let verse = Verse {
            id: "x".into(),
            text: String::new(),
            audio: None,
            lines: vec![
                Line::from_words(0, 100, vec![Word::new("a", 0, 50), Word::new("b", 50, 100)]),
                Line::from_words(120, 200, vec![Word::new("c", 150, 200), Word::new("d", 120, 140)]),
            ],
        };
        let tree = TimingTree::new(verse);
        assert!(tree.lines_ordered());
        assert!(tree.words_ordered(0));
        assert!(!tree.words_ordered(1));
        assert!(!tree.words_ordered(9));
        assert_eq!(tree.duration_ms(), 200);
    }

    #[test]
    fn warning_display_names_location() {
        let text = DataWarning::WordOverlap { line: 2, word: 3 }.to_string();
        assert!(text.contains("line 2 word 3"));
    }
}
