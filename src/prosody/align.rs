//! Aligns a flat classified-syllable stream back onto whitespace-delimited text.
//!
//! The classifier strips whitespace, may split or merge combining marks and
//! may drop characters altogether, so the token stream cannot be trusted to
//! tile the source.  Alignment is a greedy prefix match with a bounded
//! lookahead:
//!
//! ```text
//! word "भुवः"   tokens [भु(G)] [वः(L)]   →  भु:G  वः:L
//! word "नमः"    tokens [शि(G)]           →  नमः:unclassified
//! word "कृष्णं"  tokens [कृ(L)] [ष्ण(G)] →  कृ:L  ष्ण:G  ं:unclassified
//! ```
//!
//! Characters are never dropped or duplicated: the spans of a word always
//! concatenate back to the word.  Anything the stream cannot anchor is
//! reported as [`SpanWeight::Unclassified`].

use serde::Serialize;

use super::token::{SyllableStream, SyllableToken, Weight};

/// Default number of non-anchoring tokens the aligner will step over while
/// looking for a match before giving up on the rest of a word.
pub const DEFAULT_MAX_SKIP: usize = 4;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Weight class attached to an aligned span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanWeight {
    Heavy,
    Light,
    Unclassified,
}

impl From<Weight> for SpanWeight {
    fn from(w: Weight) -> Self {
        match w {
            Weight::Heavy => SpanWeight::Heavy,
            Weight::Light => SpanWeight::Light,
        }
    }
}

/// A run of characters of one word sharing a single weight class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedSpan {
    pub text: String,
    pub weight: SpanWeight,
    /// Index of the word within the aligned text (whitespace runs excluded).
    pub word_index: usize,
    /// Offset of the span's first character within its word, in `char`s.
    pub char_offset: usize,
}

/// Position in the token stream between two words.
///
/// `carry` is the number of bytes of `tokens[index]` already attributed to
/// the previous word, which happens when the classifier emitted a syllable
/// that straddles a word boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignCursor {
    pub index: usize,
    pub carry: usize,
}

impl AlignCursor {
    pub fn at(index: usize) -> Self {
        Self { index, carry: 0 }
    }

    /// First token index not touched at all by the words aligned so far.
    pub fn next_index(&self) -> usize {
        if self.carry > 0 {
            self.index + 1
        } else {
            self.index
        }
    }
}

/// One whitespace-delimited word and its spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedWord {
    pub index: usize,
    pub text: String,
    pub spans: Vec<AlignedSpan>,
}

impl AlignedWord {
    /// Number of characters not covered by any syllable token.
    pub fn unclassified_chars(&self) -> usize {
        self.spans
            .iter()
            .filter(|s| s.weight == SpanWeight::Unclassified)
            .map(|s| s.text.chars().count())
            .sum()
    }
}

/// Either a word or the whitespace run between words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TextPiece {
    Word(AlignedWord),
    Gap { text: String },
}

/// Alignment of a whole verse or line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedText {
    pub pieces: Vec<TextPiece>,
    /// Tokens touched by the alignment (fully or partially).
    pub consumed_tokens: usize,
    pub total_tokens: usize,
}

impl AlignedText {
    pub fn words(&self) -> impl Iterator<Item = &AlignedWord> {
        self.pieces.iter().filter_map(|p| match p {
            TextPiece::Word(w) => Some(w),
            TextPiece::Gap { .. } => None,
        })
    }

    /// Every span in text order, whitespace excluded.
    pub fn spans(&self) -> impl Iterator<Item = &AlignedSpan> {
        self.words().flat_map(|w| w.spans.iter())
    }

    /// Rebuild the source text from the pieces.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                TextPiece::Word(w) => {
                    for span in &w.spans {
                        out.push_str(&span.text);
                    }
                }
                TextPiece::Gap { text } => out.push_str(text),
            }
        }
        out
    }

    pub fn unclassified_chars(&self) -> usize {
        self.words().map(AlignedWord::unclassified_chars).sum()
    }

    /// Tokens left over after the last word.
    pub fn unused_tokens(&self) -> usize {
        self.total_tokens.saturating_sub(self.consumed_tokens)
    }
}

// ---------------------------------------------------------------------------
// Aligner
// ---------------------------------------------------------------------------

/// Greedy prefix aligner with a bounded skip budget.
#[derive(Debug, Clone, Copy)]
pub struct Aligner {
    max_skip: usize,
}

impl Default for Aligner {
    fn default() -> Self {
        Self {
            max_skip: DEFAULT_MAX_SKIP,
        }
    }
}

impl Aligner {
    pub fn new(max_skip: usize) -> Self {
        Self { max_skip }
    }

    pub fn max_skip(&self) -> usize {
        self.max_skip
    }

    /// Align a single word starting at `cursor`.
    ///
    /// Never fails: when the stream runs out or nothing within the skip
    /// budget anchors, the remainder becomes one unclassified span and the
    /// cursor is left on the first token that did not anchor, so the next
    /// word gets a chance to resynchronise on it.
    pub fn align_word_at(
        &self,
        word: &str,
        word_index: usize,
        tokens: &[SyllableToken],
        cursor: AlignCursor,
    ) -> (Vec<AlignedSpan>, AlignCursor) {
        let mut spans = Vec::new();
        let mut rest = word;
        let mut char_offset = 0;
        let mut cursor = if cursor.index < tokens.len() {
            cursor
        } else {
            AlignCursor::at(tokens.len())
        };

        while !rest.is_empty() && cursor.index < tokens.len() {
            let Some(anchor) = self.find_anchor(rest, tokens, cursor) else {
                break;
            };
            if anchor.index > cursor.index {
                log::debug!(
                    "align: word {word_index} skipped {} token(s) at {}",
                    anchor.index - cursor.index,
                    cursor.index
                );
            }

            let weight = tokens[anchor.index].weight;
            let (head, tail) = rest.split_at(anchor.len);
            spans.push(AlignedSpan {
                text: head.to_string(),
                weight: weight.into(),
                word_index,
                char_offset,
            });
            char_offset += head.chars().count();
            rest = tail;

            cursor = if anchor.partial {
                // Token runs past the end of the word; the next word
                // continues inside it.
                AlignCursor {
                    index: anchor.index,
                    carry: anchor.carry + anchor.len,
                }
            } else {
                AlignCursor::at(anchor.index + 1)
            };
        }

        if !rest.is_empty() {
            spans.push(AlignedSpan {
                text: rest.to_string(),
                weight: SpanWeight::Unclassified,
                word_index,
                char_offset,
            });
        }

        (spans, cursor)
    }

    /// Align every whitespace-delimited word of `text`, threading the token
    /// cursor from word to word.
    pub fn align_text(&self, text: &str, stream: &SyllableStream) -> AlignedText {
        let tokens = stream.tokens();
        let mut pieces = Vec::new();
        let mut cursor = AlignCursor::default();
        let mut word_index = 0;

        for (is_space, run) in whitespace_runs(text) {
            if is_space {
                pieces.push(TextPiece::Gap {
                    text: run.to_string(),
                });
                continue;
            }
            let (spans, next) = self.align_word_at(run, word_index, tokens, cursor);
            cursor = next;
            pieces.push(TextPiece::Word(AlignedWord {
                index: word_index,
                text: run.to_string(),
                spans,
            }));
            word_index += 1;
        }

        let aligned = AlignedText {
            pieces,
            consumed_tokens: cursor.next_index(),
            total_tokens: tokens.len(),
        };
        if aligned.unused_tokens() > 0 || aligned.unclassified_chars() > 0 {
            log::warn!(
                "align: {} unclassified char(s), {} unused token(s) of {}",
                aligned.unclassified_chars(),
                aligned.unused_tokens(),
                aligned.total_tokens
            );
        }
        aligned
    }

    fn find_anchor(
        &self,
        rest: &str,
        tokens: &[SyllableToken],
        cursor: AlignCursor,
    ) -> Option<Anchor> {
        let mut skipped = 0;
        for (index, token) in tokens.iter().enumerate().skip(cursor.index) {
            let carry = if index == cursor.index { cursor.carry } else { 0 };
            let syllable = token.syllable.get(carry..).unwrap_or("");
            if syllable.is_empty() {
                continue;
            }
            if rest.starts_with(syllable) {
                return Some(Anchor {
                    index,
                    carry,
                    len: syllable.len(),
                    partial: false,
                });
            }
            if syllable.starts_with(rest) {
                return Some(Anchor {
                    index,
                    carry,
                    len: rest.len(),
                    partial: true,
                });
            }
            skipped += 1;
            if skipped > self.max_skip {
                break;
            }
        }
        None
    }
}

struct Anchor {
    index: usize,
    carry: usize,
    len: usize,
    partial: bool,
}

/// Split `text` into alternating whitespace / non-whitespace runs.
fn whitespace_runs(text: &str) -> Vec<(bool, &str)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let is_space = c.is_whitespace();
        match current {
            Some(kind) if kind == is_space => {}
            Some(kind) => {
                runs.push((kind, &text[start..i]));
                start = i;
                current = Some(is_space);
            }
            None => current = Some(is_space),
        }
    }
    if let Some(kind) = current {
        runs.push((kind, &text[start..]));
    }
    runs
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Align one word against `syllables`, starting at token `start_index`.
///
/// Returns the spans for the word (word index 0) and the index of the first
/// token the next word should start from.
///
/// ```
/// use chandas_karaoke::prosody::{align_word, SpanWeight, SyllableToken, Weight};
///
/// let tokens = vec![
///     SyllableToken::new("भु", Weight::Heavy, 0),
///     SyllableToken::new("वः", Weight::Light, 1),
/// ];
/// let (spans, next) = align_word("भुवः", &tokens, 0);
/// assert_eq!(spans.len(), 2);
/// assert_eq!(spans[1].weight, SpanWeight::Light);
/// assert_eq!(next, 2);
/// ```
pub fn align_word(
    word: &str,
    syllables: &[SyllableToken],
    start_index: usize,
) -> (Vec<AlignedSpan>, usize) {
    let (spans, cursor) =
        Aligner::default().align_word_at(word, 0, syllables, AlignCursor::at(start_index));
    (spans, cursor.next_index())
}

/// Align a full text with the default skip budget.
pub fn align_text(text: &str, stream: &SyllableStream) -> AlignedText {
    Aligner::default().align_text(text, stream)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
