//! Syllable tokens as emitted by the external chandas classifier.
//!
//! The classifier output is treated as untrusted: the only ordering key is
//! [`SyllableToken::position`], and the concatenated syllables are not
//! guaranteed to tile the source text.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Weight
// ---------------------------------------------------------------------------

/// Prosodic weight of a single syllable.
///
/// Serialised with the classifier's own vocabulary (`"guru"` / `"laghu"`);
/// the English names and single-letter pattern symbols are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weight {
    /// Guru: metrically long, two mātrā.
    #[serde(rename = "guru", alias = "heavy", alias = "g", alias = "G")]
    Heavy,
    /// Laghu: metrically short, one mātrā.
    #[serde(rename = "laghu", alias = "light", alias = "l", alias = "L")]
    Light,
}

impl Weight {
    /// Pattern symbol used by [`to_pattern`](crate::prosody::to_pattern).
    pub fn symbol(self) -> char {
        match self {
            Weight::Heavy => 'G',
            Weight::Light => 'L',
        }
    }

    /// Number of mātrā (morae) the syllable counts for.
    pub fn matras(self) -> u32 {
        match self {
            Weight::Heavy => 2,
            Weight::Light => 1,
        }
    }

    /// Parse the loosely-typed weight strings found in service responses.
    ///
    /// Matching is case-insensitive; anything unrecognised yields `None`.
    ///
    /// ```
    /// use chandas_karaoke::prosody::Weight;
    ///
    /// assert_eq!(Weight::parse("Guru"), Some(Weight::Heavy));
    /// assert_eq!(Weight::parse(" l "), Some(Weight::Light));
    /// assert_eq!(Weight::parse("pluta"), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "guru" | "g" | "heavy" => Some(Weight::Heavy),
            "laghu" | "l" | "light" => Some(Weight::Light),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SyllableToken
// ---------------------------------------------------------------------------

/// One classified syllable from the external analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllableToken {
    /// Contiguous Devanagari substring; may cover more than one akshara.
    pub syllable: String,
    #[serde(alias = "type")]
    pub weight: Weight,
    /// Rank in emission order.
    pub position: i64,
}

impl SyllableToken {
    pub fn new(syllable: impl Into<String>, weight: Weight, position: i64) -> Self {
        Self {
            syllable: syllable.into(),
            weight,
            position,
        }
    }
}

// ---------------------------------------------------------------------------
// SyllableStream
// ---------------------------------------------------------------------------

/// Tokens arranged by their `position` key and nothing else.
///
/// The sort is stable, so tokens sharing a position keep their arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyllableStream {
    tokens: Vec<SyllableToken>,
}

impl SyllableStream {
    pub fn new(mut tokens: Vec<SyllableToken>) -> Self {
        tokens.sort_by_key(|t| t.position);
        Self { tokens }
    }

    pub fn tokens(&self) -> &[SyllableToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_tokens(self) -> Vec<SyllableToken> {
        self.tokens
    }
}

impl From<Vec<SyllableToken>> for SyllableStream {
    fn from(tokens: Vec<SyllableToken>) -> Self {
        Self::new(tokens)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
